//! End-to-end scenarios over the public API.

use nalgebra::{Point3, Vector3};
use surfbridge::convert::{to_markers, MaterialLibrary};
use surfbridge::host::MARKER_LAYER;
use surfbridge::prelude::*;

fn square() -> PolyMesh {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    PolyMesh::from_pydata("square", &positions, vec![vec![0, 1, 2], vec![0, 2, 3]]).unwrap()
}

fn octahedron() -> PolyMesh {
    let positions = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = vec![
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
    ];
    PolyMesh::from_pydata("octahedron", &positions, faces).unwrap()
}

#[test]
fn quad_import_fails_without_mutation() {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let mesh = PolyMesh::from_pydata("quad", &positions, vec![vec![0, 1, 2, 3]]).unwrap();
    let mut object = HostObject::from_mesh(mesh);
    object.mode = ObjectMode::Sculpt;

    let result = import_mesh(&mut object, &ImportOptions::default());
    assert!(matches!(result, Err(BridgeError::NonTriangularFace { face: 0, sides: 4 })));

    assert_eq!(object.mode, ObjectMode::Sculpt);
    let mesh = object.mesh().unwrap();
    assert_eq!(mesh.polygons(), &[vec![0, 1, 2, 3]]);
    assert!(mesh.face_int_layer(MARKER_LAYER).is_none());
}

#[test]
fn undefined_orientation_blocks_export() {
    let mut object = HostObject::from_mesh(square());
    object.transform = Transform::from_location(Vector3::new(0.0, 0.0, 2.0));
    let mut surface = import_mesh(&mut object, &ImportOptions::default()).unwrap();
    object.curvatures.add(CurvatureAlgorithm::Mdsb, CurvatureType::K1).unwrap();

    let key = surface.face_keys().last().unwrap();
    surface.face_mut(&key).unwrap().orientation = Orientation::Undefined;

    let options = ExportOptions::default().with_mesh_name("new");
    let result = export_mesh(&surface, &mut object, &options);
    assert!(matches!(result, Err(BridgeError::UndefinedOrientation { face: 1 })));

    // Nothing was replaced
    assert_eq!(object.mesh().unwrap().name, "square");
    assert!(!object.transform.is_identity());
    assert_eq!(object.curvatures.len(), 1);
}

#[test]
fn resolving_orientation_makes_export_valid() {
    let mut object = HostObject::from_mesh(octahedron());
    let mut surface = import_mesh(&mut object, &ImportOptions::default()).unwrap();

    let keys: Vec<FaceKey> = surface.face_keys().collect();
    for key in keys.iter().skip(1) {
        surface.face_mut(key).unwrap().orientation = Orientation::Undefined;
    }
    assert_eq!(init_orientation(&mut surface), 7);
    let report = check_orientation(&surface);
    assert!(report.is_consistent());
    assert!(report.is_closed());

    export_mesh(&surface, &mut object, &ExportOptions::default()).unwrap();
    assert_eq!(object.mesh().unwrap().num_faces(), 8);
}

#[test]
fn boundary_mapping_is_total() {
    let mut list = BoundaryList::new();
    let membrane = list.add(10, "membrane");
    let map = list.boundary_map();

    assert_eq!(to_markers(&[0, membrane], Some(&map)).unwrap(), vec![-1, 10]);
    assert!(matches!(
        to_markers(&[0, membrane, 99], Some(&map)),
        Err(BridgeError::UnmappedBoundary { face: 2, value: 99 })
    ));
}

#[test]
fn boundaries_round_trip_through_json_and_materials() {
    let json = r#"{"boundaries": [
        {"boundary_id": 1, "marker": 23, "name": "inner", "color": [1.0, 0.0, 0.0]},
        {"boundary_id": 2, "marker": 50}
    ]}"#;
    let list = BoundaryList::from_json_str(json).unwrap();
    assert_eq!(list.len(), 2);

    let mut object = HostObject::from_mesh(square());
    object.boundaries = list;
    object.marker_layer().unwrap().copy_from_slice(&[2, 1]);

    let options = ImportOptions::default().with_map_boundaries(true);
    let surface = import_mesh(&mut object, &options).unwrap();
    let markers: Vec<i32> = surface.faces().map(|(_, _, f)| f.marker).collect();
    assert_eq!(markers, vec![50, 23]);

    let mut library = MaterialLibrary::new();
    assert_eq!(repaint_boundaries(&mut object, &mut library).unwrap(), 2);
    assert_eq!(library.get(1).unwrap().color, [1.0, 0.0, 0.0]);
    let mesh = object.mesh().unwrap();
    assert_eq!(mesh.material_slots().len(), 2);
    assert!(mesh.face_materials().iter().all(Option::is_some));
}

#[test]
fn registry_deduplicates_and_resets() {
    let mut registry = CurvatureRegistry::new();
    registry.add(CurvatureAlgorithm::Jets, CurvatureType::Kg).unwrap();
    assert!(registry.add(CurvatureAlgorithm::Jets, CurvatureType::Kg).is_err());
    assert_eq!(registry.len(), 1);

    registry.add(CurvatureAlgorithm::Jets, CurvatureType::Kh).unwrap();
    registry.set_active_index(1);
    registry.remove_all();
    assert_eq!(registry.active_index(), 0);
    assert!(registry.is_empty());
}

#[test]
fn curvature_pipeline_on_closed_surface() {
    let mut ctx = Context::with_object(HostObject::from_mesh(octahedron()));
    ctx.selected_mesh_mut().unwrap().curvatures.algorithm = CurvatureAlgorithm::Mdsb;

    assert!(ops::execute(&mut ctx, Command::ComputeCurvatures).is_success());
    // Running again adds nothing and still succeeds
    assert!(ops::execute(&mut ctx, Command::ComputeCurvatures).is_success());
    assert_eq!(ctx.selected_mesh().unwrap().curvatures.len(), 4);

    // Octahedron: every vertex is equivalent, so the Gaussian curvature is uniform.
    let object = ctx.selected_mesh().unwrap();
    let kg = object.mesh().unwrap().vertex_float_layer("MDSBKG").unwrap();
    assert!(kg.iter().all(|&k| (k - kg[0]).abs() < 1e-9 && k > 0.0));

    let report = ops::execute(&mut ctx, Command::CurvatureToColormap);
    assert_eq!(report.level, ReportLevel::Info);
    let mesh = ctx.selected_mesh().unwrap().mesh().unwrap();
    assert!(mesh.vertex_colors("MDSBK1").is_some());

    assert!(ops::execute(&mut ctx, Command::RemoveCurvature).is_success());
    assert!(ops::execute(&mut ctx, Command::RemoveAllCurvatures).is_success());
    let object = ctx.selected_mesh().unwrap();
    assert!(object.curvatures.is_empty());
    assert_eq!(object.mesh().unwrap().vertex_float_layer_names().count(), 0);

    let report = ops::execute(&mut ctx, Command::RemoveCurvature);
    assert!(!report.is_success());
}
