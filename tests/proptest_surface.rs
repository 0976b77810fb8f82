//! Property-based tests for conversion and field operations.
//!
//! Run with: cargo test --test proptest_surface

use std::collections::BTreeMap;

use nalgebra::Point3;
use proptest::prelude::*;
use surfbridge::algo::classify::percentile;
use surfbridge::algo::smooth::{smooth_field, FieldSmoothOptions, VertexAdjacency};
use surfbridge::convert::to_markers;
use surfbridge::host::MARKER_LAYER;
use surfbridge::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Three distinct vertex ids.
fn arb_triangle() -> impl Strategy<Value = [VertexId; 3]> {
    (0usize..500, 0usize..500, 0usize..500)
        .prop_filter("distinct vertices", |(a, b, c)| a != b && b != c && a != c)
        .prop_map(|(a, b, c)| [VertexId::new(a), VertexId::new(b), VertexId::new(c)])
}

/// A triangulated `n x n` grid with random diagonals and markers.
fn arb_grid() -> impl Strategy<Value = PolyMesh> {
    (1usize..6).prop_flat_map(|n| {
        let flips = prop::collection::vec(any::<bool>(), n * n);
        let markers = prop::collection::vec(-3i32..10, 2 * n * n);
        (Just(n), flips, markers).prop_map(|(n, flips, markers)| {
            let mut vertices = Vec::new();
            for j in 0..=n {
                for i in 0..=n {
                    vertices.push(Point3::new(i as f64, j as f64, 0.1 * (i * j) as f64));
                }
            }
            let mut faces = Vec::new();
            for j in 0..n {
                for i in 0..n {
                    let v00 = j * (n + 1) + i;
                    let (v10, v01) = (v00 + 1, v00 + n + 1);
                    let v11 = v01 + 1;
                    if flips[j * n + i] {
                        faces.push(vec![v00, v10, v01]);
                        faces.push(vec![v10, v11, v01]);
                    } else {
                        faces.push(vec![v00, v10, v11]);
                        faces.push(vec![v00, v11, v01]);
                    }
                }
            }
            let mut mesh = PolyMesh::from_pydata("grid", &vertices, faces).unwrap();
            mesh.face_int_layer_or_new(MARKER_LAYER).copy_from_slice(&markers);
            mesh
        })
    })
}

fn arb_field(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0..100.0f64, len)
}

/// `(key, orientation) -> marker` for every polygon of a host mesh.
fn oriented_faces(mesh: &PolyMesh) -> BTreeMap<(FaceKey, Orientation), i32> {
    let markers = mesh.face_int_layer(MARKER_LAYER).unwrap();
    mesh.polygons()
        .iter()
        .zip(markers)
        .map(|(p, &m)| {
            let tri = [VertexId::new(p[0]), VertexId::new(p[1]), VertexId::new(p[2])];
            (canonicalize(tri).unwrap(), m)
        })
        .collect()
}

// =============================================================================
// Property Tests: Orientation
// =============================================================================

proptest! {
    /// Every cyclic rotation of a triangle has the same key and orientation.
    #[test]
    fn canonicalize_is_rotation_invariant(tri in arb_triangle()) {
        let [a, b, c] = tri;
        let expected = canonicalize(tri);
        prop_assert_eq!(canonicalize([b, c, a]), expected);
        prop_assert_eq!(canonicalize([c, a, b]), expected);
    }

    /// Reversing the winding keeps the key and flips the orientation.
    #[test]
    fn canonicalize_reversal_flips(tri in arb_triangle()) {
        let [a, b, c] = tri;
        let (key, orientation) = canonicalize(tri).unwrap();
        let (rkey, rorientation) = canonicalize([c, b, a]).unwrap();
        prop_assert_eq!(key, rkey);
        prop_assert_eq!(rorientation, orientation.flipped());
    }

    /// The emitted winding is a cyclic rotation of the input.
    #[test]
    fn emitted_winding_is_rotation(tri in arb_triangle()) {
        let (key, orientation) = canonicalize(tri).unwrap();
        let emitted = key.oriented(orientation).unwrap();
        let [a, b, c] = tri;
        prop_assert!(emitted == [a, b, c] || emitted == [b, c, a] || emitted == [c, a, b]);
    }
}

// =============================================================================
// Property Tests: Conversion
// =============================================================================

proptest! {
    /// Import followed by export keeps every triangle's winding and marker.
    #[test]
    fn import_export_round_trip(mesh in arb_grid()) {
        let before = oriented_faces(&mesh);
        let positions: Vec<Point3<f64>> = mesh.vertices().iter().map(|v| v.co).collect();
        let mut object = HostObject::from_mesh(mesh);

        let surface = import_mesh(&mut object, &ImportOptions::default()).unwrap();
        prop_assert!(check_orientation(&surface).is_consistent());
        export_mesh(&surface, &mut object, &ExportOptions::default()).unwrap();

        let exported = object.mesh().unwrap();
        prop_assert_eq!(oriented_faces(exported), before);
        let after: Vec<Point3<f64>> = exported.vertices().iter().map(|v| v.co).collect();
        prop_assert_eq!(after, positions);
    }

    /// Without a boundary table markers pass through unchanged.
    #[test]
    fn markers_identity_without_map(raw in prop::collection::vec(any::<i32>(), 0..50)) {
        prop_assert_eq!(to_markers(&raw, None).unwrap(), raw);
    }
}

// =============================================================================
// Property Tests: Smoothing and classification
// =============================================================================

proptest! {
    /// Zero passes return the input.
    #[test]
    fn smoothing_zero_iterations_is_identity(mesh in arb_grid(), seed in arb_field(64)) {
        let adjacency = VertexAdjacency::from_polygons(mesh.num_vertices(), mesh.polygons());
        let data: Vec<f64> = (0..mesh.num_vertices()).map(|i| seed[i % seed.len()]).collect();
        let options = FieldSmoothOptions::default().with_iterations(0);
        prop_assert_eq!(smooth_field(&data, &adjacency, &options).unwrap(), data);
    }

    /// Constant fields are fixed points.
    #[test]
    fn smoothing_constant_is_fixed_point(
        mesh in arb_grid(),
        value in -50.0..50.0f64,
        iterations in 1usize..8,
    ) {
        let adjacency = VertexAdjacency::from_polygons(mesh.num_vertices(), mesh.polygons());
        let data = vec![value; mesh.num_vertices()];
        let options = FieldSmoothOptions::default().with_iterations(iterations);
        for x in smooth_field(&data, &adjacency, &options).unwrap() {
            prop_assert!((x - value).abs() <= 1e-12 * value.abs().max(1.0));
        }
    }

    /// Smoothing never leaves the range of the input.
    #[test]
    fn smoothing_stays_in_range(
        mesh in arb_grid(),
        seed in arb_field(64),
        iterations in 1usize..5,
    ) {
        let adjacency = VertexAdjacency::from_polygons(mesh.num_vertices(), mesh.polygons());
        let data: Vec<f64> = (0..mesh.num_vertices()).map(|i| seed[i % seed.len()]).collect();
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let options = FieldSmoothOptions::default().with_iterations(iterations);
        for x in smooth_field(&data, &adjacency, &options).unwrap() {
            prop_assert!(x >= lo - 1e-9 && x <= hi + 1e-9);
        }
    }

    /// Percentiles grow with `q` and stay within the data.
    #[test]
    fn percentile_is_monotone(data in arb_field(20), q1 in 0.0..100.0f64, q2 in 0.0..100.0f64) {
        let (lo, hi) = (q1.min(q2), q1.max(q2));
        let a = percentile(&data, lo).unwrap();
        let b = percentile(&data, hi).unwrap();
        prop_assert!(a <= b);
        prop_assert!(a >= percentile(&data, 0.0).unwrap());
        prop_assert!(b <= percentile(&data, 100.0).unwrap());
    }
}
