//! Orientation propagation and consistency checking.
//!
//! Two faces sharing a manifold edge are consistently wound when they
//! traverse that edge in opposite directions. [`init_orientation`] resolves
//! every undefined face from its already-oriented neighbours, and
//! [`check_orientation`] reports what is left over.

use std::collections::{HashMap, VecDeque};

use super::index::VertexId;
use super::key::{has_directed_edge, FaceKey, Orientation};
use super::surface::SurfaceMesh;

/// Summary of the orientation state of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationReport {
    /// Number of faces inspected.
    pub faces: usize,
    /// Faces whose orientation is still undefined.
    pub undefined: usize,
    /// Edges with a single incident face.
    pub boundary_edges: usize,
    /// Edges with more than two incident faces.
    pub non_manifold_edges: usize,
    /// Manifold edges traversed in the same direction by both faces.
    pub inconsistent_edges: usize,
}

impl OrientationReport {
    /// Whether every face is oriented and every manifold edge agrees.
    pub fn is_consistent(&self) -> bool {
        self.undefined == 0 && self.inconsistent_edges == 0
    }

    /// Whether the mesh has no boundary edges.
    pub fn is_closed(&self) -> bool {
        self.boundary_edges == 0
    }
}

/// Map every undirected edge to the faces that contain it.
fn edge_faces(mesh: &SurfaceMesh) -> HashMap<(VertexId, VertexId), Vec<FaceKey>> {
    let mut map: HashMap<(VertexId, VertexId), Vec<FaceKey>> = HashMap::new();
    for key in mesh.face_keys() {
        for edge in key.edges() {
            map.entry(edge).or_default().push(key);
        }
    }
    map
}

/// The orientation of `neighbor` that traverses `from -> to`.
fn orientation_through(neighbor: &FaceKey, from: VertexId, to: VertexId) -> Orientation {
    match neighbor.oriented(Orientation::Negative) {
        Some(tri) if has_directed_edge(&tri, from, to) => Orientation::Negative,
        _ => Orientation::Positive,
    }
}

/// Resolve every face whose orientation is undefined.
///
/// Orientation spreads breadth-first across manifold edges, starting from all
/// faces that already have one. A connected component without any oriented
/// face is seeded with [`Orientation::Negative`] on its first face in key
/// order. Faces that are already oriented are never changed.
///
/// Returns the number of faces that were assigned an orientation.
pub fn init_orientation(mesh: &mut SurfaceMesh) -> usize {
    let adjacency = edge_faces(mesh);
    let keys: Vec<FaceKey> = mesh.face_keys().collect();

    let mut visited: HashMap<FaceKey, bool> = keys.iter().map(|&k| (k, false)).collect();
    let mut queue: VecDeque<FaceKey> = VecDeque::new();
    let mut assigned = 0;

    for key in &keys {
        if mesh.face(key).is_some_and(|f| f.orientation.is_defined()) {
            visited.insert(*key, true);
            queue.push_back(*key);
        }
    }

    let mut seeds = keys.iter();
    loop {
        while let Some(key) = queue.pop_front() {
            let Some(tri) = mesh.face(&key).and_then(|f| key.oriented(f.orientation)) else {
                continue;
            };

            for i in 0..3 {
                let (from, to) = (tri[i], tri[(i + 1) % 3]);
                let edge = if from < to { (from, to) } else { (to, from) };
                let Some(incident) = adjacency.get(&edge) else {
                    continue;
                };
                if incident.len() != 2 {
                    continue;
                }

                for &neighbor in incident {
                    if neighbor == key || visited.get(&neighbor).copied().unwrap_or(true) {
                        continue;
                    }
                    visited.insert(neighbor, true);

                    if let Some(face) = mesh.face_mut(&neighbor) {
                        if !face.orientation.is_defined() {
                            face.orientation = orientation_through(&neighbor, to, from);
                            assigned += 1;
                        }
                    }
                    queue.push_back(neighbor);
                }
            }
        }

        // Seed the next untouched component, if any.
        let Some(&seed) = seeds.find(|k| !visited.get(*k).copied().unwrap_or(true)) else {
            break;
        };
        visited.insert(seed, true);
        if let Some(face) = mesh.face_mut(&seed) {
            face.orientation = Orientation::Negative;
            assigned += 1;
        }
        queue.push_back(seed);
    }

    if assigned > 0 {
        log::debug!("assigned orientation to {} of {} faces", assigned, keys.len());
    }
    assigned
}

/// Inspect the orientation state of a mesh without modifying it.
pub fn check_orientation(mesh: &SurfaceMesh) -> OrientationReport {
    let mut report = OrientationReport {
        faces: mesh.num_faces(),
        ..Default::default()
    };

    report.undefined = mesh
        .faces()
        .filter(|(_, _, f)| !f.orientation.is_defined())
        .count();

    for ((a, b), incident) in edge_faces(mesh) {
        match incident.len() {
            1 => report.boundary_edges += 1,
            2 => {
                let winding =
                    |key: &FaceKey| mesh.face(key).and_then(|f| key.oriented(f.orientation));
                if let (Some(t0), Some(t1)) = (winding(&incident[0]), winding(&incident[1])) {
                    let forward0 = has_directed_edge(&t0, a, b);
                    let forward1 = has_directed_edge(&t1, a, b);
                    if forward0 == forward1 {
                        report.inconsistent_edges += 1;
                    }
                }
            }
            _ => report.non_manifold_edges += 1,
        }
    }

    report
}
