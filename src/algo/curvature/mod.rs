//! Discrete curvature estimation on surface meshes.
//!
//! Two estimators are provided, selected by [`CurvatureAlgorithm`]:
//!
//! - [`MdsbEstimator`]: angle defect and cotangent Laplacian over mixed
//!   Voronoi areas (Meyer, Desbrun, Schröder, Barr)
//! - [`JetsEstimator`]: osculating quadric fitted over the two-ring
//!   (Cazals, Pouget)
//!
//! Both return the four per-vertex fields of [`CurvatureFields`]. Mean
//! curvature is positive on convex regions when faces wind outward.
//!
//! # Example
//!
//! ```
//! use surfbridge::algo::curvature::{estimator_for, CurvatureAlgorithm, CurvatureType};
//! use surfbridge::mesh::{canonicalize, SurfaceFace, SurfaceMesh, SurfaceVertex, VertexId};
//! use nalgebra::Point3;
//!
//! let mut mesh = SurfaceMesh::new();
//! for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
//!     mesh.add_vertex(SurfaceVertex::new(Point3::new(p[0], p[1], p[2]), true));
//! }
//! let (key, o) = canonicalize([VertexId::new(0), VertexId::new(1), VertexId::new(2)]).unwrap();
//! mesh.insert_face(key, SurfaceFace::new(o, 0)).unwrap();
//!
//! let fields = estimator_for(CurvatureAlgorithm::Mdsb).estimate(&mesh).unwrap();
//! assert_eq!(fields.get(CurvatureType::Kg).len(), 3);
//! ```
//!
//! # References
//!
//! - Meyer, M., et al. (2003). "Discrete Differential-Geometry Operators for
//!   Triangulated 2-Manifolds." Visualization and Mathematics III.
//! - Cazals, F., Pouget, M. (2005). "Estimating differential quantities using
//!   polynomial fitting of osculating jets." CAGD 22(2).

mod jets;
mod mdsb;

pub use jets::JetsEstimator;
pub use mdsb::MdsbEstimator;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};

use crate::error::{BridgeError, Result};
use crate::mesh::SurfaceMesh;

/// Curvature estimation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CurvatureAlgorithm {
    /// Meyer, Desbrun, Schröder, Barr.
    #[default]
    Mdsb,
    /// Jet fitting.
    Jets,
}

impl CurvatureAlgorithm {
    /// Tag used in layer names.
    pub fn tag(self) -> &'static str {
        match self {
            CurvatureAlgorithm::Mdsb => "MDSB",
            CurvatureAlgorithm::Jets => "JETS",
        }
    }

    /// All algorithms.
    pub fn all() -> [CurvatureAlgorithm; 2] {
        [CurvatureAlgorithm::Mdsb, CurvatureAlgorithm::Jets]
    }
}

impl fmt::Display for CurvatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CurvatureAlgorithm {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|a| a.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| BridgeError::invalid_param("algorithm", s, "expected MDSB or JETS"))
    }
}

/// Which curvature quantity a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CurvatureType {
    /// First principal curvature (the larger).
    #[default]
    K1,
    /// Second principal curvature (the smaller).
    K2,
    /// Gaussian curvature.
    Kg,
    /// Mean curvature.
    Kh,
}

impl CurvatureType {
    /// Tag used in layer names.
    pub fn tag(self) -> &'static str {
        match self {
            CurvatureType::K1 => "K1",
            CurvatureType::K2 => "K2",
            CurvatureType::Kg => "KG",
            CurvatureType::Kh => "KH",
        }
    }

    /// All types, in the order they are stored.
    pub fn all() -> [CurvatureType; 4] {
        [CurvatureType::K1, CurvatureType::K2, CurvatureType::Kg, CurvatureType::Kh]
    }
}

impl fmt::Display for CurvatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CurvatureType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BridgeError::invalid_param("curvature type", s, "expected K1, K2, KG or KH")
            })
    }
}

/// Per-vertex curvature fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvatureFields {
    /// Mean curvature.
    pub kh: Vec<f64>,
    /// Gaussian curvature.
    pub kg: Vec<f64>,
    /// First principal curvature.
    pub k1: Vec<f64>,
    /// Second principal curvature.
    pub k2: Vec<f64>,
}

impl CurvatureFields {
    /// Assemble fields from per-vertex `(H, K)` pairs.
    ///
    /// Principal curvatures are `H ± sqrt(max(H² - K, 0))`.
    pub fn from_mean_gaussian(values: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut fields = Self::default();
        for (h, k) in values {
            let root = (h * h - k).max(0.0).sqrt();
            fields.kh.push(h);
            fields.kg.push(k);
            fields.k1.push(h + root);
            fields.k2.push(h - root);
        }
        fields
    }

    /// The field of one curvature type.
    pub fn get(&self, kind: CurvatureType) -> &[f64] {
        match kind {
            CurvatureType::K1 => &self.k1,
            CurvatureType::K2 => &self.k2,
            CurvatureType::Kg => &self.kg,
            CurvatureType::Kh => &self.kh,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.kh.len()
    }

    /// Whether there are no vertices.
    pub fn is_empty(&self) -> bool {
        self.kh.is_empty()
    }
}

/// A curvature estimator.
pub trait CurvatureEstimator: Send + Sync {
    /// Which algorithm this is.
    fn algorithm(&self) -> CurvatureAlgorithm;

    /// Estimate all four fields.
    ///
    /// Fails with [`BridgeError::UndefinedOrientation`] if any face is still
    /// unoriented.
    fn estimate(&self, mesh: &SurfaceMesh) -> Result<CurvatureFields>;
}

/// The built-in estimator for an algorithm.
pub fn estimator_for(algorithm: CurvatureAlgorithm) -> Box<dyn CurvatureEstimator> {
    match algorithm {
        CurvatureAlgorithm::Mdsb => Box::new(MdsbEstimator::default()),
        CurvatureAlgorithm::Jets => Box::new(JetsEstimator::default()),
    }
}

/// Indexed triangle soup with vertex-face and vertex-vertex incidence.
#[derive(Debug, Clone)]
pub(crate) struct Soup {
    pub positions: Vec<Point3<f64>>,
    pub triangles: Vec<[usize; 3]>,
    pub vertex_faces: Vec<Vec<usize>>,
    pub neighbors: Vec<Vec<usize>>,
    pub boundary: Vec<bool>,
}

impl Soup {
    pub fn from_surface(mesh: &SurfaceMesh) -> Result<Self> {
        let triangles: Vec<[usize; 3]> = mesh
            .oriented_triangles()?
            .into_iter()
            .map(|t| t.map(|v| v.index()))
            .collect();
        let positions: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| v.position).collect();
        let n = positions.len();

        let mut vertex_faces = vec![Vec::new(); n];
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

        for (fi, tri) in triangles.iter().enumerate() {
            for i in 0..3 {
                let (a, b) = (tri[i], tri[(i + 1) % 3]);
                vertex_faces[a].push(fi);
                *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        let mut boundary = vec![false; n];
        for (&(a, b), &count) in &edge_count {
            neighbors[a].push(b);
            neighbors[b].push(a);
            if count == 1 {
                boundary[a] = true;
                boundary[b] = true;
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }

        Ok(Self {
            positions,
            triangles,
            vertex_faces,
            neighbors,
            boundary,
        })
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Positions of a face rotated so that vertex `v` comes first.
    pub fn corner(&self, face: usize, v: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[face];
        let p = &self.positions;
        if a == v {
            [p[a], p[b], p[c]]
        } else if b == v {
            [p[b], p[c], p[a]]
        } else {
            [p[c], p[a], p[b]]
        }
    }

    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangles[face];
        let p = &self.positions;
        (p[b] - p[a]).cross(&(p[c] - p[a]))
    }

    pub fn face_area(&self, face: usize) -> f64 {
        0.5 * self.face_normal(face).norm()
    }

    /// Area-weighted vertex normal, or zero for isolated vertices.
    pub fn vertex_normal(&self, v: usize) -> Vector3<f64> {
        let sum: Vector3<f64> = self.vertex_faces[v]
            .iter()
            .map(|&f| self.face_normal(f))
            .sum();
        sum.try_normalize(1e-300).unwrap_or_else(Vector3::zeros)
    }

    /// Vertices within two edges of `v`, excluding `v`.
    pub fn two_ring(&self, v: usize) -> Vec<usize> {
        let mut ring: Vec<usize> = self.neighbors[v].clone();
        for &n in &self.neighbors[v] {
            ring.extend_from_slice(&self.neighbors[n]);
        }
        ring.sort_unstable();
        ring.dedup();
        ring.retain(|&u| u != v);
        ring
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for a in CurvatureAlgorithm::all() {
            assert_eq!(a.tag().parse::<CurvatureAlgorithm>().unwrap(), a);
        }
        for t in CurvatureType::all() {
            assert_eq!(t.to_string().to_lowercase().parse::<CurvatureType>().unwrap(), t);
        }
        assert!("mdsbx".parse::<CurvatureAlgorithm>().is_err());
    }

    #[test]
    fn test_principal_from_mean_gaussian() {
        let fields = CurvatureFields::from_mean_gaussian([(1.0, 1.0), (0.0, -4.0), (1.0, 2.0)]);
        assert_eq!(fields.k1, vec![1.0, 2.0, 1.0]);
        assert_eq!(fields.k2, vec![1.0, -2.0, 1.0]);
        assert_eq!(fields.get(CurvatureType::Kg), &[1.0, -4.0, 2.0]);
    }

    #[test]
    fn test_soup_incidence() {
        let mesh = fixtures::flat_grid(2);
        let soup = Soup::from_surface(&mesh).unwrap();
        assert_eq!(soup.num_vertices(), 9);
        // Centre vertex is interior with six neighbours
        assert!(!soup.boundary[4]);
        assert_eq!(soup.neighbors[4].len(), 6);
        assert!(soup.boundary[0]);
        assert!((soup.vertex_normal(4) - Vector3::z()).norm() < 1e-12);
        assert_eq!(soup.two_ring(0), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_estimators_require_orientation() {
        let mut mesh = fixtures::flat_grid(1);
        let key = mesh.face_keys().next().unwrap();
        mesh.face_mut(&key).unwrap().orientation = crate::mesh::Orientation::Undefined;
        for a in CurvatureAlgorithm::all() {
            assert!(matches!(
                estimator_for(a).estimate(&mesh),
                Err(BridgeError::UndefinedOrientation { .. })
            ));
        }
    }
}
