//! Jet-fitting curvature estimation.
//!
//! Around each vertex the two-ring is expressed in a local frame whose `z`
//! axis is the vertex normal, and the height function
//! `z = a x² + b xy + c y² + d x + e y` is fitted by least squares. Curvatures
//! follow from the first and second fundamental forms of the fitted graph.

use nalgebra::{DMatrix, DVector, Point3, Vector3};
use rayon::prelude::*;

use super::{CurvatureAlgorithm, CurvatureEstimator, CurvatureFields, Soup};
use crate::error::Result;
use crate::mesh::SurfaceMesh;

/// Minimum number of samples for a quadric fit.
const MIN_SAMPLES: usize = 5;

/// Osculating-quadric estimator over the two-ring of each vertex.
#[derive(Debug, Clone)]
pub struct JetsEstimator {
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for JetsEstimator {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl JetsEstimator {
    /// Create an estimator for single-threaded execution.
    pub fn sequential() -> Self {
        Self { parallel: false }
    }
}

impl CurvatureEstimator for JetsEstimator {
    fn algorithm(&self) -> CurvatureAlgorithm {
        CurvatureAlgorithm::Jets
    }

    fn estimate(&self, mesh: &SurfaceMesh) -> Result<CurvatureFields> {
        let soup = Soup::from_surface(mesh)?;
        let compute = |v: usize| fit_vertex(&soup, v).unwrap_or((0.0, 0.0));

        let values: Vec<(f64, f64)> = if self.parallel {
            (0..soup.num_vertices()).into_par_iter().map(compute).collect()
        } else {
            (0..soup.num_vertices()).map(compute).collect()
        };

        Ok(CurvatureFields::from_mean_gaussian(values))
    }
}

/// Orthonormal tangent vectors completing `n` to a right-handed frame.
fn tangent_frame(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if n.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let u = helper.cross(n).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// `(H, K)` from a quadric fit at one vertex, or `None` if underdetermined.
fn fit_vertex(soup: &Soup, v: usize) -> Option<(f64, f64)> {
    let ring = soup.two_ring(v);
    if ring.len() < MIN_SAMPLES {
        return None;
    }

    let normal = soup.vertex_normal(v);
    if normal.norm_squared() < 0.5 {
        return None;
    }
    let (tu, tv) = tangent_frame(&normal);
    let origin: Point3<f64> = soup.positions[v];

    // Scale to unit mean distance for conditioning.
    let scale = ring
        .iter()
        .map(|&u| (soup.positions[u] - origin).norm())
        .sum::<f64>()
        / ring.len() as f64;
    if scale < 1e-12 {
        return None;
    }

    let mut a = DMatrix::<f64>::zeros(ring.len(), 5);
    let mut b = DVector::<f64>::zeros(ring.len());
    for (row, &u) in ring.iter().enumerate() {
        let d = (soup.positions[u] - origin) / scale;
        let (x, y, z) = (d.dot(&tu), d.dot(&tv), d.dot(&normal));
        a[(row, 0)] = x * x;
        a[(row, 1)] = x * y;
        a[(row, 2)] = y * y;
        a[(row, 3)] = x;
        a[(row, 4)] = y;
        b[row] = z;
    }

    let coeffs = a.svd(true, true).solve(&b, 1e-12).ok()?;
    let (qa, qb, qc, qd, qe) = (coeffs[0], coeffs[1], coeffs[2], coeffs[3], coeffs[4]);

    // Fundamental forms of the graph at the origin.
    let e = 1.0 + qd * qd;
    let f = qd * qe;
    let g = 1.0 + qe * qe;
    let w = (1.0 + qd * qd + qe * qe).sqrt();
    let l = 2.0 * qa / w;
    let m = qb / w;
    let n = 2.0 * qc / w;

    let det = e * g - f * f;
    let k = (l * n - m * m) / det;
    // Outward normal: a convex cap bends towards -z.
    let h = -(e * n - 2.0 * f * m + g * l) / (2.0 * det);

    Some((h / scale, k / (scale * scale)))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{flat_grid, icosphere, surface_from};
    use super::*;

    #[test]
    fn test_frame_is_orthonormal() {
        for n in [Vector3::z(), Vector3::x(), Vector3::new(1.0, 1.0, 1.0).normalize()] {
            let (u, v) = tangent_frame(&n);
            assert!(u.dot(&n).abs() < 1e-12);
            assert!(v.dot(&n).abs() < 1e-12);
            assert!(u.dot(&v).abs() < 1e-12);
            assert!((u.cross(&v) - n).norm() < 1e-12);
        }
    }

    #[test]
    fn test_flat_plane_is_zero() {
        let mesh = flat_grid(4);
        let fields = JetsEstimator::default().estimate(&mesh).unwrap();
        for v in 0..fields.len() {
            assert!(fields.kh[v].abs() < 1e-9, "H[{}] = {}", v, fields.kh[v]);
            assert!(fields.kg[v].abs() < 1e-9, "K[{}] = {}", v, fields.kg[v]);
        }
    }

    #[test]
    fn test_unit_sphere() {
        let mesh = icosphere(2);
        let fields = JetsEstimator::default().estimate(&mesh).unwrap();
        for v in 0..fields.len() {
            assert!((fields.kh[v] - 1.0).abs() < 0.15, "H[{}] = {}", v, fields.kh[v]);
            assert!((fields.kg[v] - 1.0).abs() < 0.3, "K[{}] = {}", v, fields.kg[v]);
        }
    }

    #[test]
    fn test_scale_invariance() {
        let small = icosphere(1);
        let mut big = small.clone();
        for v in big.vertex_ids().collect::<Vec<_>>() {
            let p = big.vertex(v).position;
            big.vertex_mut(v).position = Point3::from(p.coords * 2.0);
        }
        let hs = JetsEstimator::default().estimate(&small).unwrap();
        let hb = JetsEstimator::default().estimate(&big).unwrap();
        for v in 0..hs.len() {
            assert!((hs.kh[v] - 2.0 * hb.kh[v]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_too_few_neighbours_is_zero() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = surface_from(&vertices, &[[0, 1, 2]]);
        let fields = JetsEstimator::sequential().estimate(&mesh).unwrap();
        assert!(fields.kh.iter().chain(&fields.kg).all(|&x| x == 0.0));
    }
}
