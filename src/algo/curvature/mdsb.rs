//! Meyer–Desbrun–Schröder–Barr curvature operators.
//!
//! Gaussian curvature is the angle defect over the mixed Voronoi area; mean
//! curvature is half the norm of the cotangent Laplacian over the same area.
//! Boundary vertices use a defect of `π - Σθ`.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::{CurvatureAlgorithm, CurvatureEstimator, CurvatureFields, Soup};
use crate::error::Result;
use crate::mesh::SurfaceMesh;

/// Mixed-area angle-defect and cotangent-Laplacian estimator.
#[derive(Debug, Clone)]
pub struct MdsbEstimator {
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for MdsbEstimator {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl MdsbEstimator {
    /// Create an estimator for single-threaded execution.
    pub fn sequential() -> Self {
        Self { parallel: false }
    }
}

impl CurvatureEstimator for MdsbEstimator {
    fn algorithm(&self) -> CurvatureAlgorithm {
        CurvatureAlgorithm::Mdsb
    }

    fn estimate(&self, mesh: &SurfaceMesh) -> Result<CurvatureFields> {
        let soup = Soup::from_surface(mesh)?;
        let compute = |v: usize| vertex_curvature(&soup, v);

        let values: Vec<(f64, f64)> = if self.parallel {
            (0..soup.num_vertices()).into_par_iter().map(compute).collect()
        } else {
            (0..soup.num_vertices()).map(compute).collect()
        };

        Ok(CurvatureFields::from_mean_gaussian(values))
    }
}

/// Compute the angle at vertex `a` in triangle (a, b, c).
fn triangle_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let (Some(ab), Some(ac)) = ((b - a).try_normalize(1e-300), (c - a).try_normalize(1e-300)) else {
        return 0.0;
    };
    ab.dot(&ac).clamp(-1.0, 1.0).acos()
}

/// Compute the cotangent of the angle at vertex `a` in triangle (a, b, c).
fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let cross_norm = ab.cross(&ac).norm();
    if cross_norm < 1e-10 {
        0.0
    } else {
        ab.dot(&ac) / cross_norm
    }
}

/// Index (0, 1, 2) of the obtuse corner of a triangle, if any.
fn obtuse_vertex(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<usize> {
    let half_pi = PI / 2.0;
    [
        triangle_angle(p0, p1, p2),
        triangle_angle(p1, p2, p0),
        triangle_angle(p2, p0, p1),
    ]
    .iter()
    .position(|&angle| angle > half_pi)
}

/// Voronoi area of corner `p` in a non-obtuse triangle (p, q, r).
fn voronoi_area_contribution(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> f64 {
    // (1/8) * (|pr|² cot(q) + |pq|² cot(r))
    let cot_q = cotangent_angle(q, r, p);
    let cot_r = cotangent_angle(r, p, q);
    0.125 * ((r - p).norm_squared() * cot_q + (q - p).norm_squared() * cot_r)
}

/// Mixed Voronoi area around a vertex.
///
/// Non-obtuse triangles contribute their Voronoi region; obtuse ones
/// contribute half their area when obtuse at the vertex and a quarter
/// otherwise.
fn mixed_area(soup: &Soup, v: usize) -> f64 {
    let mut area = 0.0;

    for &f in &soup.vertex_faces[v] {
        let [p, q, r] = soup.corner(f, v);
        let tri_area = soup.face_area(f);

        area += match obtuse_vertex(&p, &q, &r) {
            None => voronoi_area_contribution(&p, &q, &r),
            Some(0) => tri_area / 2.0,
            Some(_) => tri_area / 4.0,
        };
    }

    if area < 1e-10 {
        let fallback: f64 = soup.vertex_faces[v].iter().map(|&f| soup.face_area(f) / 3.0).sum();
        if fallback > 1e-10 {
            return fallback;
        }
    }

    area
}

/// Cotangent Laplacian of the position at a vertex.
///
/// Edge weights are clamped to be non-negative. The result is `2 H A n`
/// pointing against the outward normal on convex regions.
fn cotangent_laplacian(soup: &Soup, v: usize) -> Vector3<f64> {
    let mut weights: Vec<(usize, f64)> = Vec::with_capacity(soup.neighbors[v].len());

    for &f in &soup.vertex_faces[v] {
        let [a, b, c] = soup.triangles[f];
        let (j, k) = if a == v {
            (b, c)
        } else if b == v {
            (c, a)
        } else {
            (a, b)
        };
        let (pv, pj, pk) = (&soup.positions[v], &soup.positions[j], &soup.positions[k]);

        // Edge v-j is opposite corner k, edge v-k opposite corner j.
        for (other, cot) in [(j, cotangent_angle(pk, pv, pj)), (k, cotangent_angle(pj, pv, pk))] {
            match weights.iter_mut().find(|(u, _)| *u == other) {
                Some((_, w)) => *w += cot,
                None => weights.push((other, cot)),
            }
        }
    }

    let p_v = soup.positions[v];
    let laplacian: Vector3<f64> = weights
        .iter()
        .map(|&(u, w)| w.max(0.0) * (soup.positions[u] - p_v))
        .sum();
    0.5 * laplacian
}

/// `(H, K)` at one vertex.
fn vertex_curvature(soup: &Soup, v: usize) -> (f64, f64) {
    if soup.vertex_faces[v].is_empty() {
        return (0.0, 0.0);
    }

    let area = mixed_area(soup, v);
    if area <= 1e-10 {
        return (0.0, 0.0);
    }

    let angle_sum: f64 = soup.vertex_faces[v]
        .iter()
        .map(|&f| {
            let [p, q, r] = soup.corner(f, v);
            triangle_angle(&p, &q, &r)
        })
        .sum();
    let full = if soup.boundary[v] { PI } else { 2.0 * PI };
    let k = (full - angle_sum) / area;

    let laplacian = cotangent_laplacian(soup, v) / area;
    let h_unsigned = laplacian.norm() / 2.0;
    let sign = if laplacian.dot(&soup.vertex_normal(v)) > 0.0 {
        -1.0
    } else {
        1.0
    };

    (sign * h_unsigned, k)
}
