//! Laplacian smoothing of per-vertex scalar fields.
//!
//! Each pass replaces every value with the average of itself and its edge
//! neighbours:
//!
//! ```text
//! out[v] = (data[v] + Σ data[u] for u adjacent to v) / (1 + degree(v))
//! ```
//!
//! A pass reads only the previous pass's values (two buffers swapped at the
//! end of each pass), so the result does not depend on vertex order and the
//! per-vertex work can run in parallel.
//!
//! # Example
//!
//! ```
//! use surfbridge::algo::smooth::{smooth_field, FieldSmoothOptions, VertexAdjacency};
//!
//! // A path 0 - 1 - 2
//! let adjacency = VertexAdjacency::from_edges(3, &[(0, 1), (1, 2)]);
//! let out = smooth_field(&[3.0, 0.0, 0.0], &adjacency, &FieldSmoothOptions::default().with_iterations(1)).unwrap();
//! assert_eq!(out, vec![1.5, 1.0, 0.0]);
//! ```

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::error::{BridgeError, Result};
use crate::mesh::SurfaceMesh;

/// Undirected vertex adjacency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexAdjacency {
    neighbors: Vec<Vec<usize>>,
}

impl VertexAdjacency {
    /// Build from undirected edges over `num_vertices` vertices.
    ///
    /// Self-loops, duplicate edges and edges touching missing vertices are
    /// ignored.
    pub fn from_edges(num_vertices: usize, edges: &[(usize, usize)]) -> Self {
        let unique: BTreeSet<(usize, usize)> = edges
            .iter()
            .filter(|&&(a, b)| a != b && a < num_vertices && b < num_vertices)
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();

        let mut neighbors = vec![Vec::new(); num_vertices];
        for (a, b) in unique {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        Self { neighbors }
    }

    /// Build from polygon boundaries.
    pub fn from_polygons(num_vertices: usize, polygons: &[Vec<usize>]) -> Self {
        let edges: Vec<(usize, usize)> = polygons
            .iter()
            .flat_map(|p| (0..p.len()).map(move |i| (p[i], p[(i + 1) % p.len()])))
            .collect();
        Self::from_edges(num_vertices, &edges)
    }

    /// Build from the faces of a surface mesh.
    pub fn from_surface(mesh: &SurfaceMesh) -> Self {
        let edges: Vec<(usize, usize)> = mesh
            .face_keys()
            .flat_map(|key| key.edges())
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        Self::from_edges(mesh.num_vertices(), &edges)
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.neighbors.len()
    }

    /// Sorted neighbours of a vertex.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    /// Number of neighbours of a vertex.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }
}

/// Options for [`smooth_field`].
#[derive(Debug, Clone)]
pub struct FieldSmoothOptions {
    /// Number of smoothing passes. Zero returns the input unchanged.
    pub iterations: usize,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for FieldSmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            parallel: true,
        }
    }
}

impl FieldSmoothOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Smooth a per-vertex field over an adjacency.
///
/// Fails with [`BridgeError::FieldLengthMismatch`] if the field does not have
/// one value per vertex.
pub fn smooth_field(
    data: &[f64],
    adjacency: &VertexAdjacency,
    options: &FieldSmoothOptions,
) -> Result<Vec<f64>> {
    if data.len() != adjacency.num_vertices() {
        return Err(BridgeError::FieldLengthMismatch {
            expected: adjacency.num_vertices(),
            actual: data.len(),
        });
    }

    let mut current = data.to_vec();
    let mut next = vec![0.0; data.len()];

    for _ in 0..options.iterations {
        let average = |(v, out): (usize, &mut f64)| {
            let sum: f64 = adjacency.neighbors(v).iter().map(|&u| current[u]).sum();
            *out = (current[v] + sum) / (1 + adjacency.degree(v)) as f64;
        };

        if options.parallel {
            next.par_iter_mut().enumerate().for_each(average);
        } else {
            next.iter_mut().enumerate().for_each(average);
        }

        std::mem::swap(&mut current, &mut next);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> VertexAdjacency {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        VertexAdjacency::from_edges(n, &edges)
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let data = vec![1.0, -2.0, 3.5, 0.25];
        let options = FieldSmoothOptions::default().with_iterations(0);
        let out = smooth_field(&data, &ring(4), &options).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_constant_is_fixed_point() {
        let data = vec![2.5; 6];
        let options = FieldSmoothOptions::default().with_iterations(10);
        let out = smooth_field(&data, &ring(6), &options).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_reads_previous_pass_only() {
        // Path 0 - 1 - 2 - 3 with a spike at 0.
        let adjacency = VertexAdjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let options = FieldSmoothOptions::default().with_iterations(1);
        let out = smooth_field(&[6.0, 0.0, 0.0, 0.0], &adjacency, &options).unwrap();
        // In-place updating would have leaked the spike into vertex 2.
        assert_eq!(out, vec![3.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_isolated_vertex_unchanged() {
        let adjacency = VertexAdjacency::from_edges(3, &[(0, 1)]);
        let options = FieldSmoothOptions::default().with_iterations(3);
        let out = smooth_field(&[1.0, 3.0, 7.0], &adjacency, &options).unwrap();
        assert_eq!(out[2], 7.0);
        assert_eq!(out[0], 2.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin()).collect();
        let adjacency = ring(50);
        let options = FieldSmoothOptions::default().with_iterations(7);
        let par = smooth_field(&data, &adjacency, &options).unwrap();
        let seq = smooth_field(&data, &adjacency, &options.clone().sequential()).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_length_mismatch() {
        let result = smooth_field(&[1.0, 2.0], &ring(3), &FieldSmoothOptions::default());
        assert!(matches!(
            result,
            Err(BridgeError::FieldLengthMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_adjacency_deduplicates() {
        let polygons = [vec![0, 1, 2], vec![0, 2, 3], vec![0, 1, 2, 3]];
        let adjacency = VertexAdjacency::from_polygons(4, &polygons);
        assert_eq!(adjacency.neighbors(0), &[1, 2, 3]);
        assert_eq!(adjacency.degree(1), 2);
        assert_eq!(adjacency.degree(2), 3);
    }
}
