//! Mesh processing algorithms.
//!
//! - **Curvature**: per-vertex curvature estimation ([`curvature`])
//! - **Smoothing**: Laplacian smoothing of per-vertex fields ([`smooth`])
//! - **Classification**: percentile truncation for display ([`classify`])

pub mod classify;
pub mod curvature;
pub mod smooth;
