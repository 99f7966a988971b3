//! Geometry for grit-remesh.
//!
//! `primitives` holds the pure 2D formulas (areas, angles, barycentric
//! weights, collapse times); `checks` combines them with mesh topology and
//! current vertex positions.

pub mod checks;
pub mod primitives;

pub use primitives::Vec2;
