//! Top-level module for mesh topology.
//!
//! This module provides the simplex identifiers and the combinatorial layer
//! the remeshing operations are written against:
//! - `Simplex0/1/2` and the sorted `SimplexSet` with its set algebra
//! - composable `Predicate`s and `filter`
//! - the `InterfaceMesh` contract and the `TriangleMesh` implementation
//! - phase views and the vertex→element `Neighbors` index
//!
//! Most users will interact with `TriangleMesh` through `InterfaceMesh`.

pub mod mesh;
pub mod neighbors;
pub mod phase;
pub mod predicates;
pub mod simplex;
pub mod simplex_set;

pub use mesh::{InterfaceMesh, ParentLut, TriangleMesh};
pub use neighbors::Neighbors;
pub use phase::Phase;
pub use predicates::{Predicate, filter};
pub use simplex::{Index, Simplex, Simplex0, Simplex1, Simplex2, UNASSIGNED};
pub use simplex_set::{SimplexSet, difference, intersection, union};
