//! Top-level module for graph topology.
//!
//! This module provides the core types for representing a DAG:
//! - [`vertex`]: vertex ids and the capability trait vertices implement
//! - [`node`]: a payload-carrying vertex implementation
//! - [`relation`]: the id-keyed shadow index of vertex adjacency
//! - [`dag`]: the engine tying registry and index together
//!
//! Most users will interact with [`Dag`] and [`Node`].

pub mod dag;
pub mod node;
pub mod relation;
pub mod vertex;

pub use dag::Dag;
pub use node::Node;
pub use relation::{Relation, RelationIndex};
pub use vertex::{Vertex, VertexId, VertexRef};
