//! DagError: Unified error type for vertex-dag public APIs
//!
//! Every fallible engine, vertex and sort operation returns this type. Messages
//! embed the offending vertex id(s); there is no structured code beyond the variant.

use crate::topology::vertex::VertexId;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type DagResult<T> = Result<T, DagError>;

/// Unified error type for DAG operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DagError {
    /// A vertex with this id is already registered.
    #[error("the vertex id: {0} already exists in DAG")]
    VertexExists(VertexId),
    /// No vertex with this id is registered.
    #[error("the vertex id: {0} not found in DAG")]
    VertexNotFound(VertexId),
    /// The vertex already records the edge `from -> to`.
    #[error("edge {from} -> {to} already exists")]
    EdgeExists { from: VertexId, to: VertexId },
    /// The vertex does not record the edge `from -> to`.
    #[error("edge {from} -> {to} not found")]
    EdgeNotFound { from: VertexId, to: VertexId },
    /// Adding `from -> to` while `to -> from` is present would close a 2-cycle.
    #[error("edge {to} -> {from} already exists; {from} -> {to} would form a cycle")]
    ReverseEdgeExists { from: VertexId, to: VertexId },
    /// An edge from a vertex to itself.
    #[error("self loop on vertex {0} is not allowed in a DAG")]
    SelfLoop(VertexId),
    /// The shadow relation index has no entry for a registered vertex.
    #[error("relation update failed: no relation entry for registered vertex {0}")]
    RelationMissing(VertexId),
    /// The shadow relation index disagrees with the vertex's own adjacency.
    #[error("relation for vertex {id} out of sync with vertex adjacency: {detail}")]
    RelationMismatch { id: VertexId, detail: String },
    /// More than one vertex without sources was found during root discovery.
    #[error("multiple roots found in DAG: {first} and {second}")]
    MultipleRoots { first: VertexId, second: VertexId },
    /// No vertex without sources exists.
    #[error("root not found in DAG, possible cycle")]
    RootNotFound,
    /// Vertices left undrained once no frontier remains.
    #[error("cycle detected among vertices: {}", itertools::join(.remaining, ", "))]
    CycleDetected { remaining: Vec<VertexId> },
}
