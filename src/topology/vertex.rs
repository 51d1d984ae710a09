//! `VertexId` and the [`Vertex`] capability trait.
//!
//! The engine never owns vertex adjacency: each vertex keeps its own source and
//! target lists and the [`Dag`](crate::topology::dag::Dag) only calls through this
//! trait. Any type that can report and mutate its adjacency can join a graph;
//! [`Node`](crate::topology::node::Node) is the ready-made implementation.

use crate::dag_error::DagError;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Unique, stable string identifier of a vertex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        VertexId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexId").field(&self.0).finish()
    }
}

/// Prints the bare id.
impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        VertexId(id.to_owned())
    }
}

impl From<String> for VertexId {
    fn from(id: String) -> Self {
        VertexId(id)
    }
}

/// Shared handle to a vertex as stored in the registry and in adjacency lists.
pub type VertexRef = Arc<dyn Vertex>;

/// Capability contract every graph node satisfies.
///
/// Mutators take `&self`: a vertex is shared between the registry and its
/// neighbours, so implementations guard their adjacency internally.
///
/// The implementation is the authority on edge validity. Adding an edge it already
/// records must fail with [`DagError::EdgeExists`]; removing one it does not record
/// must fail with [`DagError::EdgeNotFound`]. The engine surfaces these unchanged.
pub trait Vertex: Send + Sync + fmt::Debug {
    /// Identifier, stable for as long as the vertex is registered.
    fn id(&self) -> &VertexId;

    /// Vertices with an edge into `self`, in insertion order.
    fn sources(&self) -> Vec<VertexRef>;
    /// Vertices `self` has an edge to, in insertion order.
    fn targets(&self) -> Vec<VertexRef>;

    /// Number of sources.
    fn sources_len(&self) -> usize {
        self.sources().len()
    }
    /// Number of targets.
    fn targets_len(&self) -> usize {
        self.targets().len()
    }

    /// The source with the given id, if `self` records one.
    fn source(&self, id: &VertexId) -> Option<VertexRef> {
        self.sources().into_iter().find(|v| v.id() == id)
    }
    /// The target with the given id, if `self` records one.
    fn target(&self, id: &VertexId) -> Option<VertexRef> {
        self.targets().into_iter().find(|v| v.id() == id)
    }

    /// Ids of [`Vertex::sources`]. Implementations that store ids may override.
    fn source_ids(&self) -> Vec<VertexId> {
        self.sources().iter().map(|v| v.id().clone()).collect()
    }
    /// Ids of [`Vertex::targets`].
    fn target_ids(&self) -> Vec<VertexId> {
        self.targets().iter().map(|v| v.id().clone()).collect()
    }

    /// Record the edge `source -> self`.
    fn add_source(&self, source: &VertexRef) -> Result<(), DagError>;
    /// Record the edge `self -> target`.
    fn add_target(&self, target: &VertexRef) -> Result<(), DagError>;
    /// Forget the edge `id -> self`.
    fn remove_source(&self, id: &VertexId) -> Result<(), DagError>;
    /// Forget the edge `self -> id`.
    fn remove_target(&self, id: &VertexId) -> Result<(), DagError>;
}
