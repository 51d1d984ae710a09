//! [`Node`]: a payload-carrying [`Vertex`] implementation.
//!
//! Adjacency is held as `(id, Weak)` pairs behind a `parking_lot::RwLock`, so two
//! linked nodes never keep each other alive and ids can be compared without
//! upgrading the handle.

use super::vertex::{Vertex, VertexId, VertexRef};
use crate::dag_error::DagError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

struct Link {
    id: VertexId,
    vertex: Weak<dyn Vertex>,
}

impl Link {
    fn to(vertex: &VertexRef) -> Self {
        Link {
            id: vertex.id().clone(),
            vertex: Arc::downgrade(vertex),
        }
    }
}

#[derive(Default)]
struct Adjacency {
    sources: Vec<Link>,
    targets: Vec<Link>,
}

fn position(links: &[Link], id: &VertexId) -> Option<usize> {
    links.iter().position(|l| &l.id == id)
}

fn upgrade_all(links: &[Link]) -> Vec<VertexRef> {
    links.iter().filter_map(|l| l.vertex.upgrade()).collect()
}

fn link_ids(links: &[Link]) -> Vec<VertexId> {
    links.iter().map(|l| l.id.clone()).collect()
}

/// A graph vertex carrying a caller payload of type `T`.
///
/// Rejects a duplicate edge with [`DagError::EdgeExists`] and an edge whose reverse
/// is already recorded with [`DagError::ReverseEdgeExists`].
///
/// # Example
/// ```
/// use vertex_dag::topology::node::Node;
/// use vertex_dag::topology::vertex::{Vertex, VertexRef};
/// let a: VertexRef = Node::new("a", 1u32);
/// let b: VertexRef = Node::new("b", 2u32);
/// b.add_source(&a).unwrap();
/// a.add_target(&b).unwrap();
/// assert_eq!(b.source_ids()[0].as_str(), "a");
/// assert!(a.add_source(&b).is_err());
/// ```
pub struct Node<T> {
    id: VertexId,
    payload: T,
    adjacency: RwLock<Adjacency>,
}

impl<T> Node<T> {
    /// Create a shareable node with no edges.
    pub fn new(id: impl Into<VertexId>, payload: T) -> Arc<Self> {
        Arc::new(Node {
            id: id.into(),
            payload,
            adjacency: RwLock::new(Adjacency::default()),
        })
    }

    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adj = self.adjacency.read();
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("payload", &self.payload)
            .field("sources", &link_ids(&adj.sources))
            .field("targets", &link_ids(&adj.targets))
            .finish()
    }
}

impl<T> Vertex for Node<T>
where
    T: fmt::Debug + Send + Sync,
{
    fn id(&self) -> &VertexId {
        &self.id
    }

    fn sources(&self) -> Vec<VertexRef> {
        upgrade_all(&self.adjacency.read().sources)
    }

    fn targets(&self) -> Vec<VertexRef> {
        upgrade_all(&self.adjacency.read().targets)
    }

    fn sources_len(&self) -> usize {
        self.adjacency.read().sources.len()
    }

    fn targets_len(&self) -> usize {
        self.adjacency.read().targets.len()
    }

    fn source(&self, id: &VertexId) -> Option<VertexRef> {
        let adj = self.adjacency.read();
        position(&adj.sources, id).and_then(|i| adj.sources[i].vertex.upgrade())
    }

    fn target(&self, id: &VertexId) -> Option<VertexRef> {
        let adj = self.adjacency.read();
        position(&adj.targets, id).and_then(|i| adj.targets[i].vertex.upgrade())
    }

    fn source_ids(&self) -> Vec<VertexId> {
        link_ids(&self.adjacency.read().sources)
    }

    fn target_ids(&self) -> Vec<VertexId> {
        link_ids(&self.adjacency.read().targets)
    }

    fn add_source(&self, source: &VertexRef) -> Result<(), DagError> {
        let mut adj = self.adjacency.write();
        let from = source.id();
        if position(&adj.sources, from).is_some() {
            return Err(DagError::EdgeExists {
                from: from.clone(),
                to: self.id.clone(),
            });
        }
        if position(&adj.targets, from).is_some() {
            return Err(DagError::ReverseEdgeExists {
                from: from.clone(),
                to: self.id.clone(),
            });
        }
        adj.sources.push(Link::to(source));
        Ok(())
    }

    fn add_target(&self, target: &VertexRef) -> Result<(), DagError> {
        let mut adj = self.adjacency.write();
        let to = target.id();
        if position(&adj.targets, to).is_some() {
            return Err(DagError::EdgeExists {
                from: self.id.clone(),
                to: to.clone(),
            });
        }
        if position(&adj.sources, to).is_some() {
            return Err(DagError::ReverseEdgeExists {
                from: self.id.clone(),
                to: to.clone(),
            });
        }
        adj.targets.push(Link::to(target));
        Ok(())
    }

    fn remove_source(&self, id: &VertexId) -> Result<(), DagError> {
        let mut adj = self.adjacency.write();
        let i = position(&adj.sources, id).ok_or_else(|| DagError::EdgeNotFound {
            from: id.clone(),
            to: self.id.clone(),
        })?;
        adj.sources.remove(i);
        Ok(())
    }

    fn remove_target(&self, id: &VertexId) -> Result<(), DagError> {
        let mut adj = self.adjacency.write();
        let i = position(&adj.targets, id).ok_or_else(|| DagError::EdgeNotFound {
            from: self.id.clone(),
            to: id.clone(),
        })?;
        adj.targets.remove(i);
        Ok(())
    }
}
