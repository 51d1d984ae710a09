//! Shadow relation index.
//!
//! A [`RelationIndex`] mirrors the adjacency each registered vertex stores, keyed by
//! id, so that traversals such as the topological sort never call into vertex
//! objects. Between any two public [`Dag`](crate::topology::dag::Dag) calls,
//! `relation[v].source_ids` is set-equal to the ids of `v.sources()`, and likewise
//! for targets.

use super::vertex::{VertexId, VertexRef};
use crate::dag_error::DagError;
use hashbrown::HashMap;

/// Source and target ids of one vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Relation {
    pub source_ids: Vec<VertexId>,
    pub target_ids: Vec<VertexId>,
}

impl Relation {
    /// Snapshot the current adjacency of `v`.
    pub fn of(v: &VertexRef) -> Self {
        Relation {
            source_ids: v.source_ids(),
            target_ids: v.target_ids(),
        }
    }

    #[inline]
    pub fn is_source_free(&self) -> bool {
        self.source_ids.is_empty()
    }

    fn scrub(&mut self, id: &VertexId) {
        self.source_ids.retain(|s| s != id);
        self.target_ids.retain(|t| t != id);
    }
}

/// Map from vertex id to its [`Relation`].
#[derive(Clone, Debug, Default)]
pub struct RelationIndex {
    relations: HashMap<VertexId, Relation>,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the live adjacency of `vertices`.
    pub fn from_vertices<'a, I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = &'a VertexRef>,
    {
        let relations = vertices
            .into_iter()
            .map(|v| (v.id().clone(), Relation::of(v)))
            .collect();
        RelationIndex { relations }
    }

    /// Start tracking `id` with no edges. Existing entries are left alone.
    pub fn insert_empty(&mut self, id: VertexId) {
        self.relations.entry(id).or_default();
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.relations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Iterate entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&VertexId, &Relation)> {
        self.relations.iter()
    }

    fn require(&self, id: &VertexId) -> Result<(), DagError> {
        if self.relations.contains_key(id) {
            Ok(())
        } else {
            Err(DagError::RelationMissing(id.clone()))
        }
    }

    /// Mirror the edge `from -> to`.
    ///
    /// Both entries are checked before either is touched, so a failure leaves the
    /// index unchanged.
    pub fn link(&mut self, from: &VertexId, to: &VertexId) -> Result<(), DagError> {
        self.require(from)?;
        self.require(to)?;
        if let Some(rel) = self.relations.get_mut(from) {
            rel.target_ids.push(to.clone());
        }
        if let Some(rel) = self.relations.get_mut(to) {
            rel.source_ids.push(from.clone());
        }
        Ok(())
    }

    /// Drop the mirrored edge `from -> to`.
    pub fn unlink(&mut self, from: &VertexId, to: &VertexId) -> Result<(), DagError> {
        self.require(from)?;
        self.require(to)?;
        if let Some(rel) = self.relations.get_mut(from) {
            rel.target_ids.retain(|t| t != to);
        }
        if let Some(rel) = self.relations.get_mut(to) {
            rel.source_ids.retain(|s| s != from);
        }
        Ok(())
    }

    /// Remove the entry for `id` and scrub `id` from every other entry.
    ///
    /// O(V · degree): every remaining relation is visited.
    pub fn drain(&mut self, id: &str) -> Option<Relation> {
        let removed = self.relations.remove(id)?;
        let key = VertexId::from(id);
        for rel in self.relations.values_mut() {
            rel.scrub(&key);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.relations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VertexId {
        VertexId::from(s)
    }

    fn index_of(ids: &[&str]) -> RelationIndex {
        let mut idx = RelationIndex::new();
        for s in ids {
            idx.insert_empty(id(s));
        }
        idx
    }

    #[test]
    fn link_mirrors_both_endpoints() {
        let mut idx = index_of(&["a", "b"]);
        idx.link(&id("a"), &id("b")).unwrap();
        assert_eq!(idx.get("a").unwrap().target_ids, vec![id("b")]);
        assert_eq!(idx.get("b").unwrap().source_ids, vec![id("a")]);
        assert!(idx.get("a").unwrap().is_source_free());
    }

    #[test]
    fn link_with_missing_entry_changes_nothing() {
        let mut idx = index_of(&["a"]);
        assert_eq!(
            idx.link(&id("a"), &id("ghost")),
            Err(DagError::RelationMissing(id("ghost")))
        );
        assert_eq!(idx.get("a"), Some(&Relation::default()));
    }

    #[test]
    fn unlink_removes_mirrors() {
        let mut idx = index_of(&["a", "b", "c"]);
        idx.link(&id("a"), &id("b")).unwrap();
        idx.link(&id("a"), &id("c")).unwrap();
        idx.unlink(&id("a"), &id("b")).unwrap();
        assert_eq!(idx.get("a").unwrap().target_ids, vec![id("c")]);
        assert!(idx.get("b").unwrap().source_ids.is_empty());
    }

    #[test]
    fn drain_scrubs_every_entry() {
        let mut idx = index_of(&["a", "b", "c"]);
        idx.link(&id("a"), &id("b")).unwrap();
        idx.link(&id("b"), &id("c")).unwrap();
        idx.link(&id("a"), &id("c")).unwrap();

        let drained = idx.drain("b").unwrap();
        assert_eq!(drained.source_ids, vec![id("a")]);
        assert_eq!(drained.target_ids, vec![id("c")]);
        assert!(!idx.contains("b"));
        assert_eq!(idx.get("a").unwrap().target_ids, vec![id("c")]);
        assert_eq!(idx.get("c").unwrap().source_ids, vec![id("a")]);
        assert!(idx.drain("b").is_none());
    }

    #[test]
    fn relation_serializes_with_plain_ids() {
        let rel = Relation {
            source_ids: vec![id("a")],
            target_ids: vec![id("c"), id("d")],
        };
        let json = serde_json::to_string(&rel).unwrap();
        assert_eq!(json, r#"{"source_ids":["a"],"target_ids":["c","d"]}"#);
        let back: Relation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rel);
    }
}
