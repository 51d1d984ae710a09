//! The graph engine.
//!
//! [`Dag`] owns the vertex registry (an [`OrderedMap`] from id to [`VertexRef`]) and
//! the shadow [`RelationIndex`]. Every edge mutation goes to the vertices first,
//! which are the authority on edge validity, and is mirrored into the index only
//! once they accept it.
//!
//! Mutators take `&mut self`; the registry is internally synchronized but the
//! vertex/index pair is updated in two steps and must not be interleaved.

use super::relation::{Relation, RelationIndex};
use super::vertex::{VertexId, VertexRef};
use crate::algs::topo_sort::{self, SortOptions};
use crate::dag_error::{DagError, DagResult};
use crate::data::ordered_map::OrderedMap;
use crate::debug_invariants::DebugInvariants;
use itertools::Itertools;
use std::ops::ControlFlow;

/// Vertex registry plus shadow relation index.
///
/// # Example
/// ```
/// use vertex_dag::prelude::*;
/// let mut dag = Dag::new();
/// let a: VertexRef = Node::new("a", ());
/// let b: VertexRef = Node::new("b", ());
/// dag.add_vertices([a.clone(), b.clone()]).unwrap();
/// dag.add_edge(&a, &b).unwrap();
/// let order: Vec<_> = dag.topological_sort().unwrap().iter().map(|v| v.id().to_string()).collect();
/// assert_eq!(order, ["a", "b"]);
/// ```
#[derive(Debug, Default)]
pub struct Dag {
    registry: OrderedMap<VertexId, VertexRef>,
    pub(crate) relations: RelationIndex,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine over an existing registry, deriving the relation index from
    /// the adjacency the vertices already hold.
    ///
    /// # Errors
    /// * [`DagError::RelationMismatch`]: a vertex is stored under a key other than its id.
    /// * [`DagError::VertexNotFound`]: a vertex links to an unregistered neighbour.
    pub fn with_registry(registry: OrderedMap<VertexId, VertexRef>) -> DagResult<Self> {
        let vertices = registry.values();
        for (key, v) in registry.keys().iter().zip(&vertices) {
            if key != v.id() {
                return Err(mismatch(
                    key,
                    format!("registered under this key but reports id {}", v.id()),
                ));
            }
            let mut neighbours = v.source_ids().into_iter().chain(v.target_ids());
            if let Some(stray) = neighbours.find(|n| !registry.contains_key(n.as_str())) {
                return Err(DagError::VertexNotFound(stray));
            }
        }

        let relations = RelationIndex::from_vertices(&vertices);
        let dag = Dag {
            registry,
            relations,
        };
        dag.validate_invariants()?;
        Ok(dag)
    }

    /// Register `v` with an empty relation entry.
    ///
    /// Edges are declared through [`Dag::add_edge`]; a vertex should join the
    /// graph without adjacency of its own.
    ///
    /// # Errors
    /// [`DagError::VertexExists`] if the id is taken; the registered vertex is untouched.
    pub fn add_vertex(&mut self, v: VertexRef) -> DagResult<()> {
        let id = v.id().clone();
        let (_, existed) = self.registry.put_or_get(id.clone(), v);
        if existed {
            return Err(DagError::VertexExists(id));
        }
        log::debug!("registered vertex {id}");
        self.relations.insert_empty(id);
        Ok(())
    }

    /// Register each vertex in turn, stopping at the first duplicate.
    ///
    /// Not transactional: vertices before the duplicate stay registered.
    pub fn add_vertices<I>(&mut self, vertices: I) -> DagResult<()>
    where
        I: IntoIterator<Item = VertexRef>,
    {
        vertices.into_iter().try_for_each(|v| self.add_vertex(v))
    }

    pub fn get_vertex(&self, id: &str) -> Option<VertexRef> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    /// The registered vertex sharing `v`'s id. Mutations go through this handle so
    /// a foreign object carrying a registered id cannot desync the index.
    fn resolve(&self, v: &VertexRef) -> DagResult<VertexRef> {
        self.get_vertex(v.id().as_str())
            .ok_or_else(|| DagError::VertexNotFound(v.id().clone()))
    }

    /// Add the edge `source -> target`.
    ///
    /// Both endpoints must be registered (matched by id; the registered instances
    /// are the ones mutated). The target records the source first; if the source
    /// then rejects the target, the first half is undone so the vertices never
    /// disagree.
    pub fn add_edge(&mut self, source: &VertexRef, target: &VertexRef) -> DagResult<()> {
        let source = &self.resolve(source)?;
        let target = &self.resolve(target)?;
        if source.id() == target.id() {
            return Err(DagError::SelfLoop(source.id().clone()));
        }

        target.add_source(source)?;
        if let Err(e) = source.add_target(target) {
            if let Err(undo) = target.remove_source(source.id()) {
                log::warn!(
                    "could not undo half of edge {} -> {}: {undo}",
                    source.id(),
                    target.id()
                );
                self.resync_relations();
            }
            return Err(e);
        }

        self.relations.link(source.id(), target.id())?;
        log::debug!("added edge {} -> {}", source.id(), target.id());
        Ok(())
    }

    /// Remove the edge `source -> target`.
    ///
    /// The source forgets the target first; if the target then refuses, the source
    /// is given the target back.
    ///
    /// # Errors
    /// [`DagError::VertexNotFound`] for an unregistered endpoint, or whatever the
    /// vertices report for a missing edge.
    pub fn remove_edge(&mut self, source: &VertexRef, target: &VertexRef) -> DagResult<()> {
        let source = &self.resolve(source)?;
        let target = &self.resolve(target)?;

        source.remove_target(target.id())?;
        if let Err(e) = target.remove_source(source.id()) {
            if let Err(undo) = source.add_target(target) {
                log::warn!(
                    "could not restore edge {} -> {}: {undo}",
                    source.id(),
                    target.id()
                );
                self.resync_relations();
            }
            return Err(e);
        }

        self.relations.unlink(source.id(), target.id())?;
        log::debug!("removed edge {} -> {}", source.id(), target.id());
        Ok(())
    }

    /// Unregister `v` and cut every edge touching it.
    ///
    /// Neighbours forget `v` first, then `v` forgets its neighbours, so it can be
    /// registered again later. An error from a neighbour aborts immediately, leaves
    /// the edges cleaned so far removed and rebuilds the relation index.
    pub fn remove_vertex(&mut self, v: &VertexRef) -> DagResult<()> {
        let v = &self.resolve(v)?;
        let id = v.id();

        if let Err(e) = Self::detach(v) {
            self.resync_relations();
            return Err(e);
        }

        self.registry.remove(id.as_str());
        self.relations.drain(id.as_str());
        log::debug!("removed vertex {id}");
        Ok(())
    }

    fn detach(v: &VertexRef) -> DagResult<()> {
        let id = v.id();
        for s in v.sources() {
            s.remove_target(id)?;
            v.remove_source(s.id())?;
        }
        for t in v.targets() {
            t.remove_source(id)?;
            v.remove_target(t.id())?;
        }
        Ok(())
    }

    /// Number of registered vertices.
    pub fn size(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered vertices in insertion order.
    pub fn vertices(&self) -> Vec<VertexRef> {
        self.registry.values()
    }

    /// Registered vertices without sources, in insertion order.
    pub fn roots(&self) -> Vec<VertexRef> {
        self.registry
            .values()
            .into_iter()
            .filter(|v| v.sources_len() == 0)
            .collect()
    }

    /// The mirrored adjacency of `id`.
    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    pub fn relations(&self) -> &RelationIndex {
        &self.relations
    }

    pub(crate) fn registry(&self) -> &OrderedMap<VertexId, VertexRef> {
        &self.registry
    }

    /// Rebuild the relation index from the adjacency of every registered vertex.
    pub fn resync_relations(&mut self) {
        self.relations = RelationIndex::from_vertices(&self.registry.values());
    }

    /// Vertices ordered so each follows all of its sources; see
    /// [`topo_sort::topological_sort`].
    pub fn topological_sort(&mut self) -> DagResult<Vec<VertexRef>> {
        topo_sort::topological_sort(self, SortOptions::default())
    }

    /// [`Dag::topological_sort`] with explicit root and cycle handling.
    pub fn topological_sort_with(&mut self, opts: SortOptions) -> DagResult<Vec<VertexRef>> {
        topo_sort::topological_sort(self, opts)
    }

    /// The frontier batches the sort emits, one `Vec` per level.
    pub fn topological_levels(&mut self, opts: SortOptions) -> DagResult<Vec<Vec<VertexRef>>> {
        topo_sort::topological_levels(self, opts)
    }
}

static_assertions::assert_impl_all!(Dag: Send, Sync);

fn mismatch(id: &VertexId, detail: String) -> DagError {
    DagError::RelationMismatch {
        id: id.clone(),
        detail,
    }
}

fn same_ids(a: &[VertexId], b: Vec<VertexId>) -> bool {
    a.iter().sorted().eq(b.iter().sorted())
}

impl DebugInvariants for Dag {
    /// Check that the relation index holds exactly the registered ids and that
    /// each entry is set-equal to its vertex's adjacency.
    fn validate_invariants(&self) -> Result<(), DagError> {
        let flow = self.registry.walk(|id, v| {
            let Some(rel) = self.relations.get(id.as_str()) else {
                return ControlFlow::Break(DagError::RelationMissing(id.clone()));
            };
            let sources = v.source_ids();
            if !same_ids(&rel.source_ids, sources.clone()) {
                return ControlFlow::Break(mismatch(
                    id,
                    format!("sources {:?} vs relation {:?}", sources, rel.source_ids),
                ));
            }
            let targets = v.target_ids();
            if !same_ids(&rel.target_ids, targets.clone()) {
                return ControlFlow::Break(mismatch(
                    id,
                    format!("targets {:?} vs relation {:?}", targets, rel.target_ids),
                ));
            }
            ControlFlow::Continue(())
        });
        if let ControlFlow::Break(e) = flow {
            return Err(e);
        }

        if let Some((stray, _)) = self
            .relations
            .iter()
            .find(|(id, _)| !self.registry.contains_key(id.as_str()))
        {
            return Err(mismatch(stray, "relation without registered vertex".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::node::Node;

    fn node(id: &str) -> VertexRef {
        Node::new(id, ())
    }

    fn ids(vs: &[VertexRef]) -> Vec<String> {
        vs.iter().map(|v| v.id().to_string()).collect()
    }

    #[test]
    fn add_vertex_rejects_duplicate_id() {
        let mut dag = Dag::new();
        let a = node("a");
        let b = node("b");
        dag.add_vertices([a.clone(), b.clone()]).unwrap();
        dag.add_edge(&a, &b).unwrap();

        let imposter = node("a");
        assert_eq!(
            dag.add_vertex(imposter),
            Err(DagError::VertexExists("a".into()))
        );
        let kept = dag.get_vertex("a").unwrap();
        assert!(std::sync::Arc::ptr_eq(&kept, &a));
        assert_eq!(dag.relation("a").unwrap().target_ids, vec![VertexId::from("b")]);
        assert_eq!(dag.size(), 2);
    }

    #[test]
    fn add_vertices_is_partial_on_duplicate() {
        let mut dag = Dag::new();
        let res = dag.add_vertices([node("1"), node("2"), node("1"), node("3")]);
        assert_eq!(res, Err(DagError::VertexExists("1".into())));
        assert_eq!(dag.size(), 2);
        assert!(!dag.contains("3"));
    }

    #[test]
    fn add_edge_requires_registered_endpoints() {
        let mut dag = Dag::new();
        let a = node("a");
        let stranger = node("z");
        dag.add_vertex(a.clone()).unwrap();
        assert_eq!(
            dag.add_edge(&a, &stranger),
            Err(DagError::VertexNotFound("z".into()))
        );
        assert_eq!(
            dag.add_edge(&stranger, &a),
            Err(DagError::VertexNotFound("z".into()))
        );
        assert_eq!(a.targets_len(), 0);
    }

    #[test]
    fn add_edge_mirrors_into_relations() {
        let mut dag = Dag::new();
        let (a, b) = (node("a"), node("b"));
        dag.add_vertices([a.clone(), b.clone()]).unwrap();
        dag.add_edge(&a, &b).unwrap();

        assert_eq!(ids(&a.targets()), ["b"]);
        assert_eq!(ids(&b.sources()), ["a"]);
        assert_eq!(dag.relation("a").unwrap().target_ids, vec![VertexId::from("b")]);
        assert_eq!(dag.relation("b").unwrap().source_ids, vec![VertexId::from("a")]);
        dag.validate_invariants().unwrap();
    }

    #[test]
    fn rejected_edges_leave_state_untouched() {
        let mut dag = Dag::new();
        let (a, b) = (node("a"), node("b"));
        dag.add_vertices([a.clone(), b.clone()]).unwrap();
        dag.add_edge(&a, &b).unwrap();

        assert!(matches!(
            dag.add_edge(&a, &b),
            Err(DagError::EdgeExists { .. })
        ));
        assert!(matches!(
            dag.add_edge(&b, &a),
            Err(DagError::ReverseEdgeExists { .. })
        ));
        assert_eq!(dag.add_edge(&a, &a), Err(DagError::SelfLoop("a".into())));
        assert_eq!(a.sources_len(), 0);
        assert_eq!(b.targets_len(), 0);
        dag.validate_invariants().unwrap();
    }

    #[test]
    fn remove_edge_round_trip() {
        let mut dag = Dag::new();
        let (a, b) = (node("a"), node("b"));
        dag.add_vertices([a.clone(), b.clone()]).unwrap();
        dag.add_edge(&a, &b).unwrap();
        dag.remove_edge(&a, &b).unwrap();

        assert!(a.targets().is_empty());
        assert!(b.sources().is_empty());
        assert_eq!(dag.relation("a"), Some(&Relation::default()));
        assert_eq!(
            dag.remove_edge(&a, &b),
            Err(DagError::EdgeNotFound {
                from: "a".into(),
                to: "b".into()
            })
        );
        dag.validate_invariants().unwrap();
    }

    #[test]
    fn remove_vertex_cleans_neighbours_and_index() {
        let mut dag = Dag::new();
        let (a, b, c) = (node("a"), node("b"), node("c"));
        dag.add_vertices([a.clone(), b.clone(), c.clone()]).unwrap();
        dag.add_edge(&a, &b).unwrap();
        dag.add_edge(&b, &c).unwrap();
        dag.add_edge(&a, &c).unwrap();

        dag.remove_vertex(&b).unwrap();

        assert!(dag.get_vertex("b").is_none());
        assert!(dag.relation("b").is_none());
        assert_eq!(ids(&a.targets()), ["c"]);
        assert_eq!(ids(&c.sources()), ["a"]);
        for (_, rel) in dag.relations().iter() {
            assert!(!rel.source_ids.contains(&"b".into()));
            assert!(!rel.target_ids.contains(&"b".into()));
        }
        assert_eq!(b.sources_len() + b.targets_len(), 0);
        dag.validate_invariants().unwrap();

        assert_eq!(dag.remove_vertex(&b), Err(DagError::VertexNotFound("b".into())));
        // A detached vertex can come back.
        dag.add_vertex(b.clone()).unwrap();
        dag.validate_invariants().unwrap();
    }

    #[test]
    fn roots_and_vertices_follow_insertion_order() {
        let mut dag = Dag::new();
        let (x, y, z) = (node("x"), node("y"), node("z"));
        dag.add_vertices([z.clone(), x.clone(), y.clone()]).unwrap();
        dag.add_edge(&x, &y).unwrap();
        assert_eq!(ids(&dag.vertices()), ["z", "x", "y"]);
        assert_eq!(ids(&dag.roots()), ["z", "x"]);
    }

    #[test]
    fn with_registry_derives_relations() {
        let (a, b) = (node("a"), node("b"));
        b.add_source(&a).unwrap();
        a.add_target(&b).unwrap();
        let registry = OrderedMap::with_capacity(2);
        registry.put(a.id().clone(), a.clone());
        registry.put(b.id().clone(), b.clone());

        let dag = Dag::with_registry(registry).unwrap();
        assert_eq!(dag.relation("b").unwrap().source_ids, vec![VertexId::from("a")]);
        assert!(dag.is_consistent());
    }

    #[test]
    fn with_registry_rejects_inconsistent_input() {
        let (a, b) = (node("a"), node("b"));
        let misfiled = OrderedMap::new();
        misfiled.put(VertexId::from("x"), a.clone());
        assert!(matches!(
            Dag::with_registry(misfiled),
            Err(DagError::RelationMismatch { .. })
        ));

        b.add_source(&a).unwrap();
        a.add_target(&b).unwrap();
        let dangling = OrderedMap::new();
        dangling.put(b.id().clone(), b.clone());
        assert_eq!(
            Dag::with_registry(dangling).unwrap_err(),
            DagError::VertexNotFound("a".into())
        );
    }

    #[test]
    fn validation_detects_bypassed_mutation() {
        let mut dag = Dag::new();
        let (a, b) = (node("a"), node("b"));
        dag.add_vertices([a.clone(), b.clone()]).unwrap();
        // Mutating a vertex behind the engine's back breaks the mirror.
        b.add_source(&a).unwrap();
        assert!(matches!(
            dag.validate_invariants(),
            Err(DagError::RelationMismatch { .. })
        ));
        a.add_target(&b).unwrap();
        dag.resync_relations();
        dag.validate_invariants().unwrap();
    }

    #[test]
    fn edges_go_through_registered_instances() {
        let mut dag = Dag::new();
        let (a, b) = (node("a"), node("b"));
        dag.add_vertices([a.clone(), b.clone()]).unwrap();

        let look_alike = node("a");
        dag.add_edge(&look_alike, &b).unwrap();
        assert_eq!(ids(&a.targets()), ["b"]);
        assert_eq!(look_alike.targets_len(), 0);
        dag.validate_invariants().unwrap();
    }
}
