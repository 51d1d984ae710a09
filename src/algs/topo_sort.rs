//! Level-wise topological sort over the shadow relation index.
//!
//! The sort consumes [`Dag`]'s relation index instead of calling into vertex
//! objects:
//!
//! 1. Root discovery walks the registry in insertion order and collects vertices
//!    without sources ([`RootPolicy`] decides how many are acceptable).
//! 2. Each root's relation is drained: removed, and its id scrubbed from every
//!    remaining relation.
//! 3. Every remaining id whose source list is now empty forms the next frontier;
//!    the whole frontier is drained and emitted as one level. The loop stops on an
//!    empty frontier.
//! 4. Whatever happened, the index is rebuilt from live vertex adjacency before
//!    returning, so the engine is usable afterwards.
//!
//! Vertices still undrained at step 3 sit on or behind a cycle; [`CyclePolicy`]
//! decides whether that is an error.
//!
//! ## Complexity
//! - Time: **O(L · V + V · E)** for `L` levels (each frontier scan is linear, each
//!   drain scrubs every remaining relation).
//! - Space: **O(V + E)** for the drained copy of the index.

use crate::dag_error::{DagError, DagResult};
use crate::debug_invariants::DebugInvariants;
use crate::topology::dag::Dag;
use crate::topology::relation::Relation;
use crate::topology::vertex::{VertexId, VertexRef};
use itertools::Itertools;
use std::ops::ControlFlow;

/// How many source-free vertices the sort accepts as its first level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootPolicy {
    /// Exactly one; a second fails with [`DagError::MultipleRoots`].
    #[default]
    Single,
    /// Any positive number; all of them form the first level.
    Any,
}

/// Behaviour when vertices remain after the last frontier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Fail with [`DagError::CycleDetected`] naming the remaining vertices.
    #[default]
    Error,
    /// Log a warning and return the ordered prefix.
    Warn,
    /// Return the ordered prefix silently.
    Ignore,
}

/// Sort configuration. `Default` is [`SortOptions::strict`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub root_policy: RootPolicy,
    pub cycle_policy: CyclePolicy,
}

impl SortOptions {
    /// One root, cycles are errors.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Any number of roots, cycles truncate the output with a warning.
    pub fn lenient() -> Self {
        Self {
            root_policy: RootPolicy::Any,
            cycle_policy: CyclePolicy::Warn,
        }
    }
}

/// Order every registered vertex after all of its sources.
///
/// Vertices within one level keep registry insertion order. An empty graph sorts
/// to an empty sequence.
///
/// # Errors
/// * [`DagError::MultipleRoots`]: a second source-free vertex under [`RootPolicy::Single`].
/// * [`DagError::RootNotFound`]: no source-free vertex in a non-empty graph.
/// * [`DagError::CycleDetected`]: vertices left over under [`CyclePolicy::Error`].
///
/// In every case the relation index is resynchronized before returning.
pub fn topological_sort(dag: &mut Dag, opts: SortOptions) -> DagResult<Vec<VertexRef>> {
    Ok(topological_levels(dag, opts)?.into_iter().flatten().collect())
}

/// Like [`topological_sort`] but keeps the frontier batches apart: `levels[0]` holds
/// the roots and every vertex in `levels[k]` has all its sources in earlier levels.
pub fn topological_levels(dag: &mut Dag, opts: SortOptions) -> DagResult<Vec<Vec<VertexRef>>> {
    let result = drain_levels(dag, opts);
    dag.resync_relations();
    dag.debug_assert_invariants();
    result
}

fn discover_roots(dag: &Dag, policy: RootPolicy) -> DagResult<Vec<VertexRef>> {
    let mut roots: Vec<VertexRef> = Vec::new();
    let flow = dag.registry().walk(|_, v| {
        if v.sources_len() != 0 {
            return ControlFlow::Continue(());
        }
        if let (RootPolicy::Single, Some(first)) = (policy, roots.first()) {
            return ControlFlow::Break(DagError::MultipleRoots {
                first: first.id().clone(),
                second: v.id().clone(),
            });
        }
        roots.push(v.clone());
        ControlFlow::Continue(())
    });
    if let ControlFlow::Break(e) = flow {
        return Err(e);
    }
    if roots.is_empty() {
        return Err(DagError::RootNotFound);
    }
    Ok(roots)
}

fn drain_levels(dag: &mut Dag, opts: SortOptions) -> DagResult<Vec<Vec<VertexRef>>> {
    if dag.is_empty() {
        return Ok(Vec::new());
    }
    let roots = discover_roots(dag, opts.root_policy)?;

    let order: Vec<VertexId> = dag.registry().keys();
    let mut index = std::mem::take(&mut dag.relations);
    for root in &roots {
        index.drain(root.id().as_str());
    }
    let mut levels = vec![roots];

    loop {
        let frontier: Vec<&VertexId> = order
            .iter()
            .filter(|id| index.get(id.as_str()).is_some_and(Relation::is_source_free))
            .collect();
        if frontier.is_empty() {
            break;
        }
        log::trace!("frontier {}: [{}]", levels.len(), frontier.iter().join(", "));

        let mut level = Vec::with_capacity(frontier.len());
        for id in frontier {
            index.drain(id.as_str());
            if let Some(v) = dag.get_vertex(id.as_str()) {
                level.push(v);
            }
        }
        levels.push(level);
    }

    if !index.is_empty() {
        let remaining: Vec<VertexId> = order
            .into_iter()
            .filter(|id| index.contains(id.as_str()))
            .collect();
        match opts.cycle_policy {
            CyclePolicy::Error => return Err(DagError::CycleDetected { remaining }),
            CyclePolicy::Warn => log::warn!(
                "topological sort left {} vertices unordered (cycle): {}",
                remaining.len(),
                remaining.iter().join(", ")
            ),
            CyclePolicy::Ignore => {}
        }
    }
    Ok(levels)
}
