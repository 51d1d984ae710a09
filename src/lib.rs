#![cfg_attr(docsrs, feature(doc_cfg))]
//! # vertex-dag
//!
//! vertex-dag is a directed-acyclic-graph engine: a vertex registry with edge
//! management and a level-wise topological sort, for callers that register nodes,
//! declare dependencies between them and later need an execution order (build
//! systems, task schedulers, dependency resolvers).
//!
//! ## Features
//! - [`Vertex`](topology::vertex::Vertex) capability trait: vertices own their adjacency,
//!   the engine only calls through the trait
//! - [`Dag`](topology::dag::Dag) engine with a shadow relation index kept in step with
//!   vertex adjacency across every mutation
//! - Level-wise Kahn sort with configurable root and cycle handling
//! - [`OrderedMap`](data::ordered_map::OrderedMap): insertion-ordered, `RwLock`-guarded
//!   registry with an atomic get-or-insert
//!
//! ## Determinism
//!
//! Roots and frontier members are visited in registry insertion order, so the same
//! sequence of calls always yields the same ordering.
//!
//! ## Usage
//! ```
//! use vertex_dag::prelude::*;
//!
//! let mut dag = Dag::new();
//! let fetch: VertexRef = Node::new("fetch", "download sources");
//! let build: VertexRef = Node::new("build", "compile");
//! let test: VertexRef = Node::new("test", "run tests");
//! dag.add_vertices([fetch.clone(), build.clone(), test.clone()]).unwrap();
//! dag.add_edge(&fetch, &build).unwrap();
//! dag.add_edge(&build, &test).unwrap();
//!
//! let order: Vec<String> = dag
//!     .topological_sort()
//!     .unwrap()
//!     .iter()
//!     .map(|v| v.id().to_string())
//!     .collect();
//! assert_eq!(order, ["fetch", "build", "test"]);
//! ```
//!
//! ## Concurrency
//! Every operation runs synchronously on the caller's thread. The registry is
//! internally synchronized; engine mutators take `&mut self`, so sharing a `Dag`
//! across threads requires an outer lock.

pub mod algs;
pub mod dag_error;
pub mod data;
pub mod debug_invariants;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::topo_sort::{CyclePolicy, RootPolicy, SortOptions};
    pub use crate::dag_error::{DagError, DagResult};
    pub use crate::data::ordered_map::OrderedMap;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::topology::dag::Dag;
    pub use crate::topology::node::Node;
    pub use crate::topology::relation::{Relation, RelationIndex};
    pub use crate::topology::vertex::{Vertex, VertexId, VertexRef};
}
