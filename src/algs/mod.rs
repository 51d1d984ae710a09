//! Graph algorithms over [`Dag`](crate::topology::dag::Dag).

pub mod topo_sort;

pub use topo_sort::{topological_levels, topological_sort, CyclePolicy, RootPolicy, SortOptions};
