//! Data module: containers backing the vertex registry
#![warn(missing_docs)]

pub mod ordered_map;

pub use ordered_map::OrderedMap;
