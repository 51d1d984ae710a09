//! Invariant checks for structures that keep redundant bookkeeping.
//!
//! [`Dag`](crate::topology::dag::Dag) keeps the shadow relation index next to the
//! adjacency stored in each vertex; implementors of [`DebugInvariants`] report when
//! two such views of the same topology drift apart.

use crate::dag_error::DagError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), DagError>;

    /// Panic on the first violated invariant in debug builds; no-op in release
    /// unless the `strict-invariants` feature is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DebugInvariants");
    }

    /// `true` when every invariant holds.
    fn is_consistent(&self) -> bool {
        self.validate_invariants().is_ok()
    }
}

/// Run a fallible check and panic with context when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
