//! Dependency-tree reduction and per-sentence aggregation.

/// Query types and the sentence aggregator.
pub mod aggregate;
/// Label → disposition table.
pub mod disposition;
/// Recursive tree reducer.
pub mod reducer;

pub use aggregate::{ParsedQuestion, Query, SentenceAggregator, Term};
pub use disposition::{Disposition, DispositionTable, Placement};
pub use reducer::{DependencyTreeReducer, DIRECT_OBJECT};
