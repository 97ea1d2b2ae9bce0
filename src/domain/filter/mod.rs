//! Client-side filtering of the loaded certificate set

mod engine;
mod state;

pub use engine::{ActiveFilterSummary, FilterChip, FilterEngine, FilterOutput, OptionSets, Stats};
pub use state::{FilterKind, FilterState, Matcher, Selection, ViewMode};
