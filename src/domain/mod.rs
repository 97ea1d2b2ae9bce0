//! Domain models
//!
//! Pure types and logic with no I/O: the certificate record and the
//! filter engine that derives the explorer's visible list from it.

mod certificate;
pub mod filter;

pub use certificate::{same_address, Certificate};
pub use filter::{
    ActiveFilterSummary, FilterChip, FilterEngine, FilterKind, FilterOutput, FilterState,
    OptionSets, Selection, Stats, ViewMode,
};
