//! Filter engine - owns the loaded certificates and derives everything the
//! explorer shows from them.
//!
//! Option sets and stats are computed over the whole collection at load
//! time and never narrow with the active filters. The visible list and the
//! active-filter summary are recomputed after every mutation.

use std::collections::BTreeSet;

use crate::domain::filter::state::{FilterKind, FilterState, Selection, ViewMode};
use crate::domain::Certificate;

/// Selector universes, derived from the full collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSets {
    /// Ascending
    pub programs: Vec<String>,
    /// Ascending
    pub grades: Vec<String>,
    /// Descending
    pub years: Vec<u64>,
}

impl OptionSets {
    fn derive(certificates: &[Certificate]) -> Self {
        let programs: BTreeSet<&str> = certificates.iter().map(|c| c.program.as_str()).collect();
        let grades: BTreeSet<&str> = certificates.iter().map(|c| c.grade.as_str()).collect();
        let years: BTreeSet<u64> = certificates.iter().map(|c| c.year).collect();

        Self {
            programs: programs.into_iter().map(str::to_string).collect(),
            grades: grades.into_iter().map(str::to_string).collect(),
            years: years.into_iter().rev().collect(),
        }
    }

    /// Selector choices for a filter kind, as the text a selector would carry
    pub fn choices(&self, kind: FilterKind) -> Vec<String> {
        match kind {
            FilterKind::Program => self.programs.clone(),
            FilterKind::Grade => self.grades.clone(),
            FilterKind::Year => self.years.iter().map(u64::to_string).collect(),
        }
    }
}

/// Collection-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub programs: usize,
    pub owned: usize,
}

impl Stats {
    fn derive(certificates: &[Certificate]) -> Self {
        let programs: BTreeSet<&str> = certificates.iter().map(|c| c.program.as_str()).collect();
        Self {
            total: certificates.len(),
            programs: programs.len(),
            owned: certificates.iter().filter(|c| c.is_owner).count(),
        }
    }
}

/// A removable chip for one active selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub kind: FilterKind,
    pub value: String,
}

impl FilterChip {
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind.label(), self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilterSummary {
    /// Program, grade, year order
    pub chips: Vec<FilterChip>,
    pub any_active: bool,
}

impl ActiveFilterSummary {
    fn derive(state: &FilterState) -> Self {
        let chips = FilterKind::ALL
            .iter()
            .filter_map(|kind| {
                state.selection(*kind).value().map(|value| FilterChip {
                    kind: *kind,
                    value: value.clone(),
                })
            })
            .collect();
        Self {
            chips,
            any_active: state.any_active(),
        }
    }
}

/// Result bundle handed to the renderer after a recompute
#[derive(Debug, Clone)]
pub struct FilterOutput<'a> {
    pub visible: Vec<&'a Certificate>,
    pub options: &'a OptionSets,
    pub stats: Stats,
    pub summary: &'a ActiveFilterSummary,
}

impl FilterOutput<'_> {
    pub fn visible_ids(&self) -> Vec<u64> {
        self.visible.iter().map(|c| c.token_id).collect()
    }
}

#[derive(Debug, Default)]
pub struct FilterEngine {
    certificates: Vec<Certificate>,
    state: FilterState,
    options: OptionSets,
    stats: Stats,
    /// Indices into `certificates`, ascending
    visible: Vec<usize>,
    summary: ActiveFilterSummary,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection wholesale and reset every filter, view mode included
    pub fn load(&mut self, certificates: Vec<Certificate>) -> FilterOutput<'_> {
        self.options = OptionSets::derive(&certificates);
        self.stats = Stats::derive(&certificates);
        self.certificates = certificates;
        self.state = FilterState::default();
        tracing::debug!(
            total = self.stats.total,
            programs = self.options.programs.len(),
            grades = self.options.grades.len(),
            years = self.options.years.len(),
            "certificates loaded"
        );
        self.recompute()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> FilterOutput<'_> {
        self.state.view_mode = mode;
        self.recompute()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> FilterOutput<'_> {
        self.state.search = text.into();
        self.recompute()
    }

    pub fn set_program_filter(&mut self, value: Selection<String>) -> FilterOutput<'_> {
        self.set_filter(FilterKind::Program, value)
    }

    pub fn set_grade_filter(&mut self, value: Selection<String>) -> FilterOutput<'_> {
        self.set_filter(FilterKind::Grade, value)
    }

    /// Values outside the year universe, or not integers at all, are kept
    /// and simply match nothing.
    pub fn set_year_filter(&mut self, value: Selection<String>) -> FilterOutput<'_> {
        self.set_filter(FilterKind::Year, value)
    }

    pub fn set_filter(&mut self, kind: FilterKind, value: Selection<String>) -> FilterOutput<'_> {
        *self.state.selection_mut(kind) = value;
        self.recompute()
    }

    /// Clear search and selectors; view mode is a separate axis and stays
    pub fn reset_filters(&mut self) -> FilterOutput<'_> {
        self.state.clear_filters();
        self.recompute()
    }

    pub fn remove_filter(&mut self, kind: FilterKind) -> FilterOutput<'_> {
        *self.state.selection_mut(kind) = Selection::Any;
        self.recompute()
    }

    /// Current result bundle without mutating anything
    pub fn output(&self) -> FilterOutput<'_> {
        FilterOutput {
            visible: self.visible.iter().map(|&idx| &self.certificates[idx]).collect(),
            options: &self.options,
            stats: self.stats,
            summary: &self.summary,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn options(&self) -> &OptionSets {
        &self.options
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn summary(&self) -> &ActiveFilterSummary {
        &self.summary
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Certificate at a position in the visible list
    pub fn visible_at(&self, position: usize) -> Option<&Certificate> {
        self.visible
            .get(position)
            .and_then(|&idx| self.certificates.get(idx))
    }

    pub fn visible(&self) -> impl Iterator<Item = &Certificate> + '_ {
        self.visible.iter().filter_map(|&idx| self.certificates.get(idx))
    }

    pub fn find(&self, token_id: u64) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.token_id == token_id)
    }

    /// Position of a token in the visible list, if it is visible
    pub fn visible_position(&self, token_id: u64) -> Option<usize> {
        self.visible
            .iter()
            .position(|&idx| self.certificates[idx].token_id == token_id)
    }

    fn recompute(&mut self) -> FilterOutput<'_> {
        let matcher = self.state.matcher();
        self.visible = self
            .certificates
            .iter()
            .enumerate()
            .filter(|(_, cert)| matcher.matches(cert))
            .map(|(idx, _)| idx)
            .collect();
        self.summary = ActiveFilterSummary::derive(&self.state);
        tracing::trace!(
            visible = self.visible.len(),
            any_active = self.summary.any_active,
            "filters applied"
        );
        self.output()
    }
}
