//! Filter state: view mode, search text, and the three selectors

use crate::domain::Certificate;

/// Which slice of the collection is being browsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    Mine,
}

impl ViewMode {
    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::All => "All Certificates",
            ViewMode::Mine => "My Certificates",
        }
    }
}

/// A selector value: either unconstrained or one concrete choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Any,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Any
    }
}

impl<T> Selection<T> {
    pub fn only(value: impl Into<T>) -> Self {
        Selection::Only(value.into())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Selection::Any)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Selection::Any => None,
            Selection::Only(value) => Some(value),
        }
    }
}

impl Selection<String> {
    /// Interpret selector text; "all" (any case) or blank means no constraint
    pub fn from_choice(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::Any
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

/// The removable selector filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Program,
    Grade,
    Year,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [FilterKind::Program, FilterKind::Grade, FilterKind::Year];

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Program => "Program",
            FilterKind::Grade => "Grade",
            FilterKind::Year => "Year",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "program" | "prog" | "category" => Some(FilterKind::Program),
            "grade" | "tier" => Some(FilterKind::Grade),
            "year" | "period" => Some(FilterKind::Year),
            _ => None,
        }
    }
}

/// Mutable filter state owned by the engine
///
/// The year selector keeps the text it was set with; it is compared as an
/// integer at match time and text that is not an integer matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub view_mode: ViewMode,
    pub search: String,
    pub program: Selection<String>,
    pub grade: Selection<String>,
    pub year: Selection<String>,
}

impl FilterState {
    /// Search text non-empty or any selector set. View mode does not count.
    pub fn any_active(&self) -> bool {
        !self.search.is_empty()
            || !self.program.is_any()
            || !self.grade.is_any()
            || !self.year.is_any()
    }

    pub fn selection(&self, kind: FilterKind) -> &Selection<String> {
        match kind {
            FilterKind::Program => &self.program,
            FilterKind::Grade => &self.grade,
            FilterKind::Year => &self.year,
        }
    }

    pub fn selection_mut(&mut self, kind: FilterKind) -> &mut Selection<String> {
        match kind {
            FilterKind::Program => &mut self.program,
            FilterKind::Grade => &mut self.grade,
            FilterKind::Year => &mut self.year,
        }
    }

    /// Clear search and all selectors, keeping the view mode
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.program = Selection::Any;
        self.grade = Selection::Any;
        self.year = Selection::Any;
    }

    /// Compile the state into a predicate over certificates
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            state: self,
            needle: (!self.search.is_empty()).then(|| self.search.to_lowercase()),
            year: self.year.value().map(|raw| raw.parse::<u64>().ok()),
        }
    }
}

/// Per-recompute predicate with the search needle and year pre-parsed
pub struct Matcher<'a> {
    state: &'a FilterState,
    needle: Option<String>,
    // Some(None): a year was selected but does not parse
    year: Option<Option<u64>>,
}

impl Matcher<'_> {
    pub fn matches(&self, cert: &Certificate) -> bool {
        if self.state.view_mode == ViewMode::Mine && !cert.is_owner {
            return false;
        }
        if let Some(needle) = &self.needle {
            if !cert.name.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Selection::Only(program) = &self.state.program {
            if &cert.program != program {
                return false;
            }
        }
        if let Selection::Only(grade) = &self.state.grade {
            if &cert.grade != grade {
                return false;
            }
        }
        match self.year {
            None => true,
            Some(Some(year)) => cert.year == year,
            Some(None) => false,
        }
    }
}
