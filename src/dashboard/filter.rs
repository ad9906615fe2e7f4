//! Active year and content-type filters
//!
//! `FilterState` is a plain value. Transitions are expressed as
//! [`FilterAction`]s and applied by [`FilterState::reduce`]; the mutating
//! helpers go through the same reducer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Coarse content category used by the type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    /// Everything that is not manga
    Books,
    Manga,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [Self::Books, Self::Manga];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Manga => "Manga",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "books" => Ok(Self::Books),
            "manga" => Ok(Self::Manga),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

/// A single filter transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Add the year if inactive, remove it if active
    ToggleYear(i32),
    /// Make the year the only active one
    SelectOnlyYear(i32),
    /// Add the type if inactive, remove it if active
    ToggleType(ContentType),
}

/// Currently active reading years and content types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    known_years: Vec<i32>,
    active_years: BTreeSet<i32>,
    active_types: BTreeSet<ContentType>,
}

impl FilterState {
    /// All `known_years` and both content types active
    pub fn new(known_years: impl IntoIterator<Item = i32>) -> Self {
        let known: BTreeSet<i32> = known_years.into_iter().collect();
        Self {
            known_years: known.iter().copied().collect(),
            active_years: known,
            active_types: ContentType::ALL.into_iter().collect(),
        }
    }

    /// Explicit selection; active years need not be among the known years
    pub fn with_selection(
        known_years: impl IntoIterator<Item = i32>,
        active_years: impl IntoIterator<Item = i32>,
        active_types: impl IntoIterator<Item = ContentType>,
    ) -> Self {
        let known: BTreeSet<i32> = known_years.into_iter().collect();
        Self {
            known_years: known.into_iter().collect(),
            active_years: active_years.into_iter().collect(),
            active_types: active_types.into_iter().collect(),
        }
    }

    /// Year buttons offered to the user, ascending
    pub fn known_years(&self) -> &[i32] {
        &self.known_years
    }

    pub fn active_years(&self) -> &BTreeSet<i32> {
        &self.active_years
    }

    pub fn active_types(&self) -> &BTreeSet<ContentType> {
        &self.active_types
    }

    pub fn is_year_active(&self, year: i32) -> bool {
        self.active_years.contains(&year)
    }

    pub fn is_type_active(&self, content: ContentType) -> bool {
        self.active_types.contains(&content)
    }

    /// True when exactly one year is active
    pub fn is_single_year(&self) -> bool {
        self.active_years.len() == 1
    }

    /// Apply an action, returning the new state and leaving `self` untouched
    pub fn reduce(&self, action: FilterAction) -> Self {
        let mut next = self.clone();
        match action {
            FilterAction::ToggleYear(year) => {
                if !next.active_years.remove(&year) {
                    next.active_years.insert(year);
                }
            }
            FilterAction::SelectOnlyYear(year) => {
                next.active_years = BTreeSet::from([year]);
            }
            FilterAction::ToggleType(content) => {
                if !next.active_types.remove(&content) {
                    next.active_types.insert(content);
                }
            }
        }
        next
    }

    /// Apply an action in place
    pub fn apply(&mut self, action: FilterAction) {
        *self = self.reduce(action);
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.apply(FilterAction::ToggleYear(year));
    }

    pub fn select_only_year(&mut self, year: i32) {
        self.apply(FilterAction::SelectOnlyYear(year));
    }

    pub fn toggle_type(&mut self, content: ContentType) {
        self.apply(FilterAction::ToggleType(content));
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FIRST_YEAR..=crate::config::DEFAULT_LAST_YEAR)
    }
}
