//! Selection and filter state for admin list screens.
//!
//! Filters here never touch data. Changing one only tells the caller to
//! re-fetch from the server.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of selected row IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState<Id: Ord + Clone> {
    selected: BTreeSet<Id>,
}

impl<Id: Ord + Clone> SelectionState<Id> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }

    /// Select `id` if unselected, otherwise unselect it. Returns the new membership.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Select every ID in `ids`.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.selected.extend(ids);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected IDs in sorted order.
    #[must_use]
    pub fn selected(&self) -> Vec<Id> {
        self.selected.iter().cloned().collect()
    }
}

/// Result of a filter setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// The value changed; the list must be re-fetched.
    Refetch,
    Unchanged,
}

impl FilterChange {
    #[must_use]
    pub const fn needs_refetch(self) -> bool {
        matches!(self, Self::Refetch)
    }
}

/// Filter fields of an admin list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

fn replace(slot: &mut Option<String>, value: Option<String>) -> FilterChange {
    let value = value.filter(|v| !v.trim().is_empty());
    if *slot == value {
        FilterChange::Unchanged
    } else {
        *slot = value;
        FilterChange::Refetch
    }
}

impl ListFilters {
    pub fn set_search(&mut self, value: Option<String>) -> FilterChange {
        replace(&mut self.search, value)
    }

    pub fn set_category(&mut self, value: Option<String>) -> FilterChange {
        replace(&mut self.category, value)
    }

    pub fn set_status(&mut self, value: Option<String>) -> FilterChange {
        replace(&mut self.status, value)
    }

    /// Reset every field.
    pub fn reset(&mut self) -> FilterChange {
        if *self == Self::default() {
            FilterChange::Unchanged
        } else {
            *self = Self::default();
            FilterChange::Refetch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut state = SelectionState::new();
        assert!(state.toggle("p1"));
        assert!(state.is_selected(&"p1"));
        assert!(!state.toggle("p1"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut state = SelectionState::new();
        state.toggle("b".to_string());
        state.select_all(["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(state.count(), 3);
        assert_eq!(state.selected(), vec!["a", "b", "c"]);

        state.clear();
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_filter_changes_request_refetch() {
        let mut filters = ListFilters::default();
        assert_eq!(
            filters.set_category(Some("cafe".to_string())),
            FilterChange::Refetch
        );
        assert_eq!(
            filters.set_category(Some("cafe".to_string())),
            FilterChange::Unchanged
        );
        // Blank input clears the filter.
        assert!(filters.set_category(Some("  ".to_string())).needs_refetch());
        assert_eq!(filters.category, None);

        filters.set_status(Some("pending".to_string()));
        assert!(filters.reset().needs_refetch());
        assert!(!filters.reset().needs_refetch());
    }
}
