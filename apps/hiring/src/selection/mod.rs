//! Selection state: keyed multi-select shared by every wizard step
//! (questions, candidates, jobs).
//!
//! Selection rules:
//! - `select` only accepts keys present in the current universe
//! - keys already selected survive a universe change (search filter or re-fetch)
//! - `select_all` replaces the selection with the caller's *visible* rows
//! - operations on unknown keys are silent no-ops

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState<K: Eq + Hash> {
    /// Selected keys in first-selection order (dispatch order follows this).
    order: Vec<K>,
    members: HashSet<K>,
    universe: Vec<K>,
}

impl<K: Eq + Hash> Default for SelectionState<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
            universe: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> SelectionState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_universe(universe: impl IntoIterator<Item = K>) -> Self {
        let mut state = Self::default();
        state.set_universe(universe);
        state
    }

    pub fn universe(&self) -> &[K] {
        &self.universe
    }

    /// Replaces the visible pool. Current selections are kept even when the
    /// new pool no longer contains them.
    pub fn set_universe(&mut self, universe: impl IntoIterator<Item = K>) {
        let mut seen = HashSet::new();
        self.universe = universe
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
    }

    /// Returns the subset of the universe matching `keep`, in universe order.
    /// This is the "visible" list a search box produces.
    pub fn filter_universe(&self, keep: impl Fn(&K) -> bool) -> Vec<K> {
        self.universe.iter().filter(|k| keep(k)).cloned().collect()
    }

    /// Returns true when the selection changed.
    pub fn select(&mut self, key: K) -> bool {
        if self.members.contains(&key) || !self.universe.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push(key);
        true
    }

    /// Returns true when the selection changed.
    pub fn deselect(&mut self, key: &K) -> bool {
        if !self.members.remove(key) {
            return false;
        }
        self.order.retain(|k| k != key);
        true
    }

    /// Flips the key; returns the new selected flag.
    pub fn toggle(&mut self, key: K) -> bool {
        if self.members.contains(&key) {
            self.deselect(&key);
            false
        } else {
            self.select(key)
        }
    }

    /// Sets the selection to exactly `visible`, the currently filtered rows
    /// passed by the caller (not the cached full universe).
    pub fn select_all(&mut self, visible: &[K]) {
        self.clear();
        for key in visible {
            if self.members.insert(key.clone()) {
                self.order.push(key.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.order.clone()
    }

    /// Header checkbox state: every visible row is selected.
    pub fn is_all_selected(&self, visible: &[K]) -> bool {
        !visible.is_empty() && visible.iter().all(|k| self.members.contains(k))
    }

    /// Header checkbox "indeterminate" state.
    pub fn is_partially_selected(&self, visible: &[K]) -> bool {
        !self.is_empty() && !self.is_all_selected(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(state: &SelectionState<u32>) -> Vec<u32> {
        let mut keys = state.to_vec();
        keys.sort();
        keys
    }

    #[test]
    fn test_select_and_deselect() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        assert!(state.select(2));
        assert!(state.is_selected(&2));
        assert_eq!(state.count(), 1);
        assert!(state.deselect(&2));
        assert!(!state.is_selected(&2));
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_unknown_keys_are_noops() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        assert!(!state.select(9));
        assert!(!state.deselect(&9));
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut state = SelectionState::with_universe([1, 2]);
        assert!(state.select(1));
        assert!(!state.select(1));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut state = SelectionState::with_universe(["a", "b"]);
        assert!(state.toggle("a"));
        assert!(state.is_selected(&"a"));
        assert!(!state.toggle("a"));
        assert!(!state.is_selected(&"a"));
    }

    #[test]
    fn test_selection_order_follows_first_selection() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        state.select(3);
        state.select(1);
        state.select(2);
        assert_eq!(state.to_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn test_select_all_uses_filtered_universe() {
        let mut state = SelectionState::with_universe([1, 2, 3, 4, 5]);
        let visible = state.filter_universe(|k| k % 2 == 0);
        assert_eq!(visible, vec![2, 4]);

        state.select_all(&visible);

        // Search cleared: the full universe is visible again.
        let visible = state.filter_universe(|_| true);
        assert_eq!(visible.len(), 5);
        assert_eq!(selected(&state), vec![2, 4]);
    }

    #[test]
    fn test_selection_survives_universe_refresh() {
        let mut state = SelectionState::with_universe([1, 2, 3, 4, 5]);
        state.set_universe([2, 4]);
        state.select_all(&[2, 4]);
        state.set_universe([1, 2, 3, 4, 5]);
        assert_eq!(selected(&state), vec![2, 4]);

        // A refresh that hides a selected key keeps it selected.
        state.set_universe([1, 3]);
        assert!(state.is_selected(&2));
        assert_eq!(state.count(), 2);
    }

    #[test]
    fn test_select_all_replaces_previous_selection() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        state.select(1);
        state.select_all(&[2, 3]);
        assert_eq!(selected(&state), vec![2, 3]);
    }

    #[test]
    fn test_clear_empties_selection_but_keeps_universe() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        state.select_all(&[1, 2, 3]);
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.universe(), &[1, 2, 3]);
    }

    #[test]
    fn test_header_checkbox_states() {
        let mut state = SelectionState::with_universe([1, 2, 3]);
        let visible = state.filter_universe(|_| true);
        assert!(!state.is_all_selected(&visible));
        assert!(!state.is_partially_selected(&visible));

        state.select(1);
        assert!(state.is_partially_selected(&visible));

        state.select_all(&visible);
        assert!(state.is_all_selected(&visible));
        assert!(!state.is_partially_selected(&visible));

        assert!(!state.is_all_selected(&[]));
    }

    #[test]
    fn test_set_universe_dedupes() {
        let state = SelectionState::with_universe([1, 1, 2]);
        assert_eq!(state.universe(), &[1, 2]);
    }
}
