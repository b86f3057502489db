use crate::game::{Action, EncodedState, NUM_ACTIONS};
use std::collections::HashMap;

/// Per-action value estimates for one state, in [`Action::ALL`] order
pub type ActionValues = [f64; NUM_ACTIONS];

/// Value table keyed by encoded state
///
/// Rows are created lazily: reading or writing an unseen state through
/// [`values_mut`](Self::values_mut) inserts an all-zero row first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    entries: HashMap<EncodedState, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `state`, inserting zeros on first access
    pub fn values_mut(&mut self, state: &EncodedState) -> &mut ActionValues {
        self.entries.entry(*state).or_insert([0.0; NUM_ACTIONS])
    }

    /// Row for `state` without materializing it
    pub fn get(&self, state: &EncodedState) -> Option<&ActionValues> {
        self.entries.get(state)
    }

    /// Largest value in the row for `state` (materializes the row)
    pub fn max_value(&mut self, state: &EncodedState) -> f64 {
        self.values_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action for `state`; ties go to the lowest action index
    pub fn best_action(&mut self, state: &EncodedState) -> Action {
        let row = self.values_mut(state);
        let mut best = 0;
        for (idx, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = idx;
            }
        }
        Action::ALL[best]
    }

    /// Overwrite the row for `state`
    pub fn insert(&mut self, state: EncodedState, values: ActionValues) {
        self.entries.insert(state, values);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EncodedState, &ActionValues)> {
        self.entries.iter()
    }
}
