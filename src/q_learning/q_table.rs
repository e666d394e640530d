//! Sparse Q-value and visit-count tables

use std::{collections::HashMap, hash::Hash};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{abstraction::AbstractState, board::Move};

type Key = (AbstractState, Move);

/// Q-table mapping (state, action) pairs to Q-values
///
/// Unseen pairs read as 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values: (abstract_state, move) -> Q-value
    #[serde(with = "entries")]
    q_values: HashMap<Key, f64>,
}

impl QTable {
    /// Create a new, empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &AbstractState, action: Move) -> f64 {
        self.q_values
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: AbstractState, action: Move, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over `legal_actions`, or 0 when there are none.
    pub fn max_q(&self, state: &AbstractState, legal_actions: &[Move]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the new Q(s,a).
    pub fn q_learning_update(
        &mut self,
        state: AbstractState,
        action: Move,
        reward: f64,
        next_state: &AbstractState,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let current_q = self.get(&state, action);
        let max_next_q = self.max_q(next_state, &next_state.valid_moves());
        let td_target = reward + discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + learning_rate * td_error;
        self.set(state, action, new_q);
        new_q
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    /// Number of stored values that are NaN or infinite.
    pub fn non_finite_count(&self) -> usize {
        self.q_values.values().filter(|q| !q.is_finite()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AbstractState, Move, f64)> {
        self.q_values
            .iter()
            .map(|((state, action), q)| (state, *action, *q))
    }
}

/// Visit counts N(s,a) used by optimistic exploration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitTable {
    #[serde(with = "entries")]
    counts: HashMap<Key, u32>,
}

impl VisitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &AbstractState, action: Move) -> u32 {
        self.counts
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0)
    }

    /// Increment N(s,a) and return the new count.
    pub fn increment(&mut self, state: AbstractState, action: Move) -> u32 {
        let count = self.counts.entry((state, action)).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn size(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all visits.
    pub fn total_visits(&self) -> u64 {
        self.counts.values().map(|&n| u64::from(n)).sum()
    }
}

/// Tables are stored as entry lists so structured keys survive any serde format.
mod entries {
    use super::*;

    pub fn serialize<S, K, V>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        K: Serialize,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        D: Deserializer<'de>,
        K: Deserialize<'de> + Eq + Hash,
        V: Deserialize<'de>,
    {
        let entries = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn state(position: Cell, neighbors: [Option<u8>; 4]) -> AbstractState {
        AbstractState::Local {
            position: Some(position),
            neighbors,
        }
    }

    fn top() -> AbstractState {
        state(Cell::TOP, [None, None, Some(0), Some(0)])
    }

    fn next() -> AbstractState {
        state(Cell::new(1, 0).unwrap(), [None, Some(1), Some(0), Some(0)])
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new();
        assert_eq!(qtable.get(&top(), Move::Down), 0.0);
        assert_eq!(qtable.size(), 0);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new();
        qtable.set(top(), Move::Right, 1.5);
        assert_eq!(qtable.get(&top(), Move::Right), 1.5);
        assert_eq!(qtable.get(&top(), Move::Down), 0.0);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new();
        qtable.set(next(), Move::Up, -0.5);
        qtable.set(next(), Move::Right, 1.5);
        qtable.set(next(), Move::Down, 0.8);

        let legal = next().valid_moves();
        assert_eq!(qtable.max_q(&next(), &legal), 1.5);
    }

    #[test]
    fn test_max_q_of_no_actions_is_zero() {
        let qtable = QTable::new();
        assert_eq!(qtable.max_q(&top(), &[]), 0.0);
    }

    #[test]
    fn test_max_q_keeps_negative_values() {
        let mut qtable = QTable::new();
        qtable.set(top(), Move::Right, -2.0);
        qtable.set(top(), Move::Down, -3.0);
        assert_eq!(qtable.max_q(&top(), &[Move::Right, Move::Down]), -2.0);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new();
        qtable.set(next(), Move::Up, 1.0);
        qtable.set(next(), Move::Down, 2.0);

        let new_q = qtable.q_learning_update(top(), Move::Down, 0.0, &next(), 0.5, 0.99);

        // Q(s,down) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        assert!((new_q - 0.99).abs() < 1e-9);
        assert_eq!(qtable.get(&top(), Move::Down), new_q);
    }

    #[test]
    fn test_visit_counts() {
        let mut visits = VisitTable::new();
        assert_eq!(visits.get(&top(), Move::Down), 0);
        assert_eq!(visits.increment(top(), Move::Down), 1);
        assert_eq!(visits.increment(top(), Move::Down), 2);
        assert_eq!(visits.total_visits(), 2);
        assert_eq!(visits.size(), 1);
    }
}
