use super::persistence::{load_q_table, save_q_table, PersistenceError};
use super::q_table::{ActionValues, QTable};
use super::QLearningConfig;
use crate::game::{Action, ConfigError, EncodedState, NUM_ACTIONS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// Tabular Q-learning agent with an epsilon-greedy policy
///
/// Owns the value table, the exploration schedule and its own random source.
/// Exploration draws from the same three relative actions the game accepts.
pub struct QLearningAgent<R: Rng = ChaCha8Rng> {
    config: QLearningConfig,
    table: QTable,
    epsilon: f64,
    rng: R,
}

impl QLearningAgent<ChaCha8Rng> {
    /// Create an agent with a seeded ChaCha generator
    pub fn with_seed(config: QLearningConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> QLearningAgent<R> {
    /// Create an agent with an empty table; fails on invalid hyperparameters
    pub fn new(config: QLearningConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            epsilon: config.epsilon_start,
            config,
            table: QTable::new(),
            rng,
        })
    }

    /// Epsilon-greedy action selection
    ///
    /// With probability epsilon a uniformly random action is returned;
    /// otherwise the greedy action, which materializes the row for `state`.
    pub fn select_action(&mut self, state: &EncodedState) -> Action {
        if self.rng.gen::<f64>() < self.epsilon {
            Action::ALL[self.rng.gen_range(0..NUM_ACTIONS)]
        } else {
            self.table.best_action(state)
        }
    }

    /// Greedy action, ignoring exploration
    pub fn greedy_action(&mut self, state: &EncodedState) -> Action {
        self.table.best_action(state)
    }

    /// One-step Q-learning backup
    ///
    /// `Q(s,a) += alpha * (reward + gamma * max Q(s',·) - Q(s,a))`
    pub fn update(
        &mut self,
        state: &EncodedState,
        action: Action,
        reward: f64,
        next_state: &EncodedState,
    ) {
        let max_next = self.table.max_value(next_state);
        let alpha = self.config.learning_rate;
        let gamma = self.config.discount_factor;

        let value = &mut self.table.values_mut(state)[action.index()];
        *value += alpha * (reward + gamma * max_next - *value);
    }

    /// Decay the exploration rate, floored at `epsilon_min`
    ///
    /// Called once per finished episode.
    pub fn decay_exploration(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    /// Write the value table to `path`
    pub fn persist(&self, path: &Path) -> Result<(), PersistenceError> {
        save_q_table(&self.table, path)
    }

    /// Replace the value table with the one stored at `path`
    ///
    /// On error the current table is left untouched.
    pub fn restore(&mut self, path: &Path) -> Result<(), PersistenceError> {
        self.table = load_q_table(path)?;
        Ok(())
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override the exploration rate, e.g. when resuming training
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(self.config.epsilon_min, 1.0);
    }

    /// Action values for `state`, materializing the row if unseen
    pub fn q_values(&mut self, state: &EncodedState) -> ActionValues {
        *self.table.values_mut(state)
    }

    /// Action values for `state` if the table has a row for it
    pub fn peek_values(&self, state: &EncodedState) -> Option<ActionValues> {
        self.table.get(state).copied()
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::STATE_BITS;
    use tempfile::TempDir;

    fn state(first: u8, second: u8) -> EncodedState {
        let mut bits = [0u8; STATE_BITS];
        bits[0] = first;
        bits[1] = second;
        bits[12] = 1;
        EncodedState::from_bits(bits).unwrap()
    }

    fn agent() -> QLearningAgent {
        QLearningAgent::with_seed(QLearningConfig::default(), 17).unwrap()
    }

    #[test]
    fn test_agent_creation() {
        let agent = agent();
        assert_eq!(agent.epsilon(), 1.0);
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = QLearningConfig {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert!(QLearningAgent::with_seed(config, 0).is_err());
    }

    #[test]
    fn test_single_update_value() {
        let mut agent = agent();
        let s = state(0, 0);
        let next = state(1, 0);

        agent.update(&s, Action::TurnLeft, 10.0, &next);

        assert_eq!(agent.q_values(&s), [0.0, 1.0, 0.0]);
        assert_eq!(agent.peek_values(&next), Some([0.0; NUM_ACTIONS]));
    }

    #[test]
    fn test_update_bootstraps_from_next_state() {
        let mut agent = agent();
        let s = state(0, 0);
        let next = state(0, 1);
        agent.table.insert(next, [2.0, 5.0, -1.0]);
        agent.table.insert(s, [1.0, 0.0, 0.0]);

        agent.update(&s, Action::Keep, -0.1, &next);

        let expected = 1.0 + 0.1 * (-0.1 + 0.99 * 5.0 - 1.0);
        assert!((agent.q_values(&s)[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_when_epsilon_zero() {
        let config = QLearningConfig {
            epsilon_start: 0.0,
            epsilon_min: 0.0,
            ..Default::default()
        };
        let mut agent = QLearningAgent::with_seed(config, 3).unwrap();
        let s = state(1, 1);
        agent.table.insert(s, [0.5, 0.2, 0.9]);

        for _ in 0..100 {
            assert_eq!(agent.select_action(&s), Action::TurnRight);
        }
    }

    #[test]
    fn test_exploration_covers_all_actions() {
        let mut agent = agent();
        let s = state(0, 0);
        let mut seen = [false; NUM_ACTIONS];

        for _ in 0..300 {
            seen[agent.select_action(&s).index()] = true;
        }

        assert_eq!(seen, [true; NUM_ACTIONS]);
        // Exploring never touches the table
        assert!(agent.peek_values(&s).is_none());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = agent();
        let mut b = agent();
        let s = state(0, 0);
        for _ in 0..50 {
            assert_eq!(a.select_action(&s), b.select_action(&s));
        }
    }

    #[test]
    fn test_exploration_decay() {
        let mut agent = agent();
        for _ in 0..500 {
            agent.decay_exploration();
        }
        assert!((agent.epsilon() - 0.995f64.powi(500)).abs() < 1e-9);

        for _ in 0..500 {
            agent.decay_exploration();
        }
        let expected = 0.01f64.max(0.995f64.powi(1000));
        assert!((agent.epsilon() - expected).abs() < 1e-12);

        for _ in 0..1000 {
            agent.decay_exploration();
            assert!(agent.epsilon() >= 0.01);
        }
    }

    #[test]
    fn test_persist_restore_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");

        let mut agent = agent();
        agent.update(&state(0, 0), Action::Keep, 10.0, &state(0, 1));
        agent.update(&state(0, 1), Action::TurnRight, -10.0, &state(1, 1));
        agent.update(&state(0, 0), Action::TurnLeft, -0.1, &state(0, 1));
        agent.persist(&path).unwrap();

        let mut restored = QLearningAgent::with_seed(QLearningConfig::default(), 99).unwrap();
        restored.update(&state(1, 0), Action::Keep, 3.0, &state(1, 0));
        restored.restore(&path).unwrap();

        assert_eq!(restored.table(), agent.table());
        assert!(restored.peek_values(&state(1, 0)).is_none());
    }

    #[test]
    fn test_failed_restore_keeps_table() {
        let temp_dir = TempDir::new().unwrap();
        let mut agent = agent();
        agent.update(&state(0, 0), Action::Keep, 10.0, &state(0, 1));
        let before = agent.table().clone();

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            agent.restore(&missing),
            Err(PersistenceError::NotFound { .. })
        ));

        let broken = temp_dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert!(matches!(
            agent.restore(&broken),
            Err(PersistenceError::Malformed { .. })
        ));

        assert_eq!(agent.table(), &before);
    }

    #[test]
    fn test_set_epsilon_is_clamped() {
        let mut agent = agent();
        agent.set_epsilon(0.0);
        assert_eq!(agent.epsilon(), 0.01);
        agent.set_epsilon(0.3);
        assert_eq!(agent.epsilon(), 0.3);
    }
}
