//! Q-learning hyperparameter configuration

use crate::game::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning agent
///
/// # Example
///
/// ```rust
/// use q_snake::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     learning_rate: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Step size of the Bellman backup (alpha)
    ///
    /// Default: 0.1
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.99
    pub discount_factor: f64,

    /// Exploration rate before any decay
    ///
    /// Default: 1.0
    pub epsilon_start: f64,

    /// Floor for the exploration rate
    ///
    /// Default: 0.01
    pub epsilon_min: f64,

    /// Multiplicative decay applied once per finished episode
    ///
    /// Default: 0.995
    pub epsilon_decay: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
        }
    }
}

fn check(
    name: &'static str,
    range: &'static str,
    value: f64,
    ok: bool,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, range, value })
    }
}

impl QLearningConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lr = self.learning_rate;
        check("learning_rate", "(0, 1]", lr, lr > 0.0 && lr <= 1.0)?;

        let gamma = self.discount_factor;
        check("discount_factor", "[0, 1]", gamma, (0.0..=1.0).contains(&gamma))?;

        let start = self.epsilon_start;
        check("epsilon_start", "[0, 1]", start, (0.0..=1.0).contains(&start))?;

        let min = self.epsilon_min;
        check("epsilon_min", "[0, 1]", min, (0.0..=1.0).contains(&min))?;

        let decay = self.epsilon_decay;
        check("epsilon_decay", "(0, 1]", decay, decay > 0.0 && decay <= 1.0)?;

        if min > start {
            return Err(ConfigError::EpsilonOrder { min, start });
        }

        Ok(())
    }
}
