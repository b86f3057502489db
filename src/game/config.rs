use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Length of the snake after a reset
    pub initial_snake_length: usize,
    /// Width of the border kept free of food on every side
    pub food_inset: usize,

    // Rewards
    /// Reward for eating food
    pub food_reward: f64,
    /// Reward for every non-eating, non-terminal step
    pub step_penalty: f64,
    /// Reward for the terminal step
    pub death_penalty: f64,

    // Anti-looping heuristic
    /// Amount subtracted from the reward of a degenerate step
    pub loop_penalty: f64,
    /// Step counter value that must be exceeded before the penalty applies
    pub loop_penalty_after_steps: u32,
    /// Penalty applies when the body covers fewer distinct cells than this
    pub loop_min_distinct_cells: usize,

    /// Upper bound on rejection-sampling draws for a food position
    pub max_food_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_snake_length: 3,
            food_inset: 2,
            food_reward: 10.0,
            step_penalty: -0.1,
            death_penalty: -10.0,
            loop_penalty: 2.0,
            loop_penalty_after_steps: 100,
            loop_min_distinct_cells: 3,
            max_food_attempts: 10_000,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Smallest grid that can hold the initial body with room for food
    ///
    /// The body is laid out downwards from the centre cell, so it needs
    /// `grid_size / 2 + length - 1 < grid_size`, and the inset sub-grid must
    /// contain strictly more cells than the body.
    pub fn min_grid_size(&self) -> usize {
        let length = self.initial_snake_length.max(1);
        let mut size = 2 * self.food_inset + 1;
        loop {
            let fits_body = size / 2 + length - 1 < size;
            let inset_side = size - 2 * self.food_inset;
            if fits_body && inset_side * inset_side > length {
                return size;
            }
            size += 1;
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_snake_length == 0 {
            return Err(ConfigError::EmptySnake);
        }

        let min = self.min_grid_size();
        if self.grid_size < min {
            return Err(ConfigError::GridTooSmall {
                grid_size: self.grid_size,
                min,
            });
        }

        if self.max_food_attempts == 0 {
            return Err(ConfigError::NoFoodAttempts);
        }

        Ok(())
    }
}
