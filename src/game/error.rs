use thiserror::Error;

/// Invalid game or learner configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid_size {grid_size} is too small: need at least {min}")]
    GridTooSmall { grid_size: usize, min: usize },
    #[error("initial_snake_length must be at least 1")]
    EmptySnake,
    #[error("max_food_attempts must be at least 1")]
    NoFoodAttempts,
    #[error("{name} must be in {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
    #[error("epsilon_min ({min}) cannot exceed epsilon_start ({start})")]
    EpsilonOrder { min: f64, start: f64 },
}

/// Errors raised while running the game
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("action index {0} is not one of Keep(0), TurnLeft(1), TurnRight(2)")]
    InvalidAction(usize),
    #[error("no free food cell found after {attempts} attempts")]
    FoodPlacementExhausted { attempts: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
