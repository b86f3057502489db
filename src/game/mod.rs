//! Core game logic module for Snake
//!
//! This module contains the grid world, its reward model and the feature
//! encoder, without any I/O or rendering dependencies.

pub mod action;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Heading, NUM_ACTIONS};
pub use config::GameConfig;
pub use encoder::{encode_state, EncodedState, KeyError, STATE_BITS};
pub use engine::{CollisionType, SnakeGame, StepInfo, StepResult};
pub use error::{ConfigError, GameError};
pub use state::{GameState, Position, Snake};
