//! Q Snake - a Snake game with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic and state encoding (game module)
//! - The Q-learning agent and value-table persistence (rl module)
//! - Rolling training statistics (metrics module)
//! - Training and evaluation loops (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
