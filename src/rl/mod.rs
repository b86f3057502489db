//! Tabular Q-learning for the snake game
//!
//! Provides:
//! - A value table keyed by encoded game state, with lazy zero rows
//! - An epsilon-greedy agent with the one-step Q-learning update
//! - JSON persistence of the table and its training metadata

pub mod agent;
pub mod config;
pub mod persistence;
pub mod q_table;

pub use agent::QLearningAgent;
pub use config::QLearningConfig;
pub use persistence::{
    load_metadata, load_q_table, metadata_path, save_metadata, save_q_table, PersistenceError,
    TrainingMetadata,
};
pub use q_table::{ActionValues, QTable};
