//! Training mode for the Q-learning agent
//!
//! Runs episodes in the snake game, applies the Q-learning update after every
//! step, decays exploration after every episode and periodically saves
//! checkpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use q_snake::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(2000, PathBuf::from("pretrained/q_table_final.json"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::game::{GameConfig, SnakeGame};
use crate::metrics::TrainingStats;
use crate::rl::{
    load_metadata, save_metadata, PersistenceError, QLearningAgent, QLearningConfig,
    TrainingMetadata,
};

/// Configuration for training mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final value table
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Episodes longer than this are cut off
    pub max_steps_per_episode: usize,

    /// Seed for the game; the agent uses `seed + 1`
    pub seed: u64,

    /// Value table to continue training from
    pub resume_from: Option<PathBuf>,

    /// Continue from `save_path` when no `resume_from` is given and a table
    /// already exists there
    pub auto_resume: bool,

    /// Window size for rolling statistics
    pub stats_window: usize,

    /// Game configuration (grid size, rewards)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub agent_config: QLearningConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_episodes: 2000,
            save_path: PathBuf::from("pretrained/q_table_final.json"),
            checkpoint_frequency: 200,
            log_frequency: 20,
            max_steps_per_episode: 10_000,
            seed: 0,
            resume_from: None,
            auto_resume: true,
            stats_window: 100,
            game_config: GameConfig::default(),
            agent_config: QLearningConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            ..Default::default()
        }
    }

    /// Load a training configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse config {:?}", path))
    }
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    /// Agent being trained
    agent: QLearningAgent,

    /// Game used for experience collection
    game: SnakeGame,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Episodes completed, including those of a resumed run
    episodes_trained: usize,
}

impl TrainMode {
    /// Create a new training mode, validating both configurations
    pub fn new(config: TrainConfig) -> Result<Self> {
        let game = SnakeGame::with_seed(config.game_config.clone(), config.seed)
            .context("Invalid game configuration")?;
        let agent = QLearningAgent::with_seed(
            config.agent_config.clone(),
            config.seed.wrapping_add(1),
        )
        .context("Invalid Q-learning configuration")?;
        let stats = TrainingStats::new(config.stats_window.max(1));

        Ok(Self {
            agent,
            game,
            stats,
            config,
            episodes_trained: 0,
        })
    }

    /// Run the training loop
    pub fn run(&mut self) -> Result<()> {
        if let Some(path) = self.resume_path() {
            self.resume(&path)?;
        }

        info!(
            episodes = self.config.num_episodes,
            grid_size = self.config.game_config.grid_size,
            alpha = self.config.agent_config.learning_rate,
            gamma = self.config.agent_config.discount_factor,
            epsilon = self.agent.epsilon(),
            save_path = ?self.config.save_path,
            "starting Q-learning training"
        );

        for episode in 1..=self.config.num_episodes {
            let (episode_reward, episode_steps, episode_score) = self.run_episode()?;

            self.agent.decay_exploration();
            self.episodes_trained += 1;
            self.stats
                .record_episode(episode_reward, episode_steps, episode_score);

            debug!(
                episode,
                score = episode_score,
                steps = episode_steps,
                reward = episode_reward,
                epsilon = self.agent.epsilon(),
                "episode finished"
            );

            if self.config.log_frequency > 0 && episode % self.config.log_frequency == 0 {
                info!(
                    "[Episode {}/{}] {} | Epsilon: {:.3} | States: {}",
                    episode,
                    self.config.num_episodes,
                    self.stats.format_summary(),
                    self.agent.epsilon(),
                    self.agent.table().len()
                );
            }

            if self.config.checkpoint_frequency > 0 && episode % self.config.checkpoint_frequency == 0
            {
                self.save_checkpoint(episode)?;
            }
        }

        self.save_to(&self.config.save_path)
            .with_context(|| format!("Failed to save final table to {:?}", self.config.save_path))?;

        info!(
            path = ?self.config.save_path,
            summary = %self.stats.format_summary(),
            "training complete"
        );

        Ok(())
    }

    /// Explicit resume path, else an existing table at the save path
    fn resume_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.resume_from {
            return Some(path.clone());
        }
        let save_path = &self.config.save_path;
        (self.config.auto_resume && save_path.exists()).then(|| save_path.clone())
    }

    /// Load a previously saved table and, if present, its metadata
    fn resume(&mut self, path: &Path) -> Result<()> {
        self.agent
            .restore(path)
            .with_context(|| format!("Failed to resume from {:?}", path))?;

        match load_metadata(path) {
            Ok(metadata) => {
                if metadata.grid_size != self.config.game_config.grid_size {
                    warn!(
                        saved = metadata.grid_size,
                        current = self.config.game_config.grid_size,
                        "resuming a table trained on a different grid size"
                    );
                }
                self.agent.set_epsilon(metadata.epsilon);
                self.episodes_trained = metadata.episodes_trained;
            }
            Err(PersistenceError::NotFound { .. }) => {
                warn!(path = ?path, "no metadata next to table; keeping initial epsilon");
            }
            Err(e) => return Err(e).context("Failed to read training metadata"),
        }

        info!(
            path = ?path,
            states = self.agent.table().len(),
            epsilon = self.agent.epsilon(),
            "resumed value table"
        );
        Ok(())
    }

    /// Run a single training episode
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// - Total episode reward
    /// - Number of steps in the episode
    /// - Final score (food eaten)
    fn run_episode(&mut self) -> Result<(f64, usize, u32)> {
        let mut state = self.game.reset()?;
        let mut episode_reward = 0.0;
        let mut episode_steps = 0;

        loop {
            let action = self.agent.select_action(&state);
            let result = self.game.step(action)?;
            let next_state = self.game.encode_state();

            self.agent
                .update(&state, action, result.reward, &next_state);

            episode_reward += result.reward;
            episode_steps += 1;
            state = next_state;

            if result.terminated {
                break;
            }
            if episode_steps >= self.config.max_steps_per_episode {
                debug!(steps = episode_steps, "episode cut off");
                break;
            }
        }

        Ok((episode_reward, episode_steps, self.game.score()))
    }

    /// Save a checkpoint beside the final save path
    fn save_checkpoint(&self, episode: usize) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.json", episode));

        self.save_to(&checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        info!(path = ?checkpoint_path, "checkpoint saved");
        Ok(())
    }

    fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        self.agent.persist(path)?;
        let metadata = TrainingMetadata::new(
            self.config.agent_config.clone(),
            self.config.game_config.grid_size,
            self.agent.epsilon(),
            self.episodes_trained,
        );
        save_metadata(&metadata, path)
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}
