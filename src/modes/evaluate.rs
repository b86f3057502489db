//! Evaluation mode for trained agents
//!
//! Loads a saved value table and plays greedy episodes with it, reporting the
//! score of each one. Nothing is learned and nothing is written.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::game::{GameConfig, SnakeGame};
use crate::metrics::TrainingStats;
use crate::rl::{QLearningAgent, QLearningConfig};

/// Plays a restored agent greedily
pub struct EvaluateMode {
    agent: QLearningAgent,
    game: SnakeGame,
    max_steps_per_episode: usize,
}

impl EvaluateMode {
    /// Load the table at `table_path` into a fresh agent
    pub fn new(
        table_path: &Path,
        config: GameConfig,
        seed: u64,
        max_steps_per_episode: usize,
    ) -> Result<Self> {
        let game = SnakeGame::with_seed(config, seed).context("Invalid game configuration")?;
        let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), seed)?;
        agent
            .restore(table_path)
            .with_context(|| format!("Failed to load value table from {:?}", table_path))?;

        info!(
            path = ?table_path,
            states = agent.table().len(),
            "loaded value table"
        );

        Ok(Self {
            agent,
            game,
            max_steps_per_episode,
        })
    }

    /// Play `episodes` greedy episodes and return their statistics
    pub fn run(&mut self, episodes: usize) -> Result<TrainingStats> {
        let mut stats = TrainingStats::new(episodes.max(1));

        for episode in 1..=episodes {
            let (reward, steps, score) = self.play_episode()?;
            stats.record_episode(reward, steps, score);
            info!(episode, score, steps, reward, "evaluation episode finished");
        }

        info!(summary = %stats.format_summary(), "evaluation complete");
        Ok(stats)
    }

    fn play_episode(&mut self) -> Result<(f64, usize, u32)> {
        let mut state = self.game.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;

        while steps < self.max_steps_per_episode {
            let action = self.agent.greedy_action(&state);
            let result = self.game.step(action)?;
            total_reward += result.reward;
            steps += 1;
            if result.terminated {
                break;
            }
            state = self.game.encode_state();
        }

        Ok((total_reward, steps, self.game.score()))
    }
}
