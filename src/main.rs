use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use q_snake::modes::{EvaluateMode, TrainConfig, TrainMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "q_snake")]
#[command(version, about = "Snake game with a tabular Q-learning agent")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// JSON training configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes (training or evaluation)
    #[arg(long)]
    episodes: Option<usize>,

    /// Grid side length
    #[arg(long)]
    grid_size: Option<usize>,

    /// Random seed for food placement and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Where the final value table is written
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Value table to resume training from, or to evaluate
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save a checkpoint every N episodes (0 disables)
    #[arg(long)]
    checkpoint_frequency: Option<usize>,

    /// Log progress every N episodes (0 disables)
    #[arg(long)]
    log_frequency: Option<usize>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the agent, saving checkpoints along the way
    Train,
    /// Play greedy episodes with a saved value table
    Evaluate,
}

impl Cli {
    /// Training configuration from `--config`, with flags applied on top
    fn resolve_config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)?,
            None => TrainConfig::default(),
        };
        if let Some(episodes) = self.episodes {
            config.num_episodes = episodes;
        }
        if let Some(grid_size) = self.grid_size {
            config.game_config.grid_size = grid_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(save_path) = &self.save_path {
            config.save_path = save_path.clone();
        }
        if let Some(frequency) = self.checkpoint_frequency {
            config.checkpoint_frequency = frequency;
        }
        if let Some(frequency) = self.log_frequency {
            config.log_frequency = frequency;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = cli.resolve_config()?;

    match cli.mode {
        Mode::Train => {
            config.resume_from = cli.load.or(config.resume_from);
            let mut train_mode = TrainMode::new(config)?;
            train_mode.run()?;
        }
        Mode::Evaluate => {
            let Some(path) = cli.load else {
                bail!("--load is required in evaluate mode");
            };
            let mut evaluate_mode = EvaluateMode::new(
                &path,
                config.game_config,
                config.seed,
                config.max_steps_per_episode,
            )?;
            evaluate_mode.run(config.num_episodes)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("train.json");
        std::fs::write(&path, r#"{"num_episodes": 7, "seed": 3}"#).unwrap();
        path
    }

    #[test]
    fn test_episodes_come_from_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir);
        let cli = Cli::parse_from([
            "q_snake",
            "--mode",
            "evaluate",
            "--config",
            path.to_str().unwrap(),
            "--load",
            "table.json",
        ]);

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.num_episodes, 7);
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir);
        let cli = Cli::parse_from([
            "q_snake",
            "--config",
            path.to_str().unwrap(),
            "--episodes",
            "3",
            "--grid-size",
            "12",
        ]);

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.num_episodes, 3);
        assert_eq!(config.game_config.grid_size, 12);
        assert_eq!(config.seed, 3);
    }
}
