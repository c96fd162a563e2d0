//! Configuration of [`Trainer`](super::Trainer).
use crate::policy::Explorer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Environment steps with uniformly random actions before optimization starts.
    pub exploration_steps: usize,

    /// Interval of hard target-network updates in environment steps, `0` for never.
    pub target_network_update_freq: usize,

    /// Maximum steps in an episode, `0` for unlimited.
    pub max_episode_length: usize,

    /// Maximum number of training episodes, `0` for unlimited.
    pub episode_limit: usize,

    /// Interval of evaluation in episodes, `0` for never.
    pub test_interval: usize,

    /// The number of deterministic episodes per evaluation.
    pub test_repetitions: usize,

    /// Weights collapsing reward components into the episode reward.
    pub reward_weight: Vec<f32>,

    /// Prefix of checkpoint file names.
    pub tag: String,

    /// Directory of checkpoint files.
    pub data_dir: PathBuf,

    /// Window of the moving average of episode rewards.
    pub window_size: usize,

    /// Interval of writing statistics in episodes.
    pub stats_interval: usize,

    /// Exploration strategy after the pure-exploration phase.
    pub explorer: Explorer,

    /// Random seed of the environment and action sampling.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            exploration_steps: 1000,
            target_network_update_freq: 1000,
            max_episode_length: 0,
            episode_limit: 0,
            test_interval: 0,
            test_repetitions: 10,
            reward_weight: vec![1.0],
            tag: "hra".to_string(),
            data_dir: PathBuf::from("data"),
            window_size: 100,
            stats_interval: 100,
            explorer: Explorer::default(),
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of pure-exploration steps.
    pub fn exploration_steps(mut self, v: usize) -> Self {
        self.exploration_steps = v;
        self
    }

    /// Sets the interval of target-network updates in environment steps.
    pub fn target_network_update_freq(mut self, v: usize) -> Self {
        self.target_network_update_freq = v;
        self
    }

    /// Sets the maximum episode length.
    pub fn max_episode_length(mut self, v: usize) -> Self {
        self.max_episode_length = v;
        self
    }

    /// Sets the maximum number of training episodes.
    pub fn episode_limit(mut self, v: usize) -> Self {
        self.episode_limit = v;
        self
    }

    /// Sets the interval of evaluation in episodes.
    pub fn test_interval(mut self, v: usize) -> Self {
        self.test_interval = v;
        self
    }

    /// Sets the number of episodes per evaluation.
    pub fn test_repetitions(mut self, v: usize) -> Self {
        self.test_repetitions = v;
        self
    }

    /// Sets the reward weights.
    pub fn reward_weight(mut self, v: Vec<f32>) -> Self {
        self.reward_weight = v;
        self
    }

    /// Sets the tag of checkpoint files.
    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tag = v.into();
        self
    }

    /// Sets the directory of checkpoint files.
    pub fn data_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.data_dir = v.as_ref().to_path_buf();
        self
    }

    /// Sets the window of the moving average of episode rewards.
    pub fn window_size(mut self, v: usize) -> Self {
        self.window_size = v;
        self
    }

    /// Sets the interval of writing statistics.
    pub fn stats_interval(mut self, v: usize) -> Self {
        self.stats_interval = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: Explorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
