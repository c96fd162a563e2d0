//! Reward and step history of a training run.
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

/// Accumulated history of a training run, written as a binary checkpoint.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct Statistics {
    /// Reward of each training episode.
    pub rewards: Vec<f32>,

    /// Steps of each training episode.
    pub steps: Vec<usize>,

    /// Average reward of each evaluation.
    pub test_rewards: Vec<f32>,
}

impl Statistics {
    /// Mean reward of the last `window` training episodes.
    pub fn avg_reward(&self, window: usize) -> f32 {
        let start = self.rewards.len().saturating_sub(window.max(1));
        let tail = &self.rewards[start..];
        if tail.is_empty() {
            0.0
        } else {
            tail.iter().sum::<f32>() / tail.len() as f32
        }
    }

    /// Writes the statistics with bincode, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, self)?;
        debug!("Save statistics to {:?}", path);
        Ok(())
    }

    /// Reads statistics written by [`Statistics::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(file)?)
    }
}

/// Returns the mean and the standard error of the mean.
pub(crate) fn mean_and_stderr(xs: &[f32]) -> (f32, f32) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f32;
    let mean = xs.iter().sum::<f32>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt() / n.sqrt())
}
