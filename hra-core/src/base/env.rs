//! Environment.
use super::{Obs, Step};
use anyhow::Result;

/// Represents an episodic environment with a discrete action space and
/// a vector-valued (decomposed) reward.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step with action index `act`.
    fn step(&mut self, act: usize) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Name of the task, used for naming checkpoint files.
    fn name(&self) -> &str;

    /// Average evaluation reward above which training is regarded as solved.
    fn success_threshold(&self) -> f32;

    /// The number of discrete actions.
    fn n_actions(&self) -> usize;
}
