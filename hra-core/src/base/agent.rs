//! Agent.
use super::{Env, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a value-based agent holding a learning network and a target network.
///
/// Action selection itself (greedy, random or explorative) is done by
/// [`Trainer`](crate::Trainer); the agent only provides action values.
pub trait Agent<E: Env, R: ReplayBufferBase> {
    /// Returns the action values of the learning network for an observation,
    /// one element per action.
    fn action_values(&mut self, obs: &E::Obs) -> Result<Vec<f32>>;

    /// Performs an optimization step.
    ///
    /// Exactly one batch is taken from `buffer` and exactly one gradient step
    /// is applied to the learning network. The returned record contains the
    /// scalar loss under the key `"loss"`.
    fn opt(&mut self, buffer: &mut R) -> Result<Record>;

    /// Overwrites the parameters of the target network with those of the
    /// learning network.
    fn sync_target(&mut self) -> Result<()>;

    /// Saves the parameters of the learning network into the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the learning network from the given file and
    /// synchronizes the target network with them.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
