//! Environment step.
use super::Env;
use crate::error::HraError;

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`.
///
/// An environment emits [`Step`] object at every interaction steps.
/// The reward is a vector with one element per reward component; a plain
/// scalar-reward task returns a vector of length one.
pub struct Step<E: Env> {
    /// Action.
    pub act: usize,

    /// Observation.
    pub obs: E::Obs,

    /// Reward components.
    pub reward: Vec<f32>,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: usize, reward: Vec<f32>, is_terminated: bool) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
        }
    }

    /// Reward collapsed to a scalar with the given weights.
    ///
    /// Fails if the number of weights differs from the number of reward components.
    pub fn weighted_reward(&self, weight: &[f32]) -> Result<f32, HraError> {
        if weight.len() != self.reward.len() {
            return Err(HraError::RewardWeightMismatch {
                weights: weight.len(),
                components: self.reward.len(),
            });
        }
        Ok(self.reward.iter().zip(weight).map(|(r, w)| r * w).sum())
    }
}
