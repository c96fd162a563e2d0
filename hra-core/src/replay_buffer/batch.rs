//! Transitions and batches of transitions.
use crate::error::HraError;

/// A transition `(o_t, a_t, r_t, o_t+1, is_terminated_t)`.
#[derive(Clone, Debug)]
pub struct Transition<O> {
    /// Observation.
    pub obs: O,

    /// Action index.
    pub act: usize,

    /// Reward components.
    pub reward: Vec<f32>,

    /// Next observation.
    pub next_obs: O,

    /// Flag denoting if `next_obs` is terminal.
    pub is_terminated: bool,
}

/// A batch of transitions, stored column-wise.
#[derive(Debug)]
pub struct TransitionBatch<O> {
    /// Observations.
    pub obs: Vec<O>,

    /// Actions.
    pub act: Vec<usize>,

    /// Reward vectors, one per transition.
    pub reward: Vec<Vec<f32>>,

    /// Next observations.
    pub next_obs: Vec<O>,

    /// Termination flags, 1 if terminated.
    pub is_terminated: Vec<i8>,

    /// Indices of the sampled transitions in the buffer.
    pub ix_sample: Vec<usize>,
}

impl<O> TransitionBatch<O> {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.act.len()
    }

    /// Returns `true` if the batch holds no transition.
    pub fn is_empty(&self) -> bool {
        self.act.is_empty()
    }

    /// Fails unless every reward vector has `n_components` elements.
    pub fn check_reward_dim(&self, n_components: usize) -> Result<(), HraError> {
        match self.reward.iter().find(|r| r.len() != n_components) {
            Some(r) => Err(HraError::RewardWeightMismatch {
                weights: n_components,
                components: r.len(),
            }),
            None => Ok(()),
        }
    }

    /// Reward of each transition collapsed to a scalar with the given weights.
    pub fn weighted_reward(&self, weight: &[f32]) -> Result<Vec<f32>, HraError> {
        self.check_reward_dim(weight.len())?;
        Ok(self
            .reward
            .iter()
            .map(|r| r.iter().zip(weight).map(|(r, w)| r * w).sum())
            .collect())
    }

    /// Reward vectors flattened row-major into `len() * n_components` values.
    pub fn flat_reward(&self, n_components: usize) -> Result<Vec<f32>, HraError> {
        self.check_reward_dim(n_components)?;
        Ok(self.reward.iter().flatten().copied().collect())
    }
}
