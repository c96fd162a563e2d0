//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum HraError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// The number of value streams does not match the reward dimension.
    #[error("Expected {expected} value streams, got {actual}")]
    StreamMismatch {
        /// Number of streams required by the configuration.
        expected: usize,
        /// Number of streams given.
        actual: usize,
    },

    /// The number of reward weights does not match the number of reward components.
    #[error("{weights} reward weights given for {components} reward components")]
    RewardWeightMismatch {
        /// Length of the weight vector.
        weights: usize,
        /// Length of the reward vector.
        components: usize,
    },

    /// The agent returned a number of action values different from the number of actions.
    #[error("Expected {expected} action values, got {actual}")]
    ActionValueMismatch {
        /// The number of actions of the environment.
        expected: usize,
        /// The number of action values returned.
        actual: usize,
    },

    /// Sampling from a replay buffer holding no transitions.
    #[error("Replay buffer is empty")]
    EmptyReplayBuffer,
}
