use crate::util::MultiStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`MsMlp`](super::MsMlp).
pub struct MsMlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) n_streams: usize,
}

impl MsMlpConfig {
    /// Creates configuration of a multi-stream MLP.
    ///
    /// * `units` - Sizes of the hidden layers shared by all streams.
    /// * `out_dim` - The number of actions, the output size of every stream.
    /// * `n_streams` - The number of value streams.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, n_streams: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            n_streams,
        }
    }
}

impl MultiStream for MsMlpConfig {
    fn n_streams(&self) -> usize {
        self.n_streams
    }
}
