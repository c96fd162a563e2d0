//! Configuration of [`FruitCollection`](super::FruitCollection).
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configurations of [`FruitCollection`](super::FruitCollection).
pub struct FruitCollectionConfig {
    pub(super) n_fruits: usize,
    pub(super) success_threshold: f32,
}

impl Default for FruitCollectionConfig {
    fn default() -> Self {
        Self {
            n_fruits: 5,
            success_threshold: 4.5,
        }
    }
}

impl FruitCollectionConfig {
    /// Sets the number of fruits placed at the start of an episode.
    ///
    /// The value is clamped to the number of candidate cells when the
    /// environment is built.
    pub fn n_fruits(mut self, v: usize) -> Self {
        self.n_fruits = v;
        self
    }

    /// Sets the evaluation reward regarded as solving the task.
    pub fn success_threshold(mut self, v: f32) -> Self {
        self.success_threshold = v;
        self
    }
}
