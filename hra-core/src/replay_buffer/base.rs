//! Simple generic replay buffer.
use super::{SimpleReplayBufferConfig, Transition, TransitionBatch};
use crate::{error::HraError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A ring buffer of transitions sampled uniformly with replacement.
///
/// When the buffer is full, the oldest transition is overwritten.
pub struct SimpleReplayBuffer<O> {
    capacity: usize,
    i: usize,
    data: Vec<Transition<O>>,
    rng: StdRng,
}

impl<O: Clone> SimpleReplayBuffer<O> {
    /// Returns the maximum number of transitions kept in the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<O: Clone> ExperienceBufferBase for SimpleReplayBuffer<O> {
    type Item = Transition<O>;

    fn len(&self) -> usize {
        self.data.len()
    }

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.data.len() < self.capacity {
            self.data.push(tr);
        } else {
            self.data[self.i] = tr;
        }
        self.i = (self.i + 1) % self.capacity;
        Ok(())
    }
}

impl<O: Clone> ReplayBufferBase for SimpleReplayBuffer<O> {
    type Config = SimpleReplayBufferConfig;
    type Batch = TransitionBatch<O>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            capacity,
            i: 0,
            data: Vec::with_capacity(capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.data.is_empty() {
            return Err(HraError::EmptyReplayBuffer.into());
        }

        let ixs = (0..size)
            .map(|_| self.rng.gen_range(0..self.data.len()))
            .collect::<Vec<_>>();
        let mut batch = TransitionBatch {
            obs: Vec::with_capacity(size),
            act: Vec::with_capacity(size),
            reward: Vec::with_capacity(size),
            next_obs: Vec::with_capacity(size),
            is_terminated: Vec::with_capacity(size),
            ix_sample: ixs.clone(),
        };

        for ix in ixs {
            let tr = &self.data[ix];
            batch.obs.push(tr.obs.clone());
            batch.act.push(tr.act);
            batch.reward.push(tr.reward.clone());
            batch.next_obs.push(tr.next_obs.clone());
            batch.is_terminated.push(tr.is_terminated as i8);
        }

        Ok(batch)
    }
}
