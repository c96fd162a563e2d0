//! Deterministic environment, agent and buffer used in tests.
use crate::{
    record::Record,
    replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig, Transition, TransitionBatch},
    Agent, Env, ExperienceBufferBase, Obs, ReplayBufferBase, Step,
};
use anyhow::Result;
use std::{fs, path::Path};

#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub usize);

impl Obs for DummyObs {}

#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// Episode terminates after this many steps, `0` for never.
    pub length: usize,
    pub success_threshold: f32,
}

/// Walks along a line; every step yields reward `[1.0, 0.5]`.
pub struct DummyEnv {
    config: DummyEnvConfig,
    pos: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;

    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: 0,
        })
    }

    fn reset(&mut self) -> Result<DummyObs> {
        self.pos = 0;
        Ok(DummyObs(0))
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        self.pos += 1;
        let is_terminated = self.config.length > 0 && self.pos >= self.config.length;
        Ok(Step::new(
            DummyObs(self.pos),
            act,
            vec![1.0, 0.5],
            is_terminated,
        ))
    }

    fn name(&self) -> &str {
        "Dummy"
    }

    fn success_threshold(&self) -> f32 {
        self.config.success_threshold
    }

    fn n_actions(&self) -> usize {
        2
    }
}

/// Replay buffer counting pushes and sampled batches.
pub struct CountingBuffer {
    inner: SimpleReplayBuffer<DummyObs>,
    pub n_pushes: usize,
    pub n_batches: usize,
}

impl ExperienceBufferBase for CountingBuffer {
    type Item = Transition<DummyObs>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.n_pushes += 1;
        self.inner.push(tr)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl ReplayBufferBase for CountingBuffer {
    type Config = SimpleReplayBufferConfig;
    type Batch = TransitionBatch<DummyObs>;

    fn build(config: &Self::Config) -> Self {
        Self {
            inner: SimpleReplayBuffer::build(config),
            n_pushes: 0,
            n_batches: 0,
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.n_batches += 1;
        self.inner.batch(size)
    }
}

/// Agent whose "parameters" are the number of optimization steps done.
#[derive(Default)]
pub struct DummyAgent {
    pub params: usize,
    pub target_params: usize,
    pub n_action_values: usize,
    /// `(n_action_values, params)` at each target sync.
    pub syncs: Vec<(usize, usize)>,
    /// Returns no action values when set.
    pub empty_values: bool,
}

impl Agent<DummyEnv, CountingBuffer> for DummyAgent {
    fn action_values(&mut self, obs: &DummyObs) -> Result<Vec<f32>> {
        self.n_action_values += 1;
        Ok(if self.empty_values {
            vec![]
        } else if obs.0 % 2 == 0 {
            vec![0.0, 1.0]
        } else {
            vec![1.0, 0.0]
        })
    }

    fn opt(&mut self, buffer: &mut CountingBuffer) -> Result<Record> {
        let batch = buffer.batch(4)?;
        self.params += 1;
        Ok(Record::from_scalar("loss", batch.len() as f32))
    }

    fn sync_target(&mut self) -> Result<()> {
        self.target_params = self.params;
        self.syncs.push((self.n_action_values, self.params));
        Ok(())
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.params.to_string())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.params = fs::read_to_string(path)?.parse()?;
        self.target_params = self.params;
        Ok(())
    }
}
