//! Configuration of the hybrid reward DQN agent.
use super::MsDqnModelConfig;
use crate::{
    model::SubModel,
    util::{CriticLoss, MultiStream},
    Device,
};
use anyhow::Result;
use candle_core::Tensor;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    marker::PhantomData,
    path::Path,
};

/// Bootstrapped value of the next state in hybrid-reward mode.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Default)]
pub enum TargetType {
    /// Maximum over actions of each stream.
    #[default]
    QLearning,

    /// Mean over actions of each stream.
    ExpectedSarsa,
}

/// Constructs [`MsDqn`](super::MsDqn).
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct MsDqnConfig<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    pub(super) model_config: MsDqnModelConfig<Q::Config>,
    pub(super) batch_size: usize,
    pub(super) discount_factor: f64,
    pub(super) hybrid_reward: bool,
    pub(super) target_type: TargetType,
    #[serde(default)]
    pub(super) double_q: bool,
    pub(super) reward_weight: Vec<f32>,
    #[serde(default)]
    pub(super) critic_loss: CriticLoss,
    #[serde(default)]
    pub(super) device: Device,
    #[serde(skip)]
    phantom: PhantomData<Q>,
}

impl<Q> Clone for MsDqnConfig<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            model_config: self.model_config.clone(),
            batch_size: self.batch_size,
            discount_factor: self.discount_factor,
            hybrid_reward: self.hybrid_reward,
            target_type: self.target_type,
            double_q: self.double_q,
            reward_weight: self.reward_weight.clone(),
            critic_loss: self.critic_loss,
            device: self.device,
            phantom: PhantomData,
        }
    }
}

impl<Q> Default for MsDqnConfig<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            batch_size: 32,
            discount_factor: 0.99,
            hybrid_reward: false,
            target_type: TargetType::QLearning,
            double_q: false,
            reward_weight: vec![1.0],
            critic_loss: CriticLoss::Mse,
            device: Device::Cpu,
            phantom: PhantomData,
        }
    }
}

impl<Q> MsDqnConfig<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Learns one value stream per reward component.
    pub fn hybrid_reward(mut self, v: bool) -> Self {
        self.hybrid_reward = v;
        self
    }

    /// Target of each stream in hybrid-reward mode.
    pub fn target_type(mut self, v: TargetType) -> Self {
        self.target_type = v;
        self
    }

    /// Double Q-learning in single-reward mode.
    pub fn double_q(mut self, v: bool) -> Self {
        self.double_q = v;
        self
    }

    /// Weights of reward components.
    pub fn reward_weight(mut self, v: Vec<f32>) -> Self {
        self.reward_weight = v;
        self
    }

    /// Critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: MsDqnModelConfig<Q::Config>) -> Self {
        self.model_config = model_config;
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Loads [`MsDqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of MsDqn agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`MsDqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of MsDqn agent into {:?}", path_);
        Ok(())
    }
}
