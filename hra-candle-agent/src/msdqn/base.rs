//! DQN agent with hybrid reward support.
use super::{config::MsDqnConfig, model::MsDqnModel, TargetType};
use crate::{
    model::SubModel,
    util::{CriticLoss, MultiStream},
};
use anyhow::Result;
use candle_core::{shape::D, DType, Device, Tensor};
use hra_core::{
    error::HraError,
    record::Record,
    replay_buffer::TransitionBatch,
    Agent, Env, ReplayBufferBase,
};
use log::trace;
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, path::Path};

/// DQN agent whose action-value function has one output stream per reward
/// component.
///
/// In hybrid-reward mode every stream is trained on its own reward component
/// and the action values used for acting are the weighted sum of the streams.
/// Otherwise the network has a single stream trained on the weighted sum of
/// the reward components, optionally with double Q-learning.
pub struct MsDqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    R: ReplayBufferBase<Batch = TransitionBatch<E::Obs>>,
    E::Obs: Into<Tensor>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    pub(in crate::msdqn) qnet: MsDqnModel<Q>,
    pub(in crate::msdqn) qnet_tgt: MsDqnModel<Q>,
    pub(in crate::msdqn) batch_size: usize,
    pub(in crate::msdqn) discount_factor: f64,
    pub(in crate::msdqn) hybrid_reward: bool,
    pub(in crate::msdqn) target_type: TargetType,
    pub(in crate::msdqn) double_q: bool,
    pub(in crate::msdqn) reward_weight: Vec<f32>,
    pub(in crate::msdqn) critic_loss: CriticLoss,
    pub(in crate::msdqn) device: Device,
    pub(in crate::msdqn) n_opts: usize,
    phantom: PhantomData<(E, R)>,
}

impl<E, Q, R> MsDqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    R: ReplayBufferBase<Batch = TransitionBatch<E::Obs>>,
    E::Obs: Into<Tensor>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    /// Constructs the agent.
    ///
    /// The target network starts as a copy of the learning network. Fails if
    /// the number of value streams does not fit the reward mode: one stream
    /// per reward weight in hybrid-reward mode, a single stream otherwise.
    pub fn build(config: MsDqnConfig<Q>) -> Result<Self> {
        let device = config.device.build()?;
        let qnet = MsDqnModel::build(config.model_config.clone(), &device)?;
        let mut qnet_tgt = MsDqnModel::build(config.model_config, &device)?;
        qnet_tgt.copy_from(&qnet)?;

        let expected = match config.hybrid_reward {
            true => config.reward_weight.len(),
            false => 1,
        };
        if qnet.n_streams != expected {
            return Err(HraError::StreamMismatch {
                expected,
                actual: qnet.n_streams,
            }
            .into());
        }

        Ok(Self {
            qnet,
            qnet_tgt,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            hybrid_reward: config.hybrid_reward,
            target_type: config.target_type,
            double_q: config.double_q,
            reward_weight: config.reward_weight,
            critic_loss: config.critic_loss,
            device,
            n_opts: 0,
            phantom: PhantomData,
        })
    }

    /// The number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Learning network.
    pub fn qnet(&self) -> &MsDqnModel<Q> {
        &self.qnet
    }

    /// Target network.
    pub fn qnet_tgt(&self) -> &MsDqnModel<Q> {
        &self.qnet_tgt
    }

    /// Action values used for acting, `[batch, n_actions]`.
    fn aggregate(&self, streams: &[Tensor]) -> Result<Tensor> {
        if !self.hybrid_reward {
            return Ok(streams[0].clone());
        }
        let mut q = streams[0].affine(self.reward_weight[0] as f64, 0.0)?;
        for (s, &w) in streams.iter().zip(self.reward_weight.iter()).skip(1) {
            q = q.add(&s.affine(w as f64, 0.0)?)?;
        }
        Ok(q)
    }

    fn stack_obs(obs: Vec<E::Obs>) -> Result<Tensor> {
        let xs = obs.into_iter().map(Into::into).collect::<Vec<Tensor>>();
        Ok(Tensor::stack(&xs, 0)?)
    }

    /// Loss over all streams, each regressing its own reward component.
    fn hybrid_loss(&self, batch: TransitionBatch<E::Obs>) -> Result<Tensor> {
        let n = batch.len();
        let n_streams = self.reward_weight.len();
        let reward = batch.flat_reward(n_streams)?;
        let reward = Tensor::from_vec(reward, (n, n_streams), &self.device)?;
        let not_done = self.not_done(&batch.is_terminated)?;
        let act = self.act(&batch.act)?;
        let obs = Self::stack_obs(batch.obs)?;
        let next_obs = Self::stack_obs(batch.next_obs)?;

        let pred = {
            let q = self.qnet.forward(&obs)?;
            let q = q
                .iter()
                .map(|q| q.gather(&act, D::Minus1))
                .collect::<Result<Vec<_>, _>>()?;
            Tensor::cat(&q, D::Minus1)?
        };

        let tgt = {
            let q = self.qnet_tgt.forward(&next_obs)?;
            let q = q
                .iter()
                .map(|q| match self.target_type {
                    TargetType::QLearning => q.max_keepdim(D::Minus1),
                    TargetType::ExpectedSarsa => q.mean_keepdim(D::Minus1),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let q = Tensor::cat(&q, D::Minus1)?;
            let q = q.broadcast_mul(&not_done)?.affine(self.discount_factor, 0.0)?;
            reward.add(&q)?.detach()
        };

        self.critic_loss.loss(&pred, &tgt)
    }

    /// Loss of the single stream on the weighted sum of reward components.
    fn single_loss(&self, batch: TransitionBatch<E::Obs>) -> Result<Tensor> {
        let n = batch.len();
        let reward = batch.weighted_reward(&self.reward_weight)?;
        let reward = Tensor::from_vec(reward, (n, 1), &self.device)?;
        let not_done = self.not_done(&batch.is_terminated)?;
        let act = self.act(&batch.act)?;
        let obs = Self::stack_obs(batch.obs)?;
        let next_obs = Self::stack_obs(batch.next_obs)?;

        let pred = self.qnet.forward(&obs)?[0].gather(&act, D::Minus1)?;

        let tgt = {
            let q_tgt = self.qnet_tgt.forward(&next_obs)?;
            let q_tgt = &q_tgt[0];
            let q = if self.double_q {
                let a = self.qnet.forward(&next_obs)?[0].argmax_keepdim(D::Minus1)?;
                q_tgt.gather(&a, D::Minus1)?
            } else {
                q_tgt.max_keepdim(D::Minus1)?
            };
            let q = q.mul(&not_done)?.affine(self.discount_factor, 0.0)?;
            reward.add(&q)?.detach()
        };

        self.critic_loss.loss(&pred, &tgt)
    }

    fn not_done(&self, is_terminated: &[i8]) -> Result<Tensor> {
        let v = is_terminated
            .iter()
            .map(|&t| (1 - t) as f32)
            .collect::<Vec<_>>();
        Ok(Tensor::from_vec(v, (is_terminated.len(), 1), &self.device)?)
    }

    fn act(&self, act: &[usize]) -> Result<Tensor> {
        let v = act.iter().map(|&a| a as u32).collect::<Vec<_>>();
        Ok(Tensor::from_vec(v, (act.len(), 1), &self.device)?)
    }
}

impl<E, Q, R> Agent<E, R> for MsDqn<E, Q, R>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    R: ReplayBufferBase<Batch = TransitionBatch<E::Obs>>,
    E::Obs: Into<Tensor>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + std::fmt::Debug + PartialEq + Clone,
{
    fn action_values(&mut self, obs: &E::Obs) -> Result<Vec<f32>> {
        let obs: Tensor = obs.clone().into();
        let streams = self.qnet.forward(&obs.unsqueeze(0)?)?;
        let q = self.aggregate(&streams)?;
        Ok(q.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }

    fn opt(&mut self, buffer: &mut R) -> Result<Record> {
        let batch = buffer.batch(self.batch_size)?;
        let loss = match self.hybrid_reward {
            true => self.hybrid_loss(batch)?,
            false => self.single_loss(batch)?,
        };
        self.qnet.backward_step(&loss)?;
        self.n_opts += 1;

        Ok(Record::from_scalar("loss", loss.to_scalar::<f32>()?))
    }

    fn sync_target(&mut self) -> Result<()> {
        self.qnet_tgt.copy_from(&self.qnet)?;
        trace!("Synchronized target network after {} opts", self.n_opts);
        Ok(())
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.qnet.save(path)
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path)?;
        self.sync_target()
    }
}
