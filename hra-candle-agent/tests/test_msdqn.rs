use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarMap;
use hra_candle_agent::{
    mlp::{MsMlp, MsMlpConfig},
    msdqn::{MsDqn, MsDqnConfig, MsDqnModelConfig, TargetType},
    opt::OptimizerConfig,
    util::CriticLoss,
};
use hra_core::{
    error::HraError,
    replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig, Transition},
    Agent, Env, ExperienceBufferBase, ReplayBufferBase, Step, Trainer, TrainerConfig,
};
use tempdir::TempDir;

const LENGTH: usize = 5;
const N_ACTIONS: usize = 2;

mod line_env {
    use super::*;

    /// One-hot position on a line of `LENGTH` cells.
    #[derive(Clone, Debug)]
    pub struct LineObs(Tensor);

    impl hra_core::Obs for LineObs {}

    impl From<LineObs> for Tensor {
        fn from(obs: LineObs) -> Tensor {
            obs.0
        }
    }

    impl LineObs {
        pub fn new(pos: usize) -> Result<Self> {
            let mut v = vec![0f32; LENGTH];
            v[pos] = 1.0;
            Ok(Self(Tensor::from_vec(v, (LENGTH,), &Device::Cpu)?))
        }
    }

    #[derive(Clone, Debug)]
    pub struct LineEnvConfig {
        pub success_threshold: f32,
    }

    /// Walk right to reach the goal. Reward components are
    /// `[goal reached, step penalty]`.
    pub struct LineEnv {
        pos: usize,
        success_threshold: f32,
    }

    impl Env for LineEnv {
        type Config = LineEnvConfig;
        type Obs = LineObs;

        fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
            Ok(Self {
                pos: 0,
                success_threshold: config.success_threshold,
            })
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.pos = 0;
            LineObs::new(self.pos)
        }

        fn step(&mut self, act: usize) -> Result<Step<Self>> {
            self.pos = match act {
                0 => self.pos.saturating_sub(1),
                _ => (self.pos + 1).min(LENGTH - 1),
            };
            let is_terminated = self.pos == LENGTH - 1;
            let reward = vec![if is_terminated { 1.0 } else { 0.0 }, -0.1];
            Ok(Step::new(LineObs::new(self.pos)?, act, reward, is_terminated))
        }

        fn name(&self) -> &str {
            "Line"
        }

        fn success_threshold(&self) -> f32 {
            self.success_threshold
        }

        fn n_actions(&self) -> usize {
            N_ACTIONS
        }
    }
}

use line_env::{LineEnv, LineEnvConfig, LineObs};

type ReplayBuffer = SimpleReplayBuffer<LineObs>;
type LineAgent = MsDqn<LineEnv, MsMlp, ReplayBuffer>;

fn agent_config(n_streams: usize, hybrid_reward: bool) -> MsDqnConfig<MsMlp> {
    let mlp_config = MsMlpConfig::new(LENGTH, vec![16], N_ACTIONS, n_streams);
    let model_config = MsDqnModelConfig::default()
        .q_config(mlp_config)
        .opt_config(OptimizerConfig::default().learning_rate(0.01));
    MsDqnConfig::default()
        .model_config(model_config)
        .batch_size(8)
        .hybrid_reward(hybrid_reward)
        .reward_weight(vec![1.0, 1.0])
}

fn filled_buffer() -> Result<ReplayBuffer> {
    let mut buffer = ReplayBuffer::build(&SimpleReplayBufferConfig::default().capacity(100));
    for pos in 0..LENGTH - 1 {
        for act in 0..N_ACTIONS {
            let next = if act == 0 { pos.saturating_sub(1) } else { pos + 1 };
            let is_terminated = next == LENGTH - 1;
            buffer.push(Transition {
                obs: LineObs::new(pos)?,
                act,
                reward: vec![if is_terminated { 1.0 } else { 0.0 }, -0.1],
                next_obs: LineObs::new(next)?,
                is_terminated,
            })?;
        }
    }
    Ok(buffer)
}

/// Linear heads on the one-hot position, so that `Q_k(pos, a)` is the weight
/// at row `a` and column `pos` of head `k`.
fn linear_agent_config(n_streams: usize, hybrid_reward: bool) -> MsDqnConfig<MsMlp> {
    let mlp_config = MsMlpConfig::new(LENGTH, vec![], N_ACTIONS, n_streams);
    let model_config = MsDqnModelConfig::default().q_config(mlp_config);
    MsDqnConfig::default()
        .model_config(model_config)
        .batch_size(4)
        .discount_factor(0.5)
        .hybrid_reward(hybrid_reward)
}

type Head = [[f32; LENGTH]; N_ACTIONS];

fn set_heads(varmap: &VarMap, heads: &[Head]) -> Result<()> {
    let data = varmap.data().lock().unwrap();
    for (k, w) in heads.iter().enumerate() {
        data[&format!("msmlp.head{}.weight", k)].set(&Tensor::new(w, &Device::Cpu)?)?;
        data[&format!("msmlp.head{}.bias", k)]
            .set(&Tensor::zeros(N_ACTIONS, DType::F32, &Device::Cpu)?)?;
    }
    Ok(())
}

/// Buffer holding the single move from cell 1 to cell 2.
fn one_move(is_terminated: bool) -> Result<ReplayBuffer> {
    let mut buffer = ReplayBuffer::build(&SimpleReplayBufferConfig::default());
    buffer.push(Transition {
        obs: LineObs::new(1)?,
        act: 1,
        reward: vec![1.0, -0.1],
        next_obs: LineObs::new(2)?,
        is_terminated,
    })?;
    Ok(buffer)
}

/// All parameters of a varmap, ordered by variable name.
fn params(varmap: &VarMap) -> Result<Vec<f32>> {
    let data = varmap.data().lock().unwrap();
    let mut names = data.keys().collect::<Vec<_>>();
    names.sort();
    let mut v = vec![];
    for name in names {
        v.extend(data[name].as_tensor().flatten_all()?.to_vec1::<f32>()?);
    }
    Ok(v)
}

fn learning_params(agent: &LineAgent) -> Result<Vec<f32>> {
    params(agent.qnet().get_varmap())
}

fn target_params(agent: &LineAgent) -> Result<Vec<f32>> {
    params(agent.qnet_tgt().get_varmap())
}

#[test]
fn test_target_equals_learning_after_build() -> Result<()> {
    let agent = LineAgent::build(agent_config(2, true))?;
    assert_eq!(learning_params(&agent)?, target_params(&agent)?);
    Ok(())
}

#[test]
fn test_opt_updates_learning_network_only() -> Result<()> {
    let mut agent = LineAgent::build(agent_config(2, true))?;
    let mut buffer = filled_buffer()?;
    let before = target_params(&agent)?;

    for _ in 0..3 {
        agent.opt(&mut buffer)?;
    }
    assert_eq!(agent.n_opts(), 3);
    assert_eq!(target_params(&agent)?, before);
    assert_ne!(learning_params(&agent)?, before);

    agent.sync_target()?;
    assert_eq!(learning_params(&agent)?, target_params(&agent)?);

    // The synced target does not follow further updates.
    agent.opt(&mut buffer)?;
    assert_ne!(learning_params(&agent)?, target_params(&agent)?);
    Ok(())
}

#[test]
fn test_one_scalar_loss_per_update() -> Result<()> {
    let configs = vec![
        agent_config(2, true),
        agent_config(2, true).target_type(TargetType::ExpectedSarsa),
        agent_config(2, true).critic_loss(CriticLoss::SmoothL1),
        agent_config(1, false),
        agent_config(1, false).double_q(true),
    ];
    for config in configs {
        let mut agent = LineAgent::build(config)?;
        let mut buffer = filled_buffer()?;
        let record = agent.opt(&mut buffer)?;
        let loss = record.get_scalar("loss")?;
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }
    Ok(())
}

#[test]
fn test_stream_count_mismatch() -> Result<()> {
    for config in [agent_config(1, true), agent_config(2, false)] {
        let err = match LineAgent::build(config) {
            Ok(_) => panic!("agent with mismatched streams was built"),
            Err(err) => err,
        };
        assert!(matches!(
            err.downcast_ref::<HraError>(),
            Some(HraError::StreamMismatch { .. })
        ));
    }
    Ok(())
}

#[test]
fn test_hybrid_action_values_are_weighted_sum() -> Result<()> {
    let config = agent_config(2, true).reward_weight(vec![0.5, 2.0]);
    let mut agent = LineAgent::build(config)?;
    let obs = LineObs::new(2)?;

    let values = agent.action_values(&obs)?;
    let streams = agent.qnet().forward(&Tensor::from(obs).unsqueeze(0)?)?;
    let q0 = streams[0].squeeze(0)?.to_vec1::<f32>()?;
    let q1 = streams[1].squeeze(0)?.to_vec1::<f32>()?;

    assert_eq!(values.len(), N_ACTIONS);
    for a in 0..N_ACTIONS {
        assert!((values[a] - (0.5 * q0[a] + 2.0 * q1[a])).abs() < 1e-5);
    }
    Ok(())
}

#[test]
fn test_hybrid_loss_values() -> Result<()> {
    let z = [0.0; LENGTH];
    let learning: [Head; 2] = [
        [z, [0.0, 0.5, 0.0, 0.0, 0.0]],
        [z, [0.0, -0.2, 0.0, 0.0, 0.0]],
    ];
    let target: [Head; 2] = [
        [[0.0, 0.0, 0.4, 0.0, 0.0], [0.0, 0.0, 0.8, 0.0, 0.0]],
        [[0.0, 0.0, -0.6, 0.0, 0.0], [0.0, 0.0, 0.2, 0.0, 0.0]],
    ];

    // Stream targets: max gives [1.0 + 0.5 * 0.8, -0.1 + 0.5 * 0.2] = [1.4, 0.0],
    // mean gives [1.0 + 0.5 * 0.6, -0.1 + 0.5 * -0.2] = [1.3, -0.2],
    // a terminal move leaves the rewards [1.0, -0.1].
    let cases = [
        (TargetType::QLearning, false, (0.81 + 0.04) / 2.0),
        (TargetType::ExpectedSarsa, false, (0.64 + 0.0) / 2.0),
        (TargetType::QLearning, true, (0.25 + 0.01) / 2.0),
    ];
    for (target_type, is_terminated, expected) in cases {
        let config = linear_agent_config(2, true)
            .reward_weight(vec![1.0, 1.0])
            .target_type(target_type);
        let mut agent = LineAgent::build(config)?;
        set_heads(agent.qnet().get_varmap(), &learning)?;
        set_heads(agent.qnet_tgt().get_varmap(), &target)?;

        let loss = agent.opt(&mut one_move(is_terminated)?)?.get_scalar("loss")?;
        assert!(
            (loss - expected).abs() < 1e-5,
            "{:?}, terminated {}: {} != {}",
            target_type,
            is_terminated,
            loss,
            expected
        );
    }
    Ok(())
}

#[test]
fn test_single_loss_values() -> Result<()> {
    // In cell 2 the learning network prefers action 0, the target network action 1.
    let learning: [Head; 1] = [[[0.0, 0.0, 0.9, 0.0, 0.0], [0.0, 0.5, 0.3, 0.0, 0.0]]];
    let target: [Head; 1] = [[[0.0, 0.0, 0.1, 0.0, 0.0], [0.0, 0.0, 0.7, 0.0, 0.0]]];

    // Weighted reward 1.0 * 1.0 + 2.0 * -0.1 = 0.8 and prediction 0.5.
    let cases = [
        (false, false, (0.5f32 - (0.8 + 0.5 * 0.7)).powi(2)),
        (true, false, (0.5f32 - (0.8 + 0.5 * 0.1)).powi(2)),
        (false, true, (0.5f32 - 0.8).powi(2)),
        (true, true, (0.5f32 - 0.8).powi(2)),
    ];
    for (double_q, is_terminated, expected) in cases {
        let config = linear_agent_config(1, false)
            .reward_weight(vec![1.0, 2.0])
            .double_q(double_q);
        let mut agent = LineAgent::build(config)?;
        set_heads(agent.qnet().get_varmap(), &learning)?;
        set_heads(agent.qnet_tgt().get_varmap(), &target)?;

        let loss = agent.opt(&mut one_move(is_terminated)?)?.get_scalar("loss")?;
        assert!(
            (loss - expected).abs() < 1e-5,
            "double_q {}, terminated {}: {} != {}",
            double_q,
            is_terminated,
            loss,
            expected
        );
    }
    Ok(())
}

#[test]
fn test_reward_weight_must_cover_components() -> Result<()> {
    let config = agent_config(1, false).reward_weight(vec![1.0]);
    let mut agent = LineAgent::build(config)?;
    let err = match agent.opt(&mut filled_buffer()?) {
        Ok(_) => panic!("one weight was applied to two reward components"),
        Err(err) => err,
    };
    assert!(matches!(
        err.downcast_ref::<HraError>(),
        Some(HraError::RewardWeightMismatch {
            weights: 1,
            components: 2
        })
    ));
    assert_eq!(agent.n_opts(), 0);
    Ok(())
}

#[test]
fn test_config_save_and_load() -> Result<()> {
    let tmp_dir = TempDir::new("msdqn_config")?;
    let path = tmp_dir.path().join("agent.yaml");
    let config = agent_config(2, true)
        .target_type(TargetType::ExpectedSarsa)
        .critic_loss(CriticLoss::SmoothL1)
        .reward_weight(vec![0.5, 2.0]);
    config.save(&path)?;

    let loaded = MsDqnConfig::<MsMlp>::load(&path)?;
    assert_eq!(serde_yaml::to_string(&loaded)?, serde_yaml::to_string(&config)?);
    LineAgent::build(loaded)?;
    Ok(())
}

#[test]
fn test_loss_decreases_on_fixed_data() -> Result<()> {
    let config = agent_config(2, true).discount_factor(0.0);
    let mut agent = LineAgent::build(config)?;
    let mut buffer = filled_buffer()?;

    // With zero discount the targets are the rewards and do not move.
    let first = agent.opt(&mut buffer)?.get_scalar("loss")?;
    let mut last = first;
    for _ in 0..300 {
        last = agent.opt(&mut buffer)?.get_scalar("loss")?;
    }
    assert!(last < first);
    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<()> {
    let tmp_dir = TempDir::new("msdqn")?;
    let path = tmp_dir.path().join("model.safetensors");
    let obs = LineObs::new(1)?;

    let mut agent = LineAgent::build(agent_config(2, true))?;
    agent.opt(&mut filled_buffer()?)?;
    agent.save_params(&path)?;

    let mut restored = LineAgent::build(agent_config(2, true))?;
    restored.load_params(&path)?;

    assert_eq!(learning_params(&restored)?, learning_params(&agent)?);
    assert_eq!(learning_params(&restored)?, target_params(&restored)?);
    assert_eq!(restored.action_values(&obs)?, agent.action_values(&obs)?);
    Ok(())
}

#[test]
fn test_train_on_line_env() -> Result<()> {
    let tmp_dir = TempDir::new("msdqn_line")?;
    let config = TrainerConfig::default()
        .exploration_steps(20)
        .target_network_update_freq(10)
        .max_episode_length(30)
        .episode_limit(4)
        .test_interval(2)
        .test_repetitions(2)
        .reward_weight(vec![1.0, 1.0])
        .data_dir(tmp_dir.path())
        .tag("test");
    let env_config = LineEnvConfig {
        success_threshold: 100.0,
    };
    let mut trainer = Trainer::<LineEnv>::build(config, &env_config)?;
    let mut agent = LineAgent::build(agent_config(2, true))?;
    let mut buffer = ReplayBuffer::build(&SimpleReplayBufferConfig::default());

    let stats = trainer.run(&mut agent, &mut buffer)?;

    assert_eq!(stats.rewards.len(), 5);
    assert_eq!(stats.test_rewards.len(), 2);
    assert_eq!(buffer.len(), trainer.total_steps());
    assert_eq!(agent.n_opts(), trainer.total_steps().saturating_sub(20));
    assert!(trainer.model_path().exists());
    assert!(trainer.statistics_path().exists());
    Ok(())
}
