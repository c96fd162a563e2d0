//! Train [`Agent`].
mod config;
mod statistics;
use crate::{
    error::HraError,
    policy::{argmax, Explorer},
    replay_buffer::Transition,
    Agent, Env, ExperienceBufferBase, ReplayBufferBase, Step,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info, trace};
use rand::{rngs::SmallRng, Rng, SeedableRng};
pub use statistics::Statistics;
use statistics::mean_and_stderr;
use std::{path::PathBuf, time::Instant};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes of an environment and optimizes an agent on them.
///
/// # Episode
///
/// [`Trainer::episode()`] runs one episode until a terminal step or
/// `max_episode_length` steps. At every step:
///
/// 1. The agent returns action values for the current observation.
/// 2. An action is chosen: the argmax in deterministic mode, a uniformly
///    random action while `total_steps < exploration_steps`, otherwise the
///    [`Explorer`].
/// 3. The environment is stepped. Outside deterministic mode, the transition
///    is pushed into the replay buffer and `total_steps` is incremented.
/// 4. Once `total_steps > exploration_steps`, one optimization step
///    [`Agent::opt()`] is done and epsilon of the explorer is decayed.
/// 5. When `total_steps` is a multiple of `target_network_update_freq`, the
///    target network is overwritten with the learning network.
///
/// # Training run
///
/// [`Trainer::run()`] repeats training episodes. Every `stats_interval`
/// episodes the reward history is written to
/// `(data_dir)/(tag)-dqn-statistics-(task).bin`. Every `test_interval`
/// episodes the learning network is saved to
/// `(data_dir)/(tag)-dqn-model-(task).safetensors` and `test_repetitions`
/// deterministic episodes are run; training stops when their average reward
/// exceeds [`Env::success_threshold()`]. Training also stops after
/// `episode_limit` episodes.
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|action values|T[Trainer]
///     T -->|action|B[Env]
///     B -->|Step|T
///     T -->|Transition|D[ReplayBuffer]
///     D -->|TransitionBatch|A
/// ```
pub struct Trainer<E: Env> {
    env: E,
    explorer: Explorer,
    config: TrainerConfig,
    total_steps: usize,
    rng: SmallRng,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer and the environment it interacts with.
    pub fn build(config: TrainerConfig, env_config: &E::Config) -> Result<Self> {
        let env = E::build(env_config, config.seed)?;
        Ok(Self {
            env,
            explorer: config.explorer.clone(),
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            total_steps: 0,
        })
    }

    /// Environment steps taken in training episodes so far.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// The explorer used after the pure-exploration phase.
    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Path of the statistics checkpoint.
    pub fn statistics_path(&self) -> PathBuf {
        self.config.data_dir.join(format!(
            "{}-dqn-statistics-{}.bin",
            self.config.tag,
            self.env.name()
        ))
    }

    /// Path of the learning-network checkpoint.
    pub fn model_path(&self) -> PathBuf {
        self.config.data_dir.join(format!(
            "{}-dqn-model-{}.safetensors",
            self.config.tag,
            self.env.name()
        ))
    }

    fn select_action(&mut self, values: &[f32], deterministic: bool) -> Result<usize> {
        let n_actions = self.env.n_actions();
        if values.is_empty() || values.len() != n_actions {
            return Err(HraError::ActionValueMismatch {
                expected: n_actions,
                actual: values.len(),
            }
            .into());
        }

        Ok(if deterministic {
            argmax(values)
        } else if self.total_steps < self.config.exploration_steps {
            self.rng.gen_range(0..n_actions)
        } else {
            self.explorer.sample(values, &mut self.rng)
        })
    }

    fn is_sync_step(&self) -> bool {
        let freq = self.config.target_network_update_freq;
        freq > 0 && self.total_steps % freq == 0
    }

    /// Runs an episode and returns its weighted reward and the number of steps.
    ///
    /// With `deterministic == true` the greedy action is always taken and
    /// neither the replay buffer nor the agent is updated.
    pub fn episode<A, R>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
        deterministic: bool,
    ) -> Result<(f32, usize)>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = Transition<E::Obs>> + ReplayBufferBase,
    {
        let timer = Instant::now();
        let mut obs = self.env.reset()?;
        let mut total_reward = 0f32;
        let mut steps = 0;
        let mut loss = 0f32;
        let mut n_opts = 0;

        while self.config.max_episode_length == 0 || steps < self.config.max_episode_length {
            let values = agent.action_values(&obs)?;
            let act = self.select_action(&values, deterministic)?;
            let step = self.env.step(act)?;
            total_reward += step.weighted_reward(&self.config.reward_weight)?;
            steps += 1;
            let Step {
                obs: next_obs,
                reward,
                is_terminated,
                ..
            } = step;

            if !deterministic {
                buffer.push(Transition {
                    obs,
                    act,
                    reward,
                    next_obs: next_obs.clone(),
                    is_terminated,
                })?;
                self.total_steps += 1;

                if self.total_steps > self.config.exploration_steps {
                    let record = agent.opt(buffer)?;
                    loss += record.get_scalar("loss")?;
                    n_opts += 1;
                }

                if self.is_sync_step() {
                    agent.sync_target()?;
                    trace!("Synced target network at step {}", self.total_steps);
                }

                if self.total_steps > self.config.exploration_steps {
                    self.explorer.update_epsilon();
                }
            }

            obs = next_obs;
            if is_terminated {
                break;
            }
        }

        let episode_time = timer.elapsed().as_secs_f32();
        debug!(
            "episode steps {}, episode time {}, time per step {}, mean loss {}",
            steps,
            episode_time,
            episode_time / steps.max(1) as f32,
            if n_opts > 0 { loss / n_opts as f32 } else { 0.0 },
        );

        Ok((total_reward, steps))
    }

    /// Runs deterministic episodes and returns the mean and standard error of their rewards.
    pub fn evaluate<A, R>(&mut self, agent: &mut A, buffer: &mut R) -> Result<(f32, f32)>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = Transition<E::Obs>> + ReplayBufferBase,
    {
        let mut rewards = Vec::with_capacity(self.config.test_repetitions);
        for _ in 0..self.config.test_repetitions {
            let (reward, _) = self.episode(agent, buffer, true)?;
            rewards.push(reward);
        }
        Ok(mean_and_stderr(&rewards))
    }

    /// Trains the agent until the episode limit or the success threshold is reached.
    pub fn run<A, R>(&mut self, agent: &mut A, buffer: &mut R) -> Result<Statistics>
    where
        A: Agent<E, R>,
        R: ExperienceBufferBase<Item = Transition<E::Obs>> + ReplayBufferBase,
    {
        let mut stats = Statistics::default();
        let mut ep = 0;

        loop {
            ep += 1;
            let (reward, step) = self.episode(agent, buffer, false)?;
            stats.rewards.push(reward);
            stats.steps.push(step);
            info!(
                "episode {}, epsilon {:.4}, reward {:.3}, avg reward {:.3}, total steps {}, episode step {}",
                ep,
                self.explorer.epsilon(),
                reward,
                stats.avg_reward(self.config.window_size),
                self.total_steps,
                step
            );

            if self.config.episode_limit > 0 && ep > self.config.episode_limit {
                break;
            }

            if self.config.stats_interval > 0 && ep % self.config.stats_interval == 0 {
                stats.save(self.statistics_path())?;
            }

            if self.config.test_interval > 0 && ep % self.config.test_interval == 0 {
                info!("Testing...");
                agent.save_params(&self.model_path())?;
                let (avg_reward, stderr) = self.evaluate(agent, buffer)?;
                stats.test_rewards.push(avg_reward);
                info!("Avg reward {:.3}({:.3})", avg_reward, stderr);
                stats.save(self.statistics_path())?;

                if avg_reward > self.env.success_threshold() {
                    info!("Solved {} after {} episodes", self.env.name(), ep);
                    break;
                }
            }
        }

        Ok(stats)
    }
}
