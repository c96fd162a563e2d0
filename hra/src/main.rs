use anyhow::Result;
use clap::Parser;
use hra::{
    fruit_collection::{FRUIT_CELLS, N_ACTIONS, OBS_DIM},
    FruitCollection, FruitCollectionConfig, FruitCollectionObs,
};
use hra_candle_agent::{
    mlp::{MsMlp, MsMlpConfig},
    msdqn::{MsDqn, MsDqnConfig, MsDqnModelConfig},
    opt::OptimizerConfig,
    util::CriticLoss,
};
use hra_core::{
    replay_buffer::{SimpleReplayBuffer, SimpleReplayBufferConfig},
    Agent, ReplayBufferBase, Trainer, TrainerConfig,
};
use log::info;
use std::path::PathBuf;

const LR_CRITIC: f64 = 0.0005;
const DISCOUNT_FACTOR: f64 = 0.99;
const BATCH_SIZE: usize = 32;
const EXPLORATION_STEPS: usize = 1000;
const TARGET_NETWORK_UPDATE_FREQ: usize = 1000;
const MAX_EPISODE_LENGTH: usize = 300;
const EPISODE_LIMIT: usize = 5000;
const TEST_INTERVAL: usize = 100;
const TEST_REPETITIONS: usize = 10;
const REPLAY_BUFFER_CAPACITY: usize = 100_000;
const CRITIC_LOSS: CriticLoss = CriticLoss::Mse;

type Env = FruitCollection;
type ReplayBuffer = SimpleReplayBuffer<FruitCollectionObs>;
type HraAgent = MsDqn<Env, MsMlp, ReplayBuffer>;

/// Train/eval hybrid reward DQN agent in the fruit collection task
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Train the agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate the agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Learn a single value stream on the weighted reward sum
    #[arg(long, default_value_t = false)]
    single_reward: bool,

    /// Prefix of checkpoint file names
    #[arg(long, default_value = "hra")]
    tag: String,

    /// Directory of checkpoint files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// YAML file of the trainer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// YAML file of the agent configuration, replaces `--single-reward`
    #[arg(long)]
    agent_config: Option<PathBuf>,
}

fn reward_weight() -> Vec<f32> {
    vec![1.0; FRUIT_CELLS.len()]
}

fn create_trainer_config(args: &Args) -> Result<TrainerConfig> {
    let config = match &args.config {
        Some(path) => TrainerConfig::load(path)?,
        None => TrainerConfig::default()
            .exploration_steps(EXPLORATION_STEPS)
            .target_network_update_freq(TARGET_NETWORK_UPDATE_FREQ)
            .max_episode_length(MAX_EPISODE_LENGTH)
            .episode_limit(EPISODE_LIMIT)
            .test_interval(TEST_INTERVAL)
            .test_repetitions(TEST_REPETITIONS)
            .reward_weight(reward_weight()),
    };
    Ok(config.tag(args.tag.as_str()).data_dir(&args.data_dir))
}

/// Reward weights always come from the trainer configuration, so that acting,
/// learning and the reported episode return agree.
fn create_agent_config(args: &Args, reward_weight: Vec<f32>) -> Result<MsDqnConfig<MsMlp>> {
    if let Some(path) = &args.agent_config {
        return Ok(MsDqnConfig::load(path)?.reward_weight(reward_weight));
    }

    let hybrid_reward = !args.single_reward;
    let n_streams = if hybrid_reward { reward_weight.len() } else { 1 };
    let opt_config = OptimizerConfig::default().learning_rate(LR_CRITIC);
    let mlp_config = MsMlpConfig::new(OBS_DIM, vec![250], N_ACTIONS, n_streams);
    let model_config = MsDqnModelConfig::default()
        .q_config(mlp_config)
        .opt_config(opt_config);
    Ok(MsDqnConfig::default()
        .model_config(model_config)
        .batch_size(BATCH_SIZE)
        .discount_factor(DISCOUNT_FACTOR)
        .hybrid_reward(hybrid_reward)
        .reward_weight(reward_weight)
        .critic_loss(CRITIC_LOSS))
}

fn train(args: &Args) -> Result<()> {
    let config = create_trainer_config(args)?;
    let replay_buffer_config = SimpleReplayBufferConfig::default()
        .capacity(REPLAY_BUFFER_CAPACITY)
        .seed(config.seed);
    let agent_config = create_agent_config(args, config.reward_weight.clone())?;
    let mut trainer = Trainer::<Env>::build(config, &FruitCollectionConfig::default())?;
    let mut agent = HraAgent::build(agent_config)?;
    let mut buffer = ReplayBuffer::build(&replay_buffer_config);

    let stats = trainer.run(&mut agent, &mut buffer)?;
    info!(
        "Finished training after {} episodes and {} steps",
        stats.rewards.len(),
        trainer.total_steps()
    );

    Ok(())
}

fn eval(args: &Args) -> Result<()> {
    let config = create_trainer_config(args)?;
    let agent_config = create_agent_config(args, config.reward_weight.clone())?;
    let mut trainer = Trainer::<Env>::build(config, &FruitCollectionConfig::default())?;
    let mut agent = HraAgent::build(agent_config)?;
    agent.load_params(&trainer.model_path())?;
    let mut buffer = ReplayBuffer::build(&SimpleReplayBufferConfig::default());

    let (avg_reward, stderr) = trainer.evaluate(&mut agent, &mut buffer)?;
    info!("Avg reward {:.3}({:.3})", avg_reward, stderr);

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.train {
        train(&args)?;
    } else if args.eval {
        eval(&args)?;
    } else {
        train(&args)?;
        eval(&args)?;
    }

    Ok(())
}
