//! DQN agent with hybrid (multi-stream) reward support.
mod base;
mod config;
mod model;
pub use base::MsDqn;
pub use config::{MsDqnConfig, TargetType};
pub use model::{MsDqnModel, MsDqnModelConfig};
