#![warn(missing_docs)]
//! Core components of a DQN agent with hybrid reward support.
//!
//! The crate defines the interfaces between an environment ([`Env`]),
//! a trainable agent ([`Agent`]) and a replay buffer ([`ReplayBufferBase`],
//! [`ExperienceBufferBase`]), together with the episodic training loop
//! ([`Trainer`]) that drives them.
pub mod error;
pub mod policy;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{Agent, Env, ExperienceBufferBase, Obs, ReplayBufferBase, Step};

mod trainer;
pub use trainer::{Statistics, Trainer, TrainerConfig};

#[cfg(test)]
mod dummy;
