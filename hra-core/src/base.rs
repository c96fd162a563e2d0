//! Core functionalities.
mod agent;
mod env;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::Step;

/// An observation of an environment.
pub trait Obs: Clone + Debug {}
