//! Multi-stream multilayer perceptron.
mod base;
mod config;
pub use base::MsMlp;
pub use config::MsMlpConfig;
