//! Fruit collection task for the hybrid reward DQN agent.
//!
//! The agent walks on a grid and eats fruits appearing on a subset of fixed
//! candidate cells. The reward is decomposed into one component per
//! candidate cell, which makes the task a natural fit for learning one
//! value stream per component.
pub mod fruit_collection;
pub use fruit_collection::{FruitCollection, FruitCollectionConfig, FruitCollectionObs};
