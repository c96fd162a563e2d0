use crate::{
    model::SubModel,
    opt::{Optimizer, OptimizerConfig},
    util::{hard_update, MultiStream},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`MsDqnModel`].
///
/// Stored as a part of [`MsDqnConfig`](super::MsDqnConfig).
pub struct MsDqnModelConfig<Q>
where
    Q: MultiStream,
{
    pub(super) q_config: Option<Q>,
    pub(super) opt_config: OptimizerConfig,
}

impl<Q> Default for MsDqnModelConfig<Q>
where
    Q: MultiStream,
{
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> MsDqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize + MultiStream,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Multi-stream action-value function with its parameters and optimizer.
pub struct MsDqnModel<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream,
{
    varmap: VarMap,

    // Number of value streams.
    pub(super) n_streams: usize,

    q: Q,
    opt: Optimizer,
}

impl<Q> MsDqnModel<Q>
where
    Q: SubModel<Input = Tensor, Output = Vec<Tensor>>,
    Q::Config: DeserializeOwned + Serialize + MultiStream + Clone,
{
    /// Constructs [`MsDqnModel`].
    pub fn build(config: MsDqnModelConfig<Q::Config>, device: &Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let n_streams = q_config.n_streams();
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            Q::build(vb, q_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            n_streams,
            q,
            opt,
        })
    }

    /// Outputs the action values of every stream given observation(s).
    pub fn forward(&self, obs: &Tensor) -> Result<Vec<Tensor>> {
        self.q.forward(obs)
    }

    /// Applies one optimizer step minimizing `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Overwrites the parameters with those of `src`.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        hard_update(&self.varmap, &src.varmap)
    }

    /// Returns the parameters.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        if let Some(dir) = path.as_ref().parent() {
            fs::create_dir_all(dir)?;
        }
        self.varmap.save(&path)?;
        info!("Save msdqn model to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads parameters saved with [`MsDqnModel::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load msdqn model from {:?}", path.as_ref());
        Ok(())
    }
}
