//! Optimizer of the learning network.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of the Adam family of optimizers.
///
/// Omitted fields take the defaults of [`ParamsAdamW`]. Setting `weight_decay`
/// to `~` in YAML selects plain Adam without weight decay.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    /// Learning rate.
    pub lr: f64,

    /// Decay rates of the first and second moment estimates.
    #[serde(default = "default_betas")]
    pub betas: (f64, f64),

    #[serde(default = "default_eps")]
    pub eps: f64,

    /// Decoupled weight decay of AdamW.
    #[serde(default = "default_weight_decay")]
    pub weight_decay: Option<f64>,
}

fn default_betas() -> (f64, f64) {
    let p = ParamsAdamW::default();
    (p.beta1, p.beta2)
}

fn default_eps() -> f64 {
    ParamsAdamW::default().eps
}

fn default_weight_decay() -> Option<f64> {
    Some(ParamsAdamW::default().weight_decay)
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lr: ParamsAdamW::default().lr,
            betas: default_betas(),
            eps: default_eps(),
            weight_decay: default_weight_decay(),
        }
    }
}

impl OptimizerConfig {
    /// Learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.lr = lr;
        self
    }

    /// Decoupled weight decay, `None` for plain Adam.
    pub fn weight_decay(mut self, v: Option<f64>) -> Self {
        self.weight_decay = v;
        self
    }

    /// Constructs the optimizer updating `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let (beta1, beta2) = self.betas;
        let opt = match self.weight_decay {
            Some(weight_decay) => Optimizer::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr: self.lr,
                    beta1,
                    beta2,
                    eps: self.eps,
                    weight_decay,
                },
            )?),
            None => Optimizer::Adam(Adam::new(
                vars,
                ParamsAdam {
                    lr: self.lr,
                    beta_1: beta1,
                    beta_2: beta2,
                    eps: self.eps,
                    ..ParamsAdam::default()
                },
            )?),
        };
        Ok(opt)
    }
}

/// Optimizer built from [`OptimizerConfig`].
pub enum Optimizer {
    AdamW(AdamW),
    Adam(Adam),
}

impl Optimizer {
    /// Computes gradients of `loss` and applies one update.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => opt.backward_step(loss)?,
            Self::Adam(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}
