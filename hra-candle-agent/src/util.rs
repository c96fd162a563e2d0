//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Tensor};
use candle_nn::VarMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Default)]
pub enum CriticLoss {
    /// Mean squared error.
    #[default]
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

impl CriticLoss {
    /// Mean loss over all elements, a rank-0 tensor.
    pub fn loss(&self, pred: &Tensor, tgt: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::Mse => candle_nn::loss::mse(pred, tgt)?,
            Self::SmoothL1 => smooth_l1_loss(pred, tgt)?,
        })
    }
}

/// Configuration of a model with several value streams.
pub trait MultiStream {
    /// Returns the number of value streams.
    fn n_streams(&self) -> usize;
}

/// Copies every variable of `src` into the variable of the same name in `dest`.
pub fn hard_update(dest: &VarMap, src: &VarMap) -> Result<()> {
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (name, v_dest) in dest.iter() {
        let v_src = src
            .get(name)
            .ok_or_else(|| anyhow!("Variable {} is missing in the source", name))?;
        v_dest.set(v_src.as_tensor())?;
    }
    trace!("Copied {} variables", dest.len());

    Ok(())
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let d = x.sub(y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quad = m1.mul(&d.sqr()?.affine(0.5, 0.0)?)?;
    let lin = m2.mul(&d.affine(1.0, -0.5)?)?;
    quad.add(&lin)?.mean_all()
}
