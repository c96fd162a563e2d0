use super::MsMlpConfig;
use crate::model::SubModel;
use anyhow::{bail, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Multilayer perceptron with ReLU activations, shared hidden layers and one
/// linear output head per value stream.
///
/// The output is a vector of `n_streams` tensors of shape `[batch, out_dim]`.
pub struct MsMlp {
    device: Device,
    hidden: Vec<Linear>,
    heads: Vec<Linear>,
}

impl SubModel for MsMlp {
    type Config = MsMlpConfig;
    type Input = Tensor;
    type Output = Vec<Tensor>;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        if config.n_streams == 0 {
            bail!("MsMlp needs at least one stream");
        }
        let device = vb.device().clone();
        let vb = vb.pp("msmlp");

        let mut hidden = Vec::with_capacity(config.units.len());
        let mut in_dim = config.in_dim;
        for (i, &units) in config.units.iter().enumerate() {
            hidden.push(linear(in_dim, units, vb.pp(format!("ln{}", i)))?);
            in_dim = units;
        }

        let heads = (0..config.n_streams)
            .map(|k| linear(in_dim, config.out_dim, vb.pp(format!("head{}", k))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            device,
            hidden,
            heads,
        })
    }

    fn forward(&self, xs: &Self::Input) -> Result<Self::Output> {
        let mut xs = xs.to_device(&self.device)?;
        for layer in self.hidden.iter() {
            xs = layer.forward(&xs)?.relu()?;
        }
        Ok(self
            .heads
            .iter()
            .map(|head| head.forward(&xs))
            .collect::<Result<Vec<_>, _>>()?)
    }
}
