use super::{FRUIT_CELLS, GRID_SIZE, OBS_DIM};
use anyhow::Result;
use candle_core::{Device, Tensor};

/// Observation of [`FruitCollection`](super::FruitCollection).
///
/// A vector of [`OBS_DIM`] values: the one-hot position of the agent on the
/// grid followed by a mask of the candidate cells still holding a fruit.
#[derive(Clone, Debug)]
pub struct FruitCollectionObs(Tensor);

impl FruitCollectionObs {
    pub(super) fn new(pos: (usize, usize), fruits: &[bool]) -> Result<Self> {
        let mut v = vec![0f32; OBS_DIM];
        v[pos.0 * GRID_SIZE + pos.1] = 1.0;
        for (k, &fruit) in fruits.iter().take(FRUIT_CELLS.len()).enumerate() {
            if fruit {
                v[GRID_SIZE * GRID_SIZE + k] = 1.0;
            }
        }
        Ok(Self(Tensor::from_vec(v, (OBS_DIM,), &Device::Cpu)?))
    }
}

impl hra_core::Obs for FruitCollectionObs {}

impl From<FruitCollectionObs> for Tensor {
    fn from(obs: FruitCollectionObs) -> Tensor {
        obs.0
    }
}
