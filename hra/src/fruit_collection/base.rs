use super::{FruitCollectionConfig, FruitCollectionObs, FRUIT_CELLS, GRID_SIZE, N_ACTIONS};
use anyhow::{bail, Result};
use hra_core::{Env, Step};
use rand::{rngs::SmallRng, seq::index::sample, Rng, SeedableRng};

/// Grid world where the agent collects fruits.
///
/// At every reset `n_fruits` of the candidate cells in [`FRUIT_CELLS`] are
/// filled with a fruit and the agent is placed on a random free cell.
/// Eating the fruit on candidate cell `k` gives reward `1` on component `k`;
/// all other components are zero. The episode terminates when every fruit
/// has been eaten.
pub struct FruitCollection {
    n_fruits: usize,
    success_threshold: f32,
    pos: (usize, usize),
    fruits: Vec<bool>,
    rng: SmallRng,
}

impl FruitCollection {
    fn obs(&self) -> Result<FruitCollectionObs> {
        FruitCollectionObs::new(self.pos, &self.fruits)
    }

    /// Current position of the agent as `(row, col)`.
    pub fn pos(&self) -> (usize, usize) {
        self.pos
    }

    /// The number of fruits not yet eaten.
    pub fn n_remaining(&self) -> usize {
        self.fruits.iter().filter(|&&f| f).count()
    }
}

impl Env for FruitCollection {
    type Config = FruitCollectionConfig;
    type Obs = FruitCollectionObs;

    fn build(config: &Self::Config, seed: u64) -> Result<Self> {
        Ok(Self {
            n_fruits: config.n_fruits.min(FRUIT_CELLS.len()),
            success_threshold: config.success_threshold,
            pos: (0, 0),
            fruits: vec![false; FRUIT_CELLS.len()],
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.fruits = vec![false; FRUIT_CELLS.len()];
        for k in sample(&mut self.rng, FRUIT_CELLS.len(), self.n_fruits).into_iter() {
            self.fruits[k] = true;
        }

        self.pos = loop {
            let pos = (
                self.rng.gen_range(0..GRID_SIZE),
                self.rng.gen_range(0..GRID_SIZE),
            );
            let occupied = FRUIT_CELLS
                .iter()
                .zip(self.fruits.iter())
                .any(|(&cell, &f)| f && cell == pos);
            if !occupied {
                break pos;
            }
        };

        self.obs()
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        let (row, col) = self.pos;
        self.pos = match act {
            0 => (row.saturating_sub(1), col),
            1 => ((row + 1).min(GRID_SIZE - 1), col),
            2 => (row, col.saturating_sub(1)),
            3 => (row, (col + 1).min(GRID_SIZE - 1)),
            _ => bail!("Invalid action {}", act),
        };

        let mut reward = vec![0f32; FRUIT_CELLS.len()];
        if let Some(k) = FRUIT_CELLS.iter().position(|&cell| cell == self.pos) {
            if self.fruits[k] {
                self.fruits[k] = false;
                reward[k] = 1.0;
            }
        }
        let is_terminated = self.n_remaining() == 0;

        Ok(Step::new(self.obs()?, act, reward, is_terminated))
    }

    fn name(&self) -> &str {
        "FruitCollection"
    }

    fn success_threshold(&self) -> f32 {
        self.success_threshold
    }

    fn n_actions(&self) -> usize {
        N_ACTIONS
    }
}
