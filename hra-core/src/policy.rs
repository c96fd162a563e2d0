//! Exploration strategies for selecting an action from action values.
use rand::{distributions::WeightedIndex, Rng};
use serde::{Deserialize, Serialize};

/// Explorers selecting an action index given a vector of action values.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Explorer {
    /// Softmax action selection.
    Softmax(Softmax),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

impl Default for Explorer {
    fn default() -> Self {
        Self::EpsilonGreedy(EpsilonGreedy::new())
    }
}

impl Explorer {
    /// Takes an action based on action values.
    pub fn sample(&mut self, values: &[f32], rng: &mut impl Rng) -> usize {
        match self {
            Self::Softmax(softmax) => softmax.action(values, rng),
            Self::EpsilonGreedy(egreedy) => egreedy.action(values, rng),
        }
    }

    /// Decays the exploration parameter by one step.
    pub fn update_epsilon(&mut self) {
        if let Self::EpsilonGreedy(egreedy) = self {
            egreedy.update_epsilon();
        }
    }

    /// Current exploration parameter, `0` for explorers without one.
    pub fn epsilon(&self) -> f64 {
        match self {
            Self::Softmax(_) => 0.0,
            Self::EpsilonGreedy(egreedy) => egreedy.eps,
        }
    }
}

/// Returns the index of the first maximal element.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(i_max, v_max), (i, &v)| {
            if v > v_max {
                (i, v)
            } else {
                (i_max, v_max)
            }
        })
        .0
}

/// Softmax explorer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {}

#[allow(clippy::new_without_default)]
impl Softmax {
    /// Constructs softmax explorer.
    pub fn new() -> Self {
        Self {}
    }

    /// Samples an action with probabilities proportional to `exp(values)`.
    pub fn action(&mut self, values: &[f32], rng: &mut impl Rng) -> usize {
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let probs = values.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
        match WeightedIndex::new(&probs) {
            Ok(dist) => rng.sample(dist),
            Err(_) => argmax(values),
        }
    }
}

/// Epsilon-greedy explorer with linearly decaying epsilon.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Current epsilon.
    pub eps: f64,
    /// Epsilon at the start.
    pub eps_start: f64,
    /// Lower bound of epsilon.
    pub eps_final: f64,
    /// The number of decay steps from `eps_start` to `eps_final`.
    pub final_step: usize,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            eps: 1.0,
            eps_start: 1.0,
            eps_final: 0.02,
            final_step: 100_000,
        }
    }

    /// Constructs epsilon-greedy explorer decaying over `final_step` updates.
    pub fn with_final_step(final_step: usize) -> Explorer {
        Explorer::EpsilonGreedy(Self {
            final_step,
            ..Self::new()
        })
    }

    /// Takes a random action with probability epsilon, otherwise the greedy one.
    pub fn action(&mut self, values: &[f32], rng: &mut impl Rng) -> usize {
        if rng.gen::<f64>() < self.eps {
            rng.gen_range(0..values.len())
        } else {
            argmax(values)
        }
    }

    /// Decreases epsilon by `(eps_start - eps_final) / final_step`, not below `eps_final`.
    pub fn update_epsilon(&mut self) {
        let d = (self.eps_start - self.eps_final) / self.final_step.max(1) as f64;
        self.eps = (self.eps - d).max(self.eps_final);
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(self, v: f64) -> Self {
        let mut s = self;
        s.eps_final = v;
        s
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(self, v: f64) -> Self {
        let mut s = self;
        s.eps_start = v;
        s.eps = v;
        s
    }
}
