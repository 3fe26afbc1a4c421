//! Cascade cost estimate.
//!
//! A stage of order `n` costs `oversampling_out * (n + 1)`: a coarse count of
//! multiply-accumulates per base-rate output sample, good for comparing
//! cascade layouts and nothing more.

use serde::{Deserialize, Serialize};

use crate::designer::FilterResult;

/// Cost of one stage.
pub fn stage_cost(oversampling_out: usize, order: usize) -> f64 {
    (oversampling_out * (order + 1)) as f64
}

/// Running cost over a sequence of stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeCost {
    /// Accumulated cost
    pub total: f64,
    /// Number of stages folded in
    pub stages: usize,
}

impl CascadeCost {
    /// Adds one accepted stage.
    pub fn add(self, result: &FilterResult) -> Self {
        Self {
            total: self.total + stage_cost(result.stage.oversampling_out, result.order),
            stages: self.stages + 1,
        }
    }

    /// Folds the cost over `results`.
    pub fn fold<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a FilterResult>,
    {
        results.into_iter().fold(Self::default(), Self::add)
    }
}
