//! Multi-stage resamplers built from a designed cascade.

use math_audio_fir_design::{HalfbandDecimator, HalfbandInterpolator};

use crate::cascade::CascadeReport;
use crate::error::{CascadeError, Result};

/// Chain of 2:1 decimators, highest rate first.
#[derive(Debug, Clone)]
pub struct DecimatorCascade {
    stages: Vec<HalfbandDecimator>,
}

impl DecimatorCascade {
    /// Builds one decimator per stage of `report`.
    pub fn from_report(report: &CascadeReport) -> Result<Self> {
        let stages = report
            .stages
            .iter()
            .map(|r| {
                HalfbandDecimator::new(r.compressed_coefficients.clone()).map_err(|source| {
                    CascadeError::Fir {
                        multiplier: r.stage.oversampling_in,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    /// Overall decimation factor.
    pub fn factor(&self) -> usize {
        1 << self.stages.len()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the cascade has no stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Clears every stage.
    pub fn reset(&mut self) {
        self.stages.iter_mut().for_each(HalfbandDecimator::reset);
    }

    /// Decimates `input` by [`factor`](Self::factor).
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        let mut signal = input.to_vec();
        for stage in &mut self.stages {
            signal = stage.process_block(&signal);
        }
        signal
    }
}

/// Chain of 1:2 interpolators, lowest rate first.
#[derive(Debug, Clone)]
pub struct InterpolatorCascade {
    stages: Vec<HalfbandInterpolator>,
}

impl InterpolatorCascade {
    /// Builds one interpolator per stage of `report`, in reverse order.
    pub fn from_report(report: &CascadeReport) -> Result<Self> {
        let stages = report
            .stages
            .iter()
            .rev()
            .map(|r| {
                HalfbandInterpolator::new(r.compressed_coefficients.clone()).map_err(|source| {
                    CascadeError::Fir {
                        multiplier: r.stage.oversampling_in,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    /// Overall interpolation factor.
    pub fn factor(&self) -> usize {
        1 << self.stages.len()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the cascade has no stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Clears every stage.
    pub fn reset(&mut self) {
        self.stages.iter_mut().for_each(HalfbandInterpolator::reset);
    }

    /// Interpolates `input` by [`factor`](Self::factor).
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        let mut signal = input.to_vec();
        for stage in &mut self.stages {
            signal = stage.process_block(&signal);
        }
        signal
    }
}
