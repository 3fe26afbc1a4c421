//! Cascade driver.
//!
//! The driver walks the oversampling multipliers from the maximum down to 1,
//! designing one halfband filter per halving. It is a small state machine:
//!
//! ```text
//! Init -> Designing { 0, max } -> Designing { 1, max / 2 } -> ... -> Done
//! ```
//!
//! A failing stage stops the run; the driver stays in the state that failed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CascadeConfig;
use crate::cost::CascadeCost;
use crate::designer::{FilterResult, HalfbandDesigner};
use crate::error::Result;
use crate::stage::{StageSpec, derive_stages};

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing designed yet
    Init,
    /// About to design stage `stage_index` at input multiplier `multiplier`
    Designing {
        /// Position of the stage, 0 for the highest rate
        stage_index: usize,
        /// Input oversampling multiplier of the stage
        multiplier: usize,
    },
    /// Every stage designed
    Done,
}

/// Finished cascade design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Settings the cascade was designed with
    pub config: CascadeConfig,
    /// One result per stage, highest rate first
    pub stages: Vec<FilterResult>,
    /// Sum of the per-stage cost estimates
    pub total_cost_estimate: f64,
}

impl CascadeReport {
    /// Builds the report and folds the cost over `stages`.
    pub fn new(config: CascadeConfig, stages: Vec<FilterResult>) -> Self {
        let total_cost_estimate = CascadeCost::fold(&stages).total;
        Self {
            config,
            stages,
            total_cost_estimate,
        }
    }

    /// Oversampling multipliers of the report, ending at 1.
    pub fn multipliers(&self) -> Vec<usize> {
        let mut multipliers: Vec<usize> =
            self.stages.iter().map(|r| r.stage.oversampling_in).collect();
        multipliers.extend(self.stages.last().map(|r| r.stage.oversampling_out));
        multipliers
    }
}

/// Stage-by-stage cascade designer.
#[derive(Debug, Clone)]
pub struct CascadeDriver {
    config: CascadeConfig,
    designer: HalfbandDesigner,
    state: DriverState,
    stages: Vec<FilterResult>,
}

impl CascadeDriver {
    /// Creates a driver after validating `config`.
    pub fn new(config: CascadeConfig) -> Result<Self> {
        config.validate()?;
        let designer = HalfbandDesigner::from_config(&config);
        Ok(Self {
            config,
            designer,
            state: DriverState::Init,
            stages: Vec::new(),
        })
    }

    /// Current state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Stages designed so far.
    pub fn stages(&self) -> &[FilterResult] {
        &self.stages
    }

    /// Performs one transition and returns the new state.
    ///
    /// Stepping a driver that is `Done` is a no-op.
    pub fn step(&mut self) -> Result<DriverState> {
        self.state = match self.state {
            DriverState::Init => DriverState::Designing {
                stage_index: 0,
                multiplier: self.config.max_oversampling,
            },
            DriverState::Designing {
                stage_index,
                multiplier,
            } => {
                let stage = StageSpec::from_config(multiplier, &self.config)?;
                log::info!(
                    "{}: fs = {} Hz, passband 0 - {} Hz ({}), stopband {} - {} Hz, transition {:.6}",
                    stage.label(),
                    stage.sample_rate,
                    stage.passband_edge_hz,
                    stage.policy.name(),
                    stage.stopband_start_hz,
                    stage.stopband_end_hz,
                    stage.transition
                );
                self.stages.push(self.designer.design(&stage)?);

                let next = multiplier / 2;
                if next > 1 {
                    DriverState::Designing {
                        stage_index: stage_index + 1,
                        multiplier: next,
                    }
                } else {
                    DriverState::Done
                }
            }
            DriverState::Done => DriverState::Done,
        };
        Ok(self.state)
    }

    /// Runs to completion and returns the report.
    pub fn run(mut self) -> Result<CascadeReport> {
        while self.step()? != DriverState::Done {}
        Ok(self.finish())
    }

    fn finish(self) -> CascadeReport {
        let report = CascadeReport::new(self.config, self.stages);
        log::info!(
            "cascade designed: {} stages, total cost estimate {}",
            report.stages.len(),
            report.total_cost_estimate
        );
        report
    }
}

/// Designs every stage concurrently.
///
/// Stage specs are derived up front in descending order so the first
/// degenerate stage is reported; results keep that order.
fn design_parallel(config: &CascadeConfig) -> Result<CascadeReport> {
    let specs = derive_stages(config)?;
    let designer = HalfbandDesigner::from_config(config);

    let results: Vec<Result<FilterResult>> = specs
        .par_iter()
        .map(|stage| designer.design(stage))
        .collect();
    let stages = results.into_iter().collect::<Result<Vec<_>>>()?;

    Ok(CascadeReport::new(config.clone(), stages))
}

/// Designs the whole cascade described by `config`.
///
/// # Example
///
/// ```rust,no_run
/// use math_audio_oversampling::{CascadeConfigBuilder, design_cascade};
///
/// let config = CascadeConfigBuilder::new()
///     .base_sample_rate(48000.0)
///     .max_oversampling(8)
///     .target_stopband_attenuation_db(-60.0)
///     .build()
///     .unwrap();
/// let report = design_cascade(&config).unwrap();
/// assert_eq!(report.stages.len(), 3);
/// ```
pub fn design_cascade(config: &CascadeConfig) -> Result<CascadeReport> {
    config.validate()?;
    if config.parallel {
        design_parallel(config)
    } else {
        CascadeDriver::new(config.clone())?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CascadeConfigBuilder;

    fn fast_config() -> CascadeConfig {
        CascadeConfigBuilder::new()
            .grid_resolution(32)
            .response_resolution(128)
            .build()
            .unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut driver = CascadeDriver::new(fast_config()).unwrap();
        assert_eq!(driver.state(), DriverState::Init);

        assert_eq!(
            driver.step().unwrap(),
            DriverState::Designing {
                stage_index: 0,
                multiplier: 8
            }
        );
        assert!(driver.stages().is_empty());

        assert_eq!(
            driver.step().unwrap(),
            DriverState::Designing {
                stage_index: 1,
                multiplier: 4
            }
        );
        assert_eq!(driver.stages().len(), 1);

        assert_eq!(
            driver.step().unwrap(),
            DriverState::Designing {
                stage_index: 2,
                multiplier: 2
            }
        );
        assert_eq!(driver.step().unwrap(), DriverState::Done);
        assert_eq!(driver.stages().len(), 3);

        // Done is terminal
        assert_eq!(driver.step().unwrap(), DriverState::Done);
        assert_eq!(driver.stages().len(), 3);
    }

    #[test]
    fn test_report_multipliers() {
        let report = design_cascade(&fast_config()).unwrap();
        assert_eq!(report.multipliers(), vec![8, 4, 2, 1]);
    }

    #[test]
    fn test_cost_is_folded() {
        let report = design_cascade(&fast_config()).unwrap();
        let expected: f64 = report
            .stages
            .iter()
            .map(|r| (r.stage.oversampling_out * (r.order + 1)) as f64)
            .sum();
        assert_eq!(report.total_cost_estimate, expected);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = design_cascade(&fast_config()).unwrap();
        let mut config = fast_config();
        config.parallel = true;
        let parallel = design_cascade(&config).unwrap();

        assert_eq!(sequential.stages, parallel.stages);
        assert_eq!(sequential.total_cost_estimate, parallel.total_cost_estimate);
    }

    #[test]
    fn test_degenerate_stage_stops_driver() {
        let config = CascadeConfigBuilder::new()
            .base_sample_rate(40000.0)
            .max_oversampling(4)
            .grid_resolution(32)
            .response_resolution(128)
            .build()
            .unwrap();
        let mut driver = CascadeDriver::new(config).unwrap();
        driver.step().unwrap();
        driver.step().unwrap();
        let err = driver.step().unwrap_err();
        assert!(err.is_degenerate_stage());
        assert_eq!(err.stage(), Some(2));
        assert_eq!(driver.stages().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CascadeConfig {
            max_oversampling: 6,
            ..CascadeConfig::default()
        };
        assert!(CascadeDriver::new(config.clone()).unwrap_err().is_config_error());
        assert!(design_cascade(&config).unwrap_err().is_config_error());
    }
}
