//! Minimum-order halfband filter search.
//!
//! Orders are tried from 1 upwards. Each candidate is synthesized with the
//! Remez exchange, measured over the stage's stopband and accepted as soon as
//! its worst stopband level reaches the target. The search is bounded by
//! `max_order`. A candidate the exchange cannot synthesize ends the search
//! with an error.

use math_audio_fir_design::{
    FirError, FrequencyResponse, HalfbandSpec, compress_halfband, frequency_response,
    halfband_tap_count, verify_halfband_structure,
};
use serde::{Deserialize, Serialize};

use crate::config::CascadeConfig;
use crate::error::{CascadeError, Result};
use crate::stage::StageSpec;

/// One synthesized filter of a given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCandidate {
    /// Filter order
    pub order: usize,
    /// Number of taps (`4 * order - 1`)
    pub tap_count: usize,
    /// Full, symmetric impulse response
    pub coefficients: Vec<f64>,
    /// Remez iterations spent on this candidate
    pub iterations: usize,
}

/// What happened to one candidate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Measured and found too weak
    Rejected {
        /// Worst stopband level (dB)
        attenuation_db: f64,
    },
    /// Measured and accepted
    Accepted {
        /// Worst stopband level (dB)
        attenuation_db: f64,
    },
}

/// Search trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Candidate order
    pub order: usize,
    /// Result of the evaluation
    #[serde(flatten)]
    pub outcome: CandidateOutcome,
}

impl CandidateRecord {
    /// Measured worst stopband level (dB).
    pub fn attenuation_db(&self) -> f64 {
        match self.outcome {
            CandidateOutcome::Rejected { attenuation_db }
            | CandidateOutcome::Accepted { attenuation_db } => attenuation_db,
        }
    }
}

/// Accepted filter of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Stage the filter was designed for
    pub stage: StageSpec,
    /// Accepted order
    pub order: usize,
    /// Full impulse response
    pub coefficients: Vec<f64>,
    /// The `order` distinct coefficients (taps 0, 2, 4, ...)
    pub compressed_coefficients: Vec<f64>,
    /// Worst stopband level of the accepted filter (dB)
    pub achieved_stopband_attenuation_db: f64,
    /// Every candidate evaluated, the accepted one last
    pub search_trace: Vec<CandidateRecord>,
}

impl FilterResult {
    /// Number of taps of the accepted filter.
    pub fn tap_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Magnitude response of the accepted filter at the stage rate.
    pub fn response(
        &self,
        response_resolution: usize,
    ) -> math_audio_fir_design::Result<FrequencyResponse> {
        frequency_response(
            &self.coefficients,
            self.stage.sample_rate,
            self.stage.response_points(response_resolution),
        )
    }
}

/// Bounded minimum-order search for halfband filters.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfbandDesigner {
    target_db: f64,
    max_order: usize,
    grid_resolution: usize,
    response_resolution: usize,
    max_iterations: usize,
    tolerance: f64,
}

impl HalfbandDesigner {
    /// Creates a designer for `target_db` with default search settings.
    pub fn new(target_db: f64) -> Self {
        let defaults = CascadeConfig::default();
        Self {
            target_db,
            ..Self::from_config(&defaults)
        }
    }

    /// Creates a designer from cascade settings.
    pub fn from_config(config: &CascadeConfig) -> Self {
        Self {
            target_db: config.target_stopband_attenuation_db,
            max_order: config.max_order,
            grid_resolution: config.grid_resolution,
            response_resolution: config.response_resolution,
            max_iterations: config.max_remez_iterations,
            tolerance: config.halfband_tolerance,
        }
    }

    /// Sets the order search ceiling.
    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = max_order;
        self
    }

    /// Sets the Remez grid density per unit of oversampling.
    pub fn with_grid_resolution(mut self, grid_resolution: usize) -> Self {
        self.grid_resolution = grid_resolution;
        self
    }

    /// Sets the response points per unit of oversampling.
    pub fn with_response_resolution(mut self, response_resolution: usize) -> Self {
        self.response_resolution = response_resolution;
        self
    }

    /// Attenuation target (dB).
    pub fn target_db(&self) -> f64 {
        self.target_db
    }

    /// Synthesizes the candidate of `order` for `stage`.
    pub fn synthesize(
        &self,
        stage: &StageSpec,
        order: usize,
    ) -> math_audio_fir_design::Result<FilterCandidate> {
        let design = HalfbandSpec::new(order, stage.transition)
            .with_grid_density(stage.grid_density(self.grid_resolution))
            .with_max_iterations(self.max_iterations)
            .design()?;

        Ok(FilterCandidate {
            order,
            tap_count: halfband_tap_count(order),
            coefficients: design.taps,
            iterations: design.iterations,
        })
    }

    /// Worst stopband level (dB) of `candidate` over the stage's stopband.
    pub fn evaluate(
        &self,
        stage: &StageSpec,
        candidate: &FilterCandidate,
    ) -> math_audio_fir_design::Result<f64> {
        frequency_response(
            &candidate.coefficients,
            stage.sample_rate,
            stage.response_points(self.response_resolution),
        )?
        .max_db_in_range(stage.stopband_start_hz, stage.stopband_end_hz)
    }

    /// Finds the lowest order meeting the target for `stage`.
    ///
    /// # Errors
    /// - [`CascadeError::NoFeasibleOrder`] when every order up to the ceiling fails
    /// - [`CascadeError::Fir`] when a candidate cannot be synthesized or
    ///   measured, or fails the halfband structure check
    pub fn design(&self, stage: &StageSpec) -> Result<FilterResult> {
        let multiplier = stage.oversampling_in;
        let fatal = |source: FirError| CascadeError::Fir { multiplier, source };

        let mut trace = Vec::new();
        let mut best = f64::INFINITY;

        for order in 1..=self.max_order {
            let candidate = self.synthesize(stage, order).map_err(fatal)?;

            let attenuation_db = self.evaluate(stage, &candidate).map_err(fatal)?;
            best = best.min(attenuation_db);

            if attenuation_db > self.target_db {
                log::debug!(
                    "{}: order {} ({} taps) reaches {:.2} dB, target {:.2} dB",
                    stage.label(),
                    order,
                    candidate.tap_count,
                    attenuation_db,
                    self.target_db
                );
                trace.push(CandidateRecord {
                    order,
                    outcome: CandidateOutcome::Rejected { attenuation_db },
                });
                continue;
            }

            verify_halfband_structure(&candidate.coefficients, self.tolerance).map_err(fatal)?;
            let compressed_coefficients =
                compress_halfband(&candidate.coefficients).map_err(fatal)?;

            log::info!(
                "{}: accepted order {} ({} taps) at {:.2} dB after {} candidates",
                stage.label(),
                order,
                candidate.tap_count,
                attenuation_db,
                trace.len() + 1
            );
            trace.push(CandidateRecord {
                order,
                outcome: CandidateOutcome::Accepted { attenuation_db },
            });

            return Ok(FilterResult {
                stage: *stage,
                order,
                coefficients: candidate.coefficients,
                compressed_coefficients,
                achieved_stopband_attenuation_db: attenuation_db,
                search_trace: trace,
            });
        }

        Err(CascadeError::NoFeasibleOrder {
            multiplier,
            max_order: self.max_order,
            best_attenuation_db: best,
        })
    }
}
