//! Per-stage band edges.
//!
//! A stage takes the signal from `multiplier` times the base rate down to
//! `multiplier / 2`. Its filter must pass everything below the passband edge
//! and remove everything that would alias back into it, so the stopband runs
//! from `fs / 2 - passband` to `fs / 2`.

use math_audio_fir_design::halfband_band_edges;
use serde::{Deserialize, Serialize};

use crate::config::CascadeConfig;
use crate::error::{CascadeError, Result};

/// Rule choosing the passband edge of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PassbandPolicy {
    /// Nyquist of the base rate
    HalfBaseRate,
    /// Fixed audible bandwidth, used by the stage reducing to 1x
    AudioBand {
        /// Passband edge in Hz
        edge_hz: f64,
    },
}

impl PassbandPolicy {
    /// Policy for the stage whose input multiplier is `multiplier`.
    ///
    /// The last stage (2x to 1x) keeps a fixed audio band; every other stage
    /// keeps the full base-rate band.
    pub fn for_multiplier(multiplier: usize, audio_band_edge_hz: f64) -> Self {
        if multiplier == 2 {
            PassbandPolicy::AudioBand {
                edge_hz: audio_band_edge_hz,
            }
        } else {
            PassbandPolicy::HalfBaseRate
        }
    }

    /// Passband edge in Hz for a given base rate.
    pub fn passband_edge_hz(&self, base_sample_rate: f64) -> f64 {
        match self {
            PassbandPolicy::HalfBaseRate => base_sample_rate / 2.0,
            PassbandPolicy::AudioBand { edge_hz } => *edge_hz,
        }
    }

    /// Short name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            PassbandPolicy::HalfBaseRate => "half base rate",
            PassbandPolicy::AudioBand { .. } => "audio band",
        }
    }
}

/// Band layout of one cascade stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Input oversampling multiplier
    pub oversampling_in: usize,
    /// Output oversampling multiplier (`oversampling_in / 2`)
    pub oversampling_out: usize,
    /// Sample rate the filter runs at (Hz)
    pub sample_rate: f64,
    /// Passband rule in force
    pub policy: PassbandPolicy,
    /// End of the passband (Hz)
    pub passband_edge_hz: f64,
    /// Start of the stopband (Hz)
    pub stopband_start_hz: f64,
    /// End of the stopband, always `sample_rate / 2` (Hz)
    pub stopband_end_hz: f64,
    /// Transition band width normalized to `sample_rate`
    pub transition: f64,
}

impl StageSpec {
    /// Derives the stage for `multiplier` under `policy`.
    ///
    /// # Errors
    /// [`CascadeError::DegenerateStage`] when the transition fraction is not
    /// in (0, 0.5), and [`CascadeError::InvalidOversampling`] when
    /// `multiplier` is not a power of two >= 2.
    pub fn derive(
        multiplier: usize,
        base_sample_rate: f64,
        policy: PassbandPolicy,
    ) -> Result<Self> {
        if multiplier < 2 || !multiplier.is_power_of_two() {
            return Err(CascadeError::InvalidOversampling { factor: multiplier });
        }

        let sample_rate = base_sample_rate * multiplier as f64;
        let passband_edge_hz = policy.passband_edge_hz(base_sample_rate);
        let stopband_end_hz = sample_rate / 2.0;
        let stopband_start_hz = stopband_end_hz - passband_edge_hz;
        let transition = (stopband_end_hz - 2.0 * passband_edge_hz) / sample_rate;

        if !(transition > 0.0 && transition < 0.5) {
            return Err(CascadeError::DegenerateStage {
                multiplier,
                transition,
            });
        }

        Ok(Self {
            oversampling_in: multiplier,
            oversampling_out: multiplier / 2,
            sample_rate,
            policy,
            passband_edge_hz,
            stopband_start_hz,
            stopband_end_hz,
            transition,
        })
    }

    /// Derives the stage for `multiplier` using the configured policy.
    pub fn from_config(multiplier: usize, config: &CascadeConfig) -> Result<Self> {
        let policy = PassbandPolicy::for_multiplier(multiplier, config.audio_band_edge_hz);
        Self::derive(multiplier, config.base_sample_rate, policy)
    }

    /// Normalized (passband, stopband) edges of the halfband filter.
    pub fn normalized_edges(&self) -> (f64, f64) {
        halfband_band_edges(self.transition)
    }

    /// Remez grid density for this stage.
    pub fn grid_density(&self, grid_resolution: usize) -> usize {
        self.oversampling_in * grid_resolution
    }

    /// Number of frequency response points for this stage.
    pub fn response_points(&self, response_resolution: usize) -> usize {
        self.oversampling_in * response_resolution
    }

    /// Label such as `8x -> 4x`.
    pub fn label(&self) -> String {
        format!("{}x -> {}x", self.oversampling_in, self.oversampling_out)
    }
}

/// Oversampling multipliers from `max_oversampling` down to 1, halving each step.
pub fn oversampling_sequence(max_oversampling: usize) -> Vec<usize> {
    std::iter::successors(Some(max_oversampling), |&m| (m > 1).then_some(m / 2)).collect()
}

/// Derives every stage of the cascade, highest rate first.
pub fn derive_stages(config: &CascadeConfig) -> Result<Vec<StageSpec>> {
    oversampling_sequence(config.max_oversampling)
        .into_iter()
        .filter(|&m| m > 1)
        .map(|m| StageSpec::from_config(m, config))
        .collect()
}
