//! Error types for FIR design and evaluation.
//!
//! This module provides structured error handling for equiripple synthesis,
//! frequency response measurement and halfband handling, following the
//! Microsoft Rust Guidelines pattern.

use thiserror::Error;

/// Errors that can occur while designing, measuring or running FIR filters.
#[derive(Debug, Error)]
pub enum FirError {
    /// Tap count is unsupported (must be odd and >= 3).
    #[error("invalid tap count: {taps} (must be odd and >= 3)")]
    InvalidTapCount {
        /// The invalid number of taps
        taps: usize,
    },

    /// Band edges are not increasing or fall outside [0, 0.5].
    #[error("invalid band edges: [{low}, {high}] (edges must be non-decreasing within [0, 0.5])")]
    InvalidBandEdges {
        /// Lower edge of the offending band (normalized)
        low: f64,
        /// Upper edge of the offending band (normalized)
        high: f64,
    },

    /// Band weight is not strictly positive.
    #[error("invalid band weight: {weight} (must be > 0)")]
    InvalidWeight {
        /// The invalid weight
        weight: f64,
    },

    /// Dense grid density below the usable minimum.
    #[error("grid density too low: {density} (must be >= {min})")]
    GridDensityTooLow {
        /// The requested density
        density: usize,
        /// Smallest accepted density
        min: usize,
    },

    /// The exchange step found fewer alternation points than required.
    #[error("insufficient extremals at iteration {iteration}: found {found}, need {needed}")]
    InsufficientExtremals {
        /// Exchange iteration at which the search failed
        iteration: usize,
        /// Number of extremals found
        found: usize,
        /// Number of extremals required
        needed: usize,
    },

    /// The exchange step found more local extrema than it can reduce.
    #[error("too many extremals at iteration {iteration} (limit {limit})")]
    TooManyExtremals {
        /// Exchange iteration at which the search failed
        iteration: usize,
        /// Maximum number of extrema the search keeps
        limit: usize,
    },

    /// Remez exchange did not reach equiripple within the iteration budget.
    #[error("remez exchange failed to converge after {iterations} iterations")]
    NoConvergence {
        /// Iterations performed
        iterations: usize,
    },

    /// Sample rate is invalid (must be > 0).
    #[error("invalid sample rate: {sample_rate} Hz (must be > 0)")]
    InvalidSampleRate {
        /// The invalid sample rate value
        sample_rate: f64,
    },

    /// Evaluation grid has no points.
    #[error("invalid response resolution: {points} points (must be > 0)")]
    InvalidResolution {
        /// Requested number of grid points
        points: usize,
    },

    /// No evaluation grid point falls inside the requested stopband.
    #[error("empty stopband: no grid point in [{start_hz}, {end_hz}] Hz")]
    EmptyStopband {
        /// Start of the stopband range in Hz
        start_hz: f64,
        /// End of the stopband range in Hz
        end_hz: f64,
    },

    /// Taps do not have halfband structure.
    #[error("not a halfband filter: tap {index} = {value:e} deviates from {expected} by more than {tolerance:e}")]
    NotHalfband {
        /// Index of the offending tap
        index: usize,
        /// Value found at that index
        value: f64,
        /// Value the halfband structure requires there
        expected: f64,
        /// Tolerance that was exceeded
        tolerance: f64,
    },

    /// Coefficient vector cannot drive a halfband resampler.
    #[error("invalid halfband coefficients: {reason}")]
    InvalidCoefficients {
        /// Human-readable reason
        reason: String,
    },
}

/// A specialized `Result` type for FIR design operations.
pub type Result<T> = std::result::Result<T, FirError>;

impl FirError {
    /// Returns `true` if the Remez exchange itself failed.
    ///
    /// This includes `InsufficientExtremals`, `TooManyExtremals` and
    /// `NoConvergence`.
    pub fn is_synthesis_error(&self) -> bool {
        matches!(
            self,
            FirError::InsufficientExtremals { .. }
                | FirError::TooManyExtremals { .. }
                | FirError::NoConvergence { .. }
        )
    }

    /// Returns `true` if the filter specification was rejected before synthesis.
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            FirError::InvalidTapCount { .. }
                | FirError::InvalidBandEdges { .. }
                | FirError::InvalidWeight { .. }
                | FirError::GridDensityTooLow { .. }
        )
    }

    /// Returns `true` if this is a frequency response measurement error.
    pub fn is_response_error(&self) -> bool {
        matches!(
            self,
            FirError::InvalidSampleRate { .. }
                | FirError::InvalidResolution { .. }
                | FirError::EmptyStopband { .. }
        )
    }
}
