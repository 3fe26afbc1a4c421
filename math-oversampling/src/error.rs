//! Error types for cascade design.
//!
//! Configuration errors are raised before any stage runs; the other variants
//! name the stage (by its input oversampling multiplier) that failed.

use math_audio_fir_design::FirError;
use thiserror::Error;

/// Errors that can occur while configuring or designing an oversampling cascade.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Base sample rate is invalid (must be finite and > 0).
    #[error("invalid base sample rate: {sample_rate} Hz (must be > 0)")]
    InvalidSampleRate {
        /// The invalid sample rate
        sample_rate: f64,
    },

    /// Maximum oversampling is not a power of two >= 2.
    #[error("invalid oversampling factor: {factor} (must be a power of two >= 2)")]
    InvalidOversampling {
        /// The invalid factor
        factor: usize,
    },

    /// Attenuation target is not a negative decibel value.
    #[error("invalid stopband attenuation target: {target_db} dB (must be < 0)")]
    InvalidAttenuationTarget {
        /// The invalid target
        target_db: f64,
    },

    /// Fixed audio band edge is not a positive frequency.
    #[error("invalid audio band edge: {edge_hz} Hz (must be > 0)")]
    InvalidAudioBandEdge {
        /// The invalid edge
        edge_hz: f64,
    },

    /// Search ceiling is zero.
    #[error("invalid maximum filter order: {max_order} (must be >= 1)")]
    InvalidMaxOrder {
        /// The invalid ceiling
        max_order: usize,
    },

    /// Grid resolution below the usable minimum.
    #[error("invalid {name}: {value} (must be >= {min})")]
    InvalidResolution {
        /// Name of the offending setting
        name: &'static str,
        /// The invalid value
        value: usize,
        /// Smallest accepted value
        min: usize,
    },

    /// A resolution scaled by the highest oversampling factor does not fit in `usize`.
    #[error("{name} {value} overflows at {max_oversampling}x oversampling")]
    ResolutionOverflow {
        /// Name of the offending setting
        name: &'static str,
        /// The resolution
        value: usize,
        /// The oversampling factor it is scaled by
        max_oversampling: usize,
    },

    /// Remez iteration budget is zero.
    #[error("invalid remez iteration budget: {iterations} (must be >= 1)")]
    InvalidIterations {
        /// The invalid budget
        iterations: usize,
    },

    /// Halfband structure tolerance is not strictly positive.
    #[error("invalid halfband tolerance: {tolerance} (must be > 0)")]
    InvalidTolerance {
        /// The invalid tolerance
        tolerance: f64,
    },

    /// Configuration file could not be read or parsed.
    #[error("failed to load configuration from {path}: {reason}")]
    ConfigFile {
        /// Path of the file
        path: String,
        /// Human-readable reason
        reason: String,
    },

    /// Derived stage has a transition band outside (0, 0.5).
    #[error(
        "degenerate stage {multiplier}x: transition band fraction {transition} is not in (0, 0.5)"
    )]
    DegenerateStage {
        /// Input oversampling multiplier of the stage
        multiplier: usize,
        /// Derived transition band fraction
        transition: f64,
    },

    /// No order up to the ceiling meets the attenuation target.
    #[error(
        "stage {multiplier}x: no filter order up to {max_order} reaches the target (best {best_attenuation_db:.2} dB)"
    )]
    NoFeasibleOrder {
        /// Input oversampling multiplier of the stage
        multiplier: usize,
        /// Search ceiling
        max_order: usize,
        /// Best attenuation among the evaluated candidates (dB)
        best_attenuation_db: f64,
    },

    /// Fatal filter design or measurement failure in a stage.
    #[error("stage {multiplier}x: {source}")]
    Fir {
        /// Input oversampling multiplier of the stage
        multiplier: usize,
        /// Underlying error
        #[source]
        source: FirError,
    },
}

/// A specialized `Result` type for cascade operations.
pub type Result<T> = std::result::Result<T, CascadeError>;

impl CascadeError {
    /// Returns `true` if the configuration was rejected before any stage ran.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CascadeError::InvalidSampleRate { .. }
                | CascadeError::InvalidOversampling { .. }
                | CascadeError::InvalidAttenuationTarget { .. }
                | CascadeError::InvalidAudioBandEdge { .. }
                | CascadeError::InvalidMaxOrder { .. }
                | CascadeError::InvalidResolution { .. }
                | CascadeError::ResolutionOverflow { .. }
                | CascadeError::InvalidIterations { .. }
                | CascadeError::InvalidTolerance { .. }
                | CascadeError::ConfigFile { .. }
        )
    }

    /// Returns `true` for a degenerate stage derivation.
    pub fn is_degenerate_stage(&self) -> bool {
        matches!(self, CascadeError::DegenerateStage { .. })
    }

    /// Returns `true` if the order search was exhausted.
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, CascadeError::NoFeasibleOrder { .. })
    }

    /// Input oversampling multiplier of the failing stage, if any.
    pub fn stage(&self) -> Option<usize> {
        match self {
            CascadeError::DegenerateStage { multiplier, .. }
            | CascadeError::NoFeasibleOrder { multiplier, .. }
            | CascadeError::Fir { multiplier, .. } => Some(*multiplier),
            _ => None,
        }
    }
}
