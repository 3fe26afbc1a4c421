//! Halfband filter cascades for audio oversampling.
//!
//! Given a base sample rate, a maximum oversampling factor and a stopband
//! target, this crate designs one minimum-order equiripple halfband filter for
//! every power-of-two step of the cascade and estimates the cost of running
//! the whole chain.
//!
//! # Example
//!
//! ```rust,no_run
//! use math_audio_oversampling::{CascadeConfigBuilder, design_cascade, format_report};
//!
//! let config = CascadeConfigBuilder::new()
//!     .base_sample_rate(48000.0)
//!     .max_oversampling(8)
//!     .target_stopband_attenuation_db(-60.0)
//!     .build()
//!     .unwrap();
//! let report = design_cascade(&config).unwrap();
//! println!("{}", format_report(&report, false));
//! ```
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

// Module declarations
mod cascade;
mod config;
mod cost;
mod designer;
mod error;
mod report;
mod runtime;
mod stage;

// Re-export error types
pub use error::{CascadeError, Result};

// Re-export configuration
pub use config::{CascadeConfig, CascadeConfigBuilder, MIN_RESOLUTION};

// Re-export stage derivation and search
pub use designer::{
    CandidateOutcome, CandidateRecord, FilterCandidate, FilterResult, HalfbandDesigner,
};
pub use stage::{PassbandPolicy, StageSpec, derive_stages, oversampling_sequence};

// Re-export cascade driver and outputs
pub use cascade::{CascadeDriver, CascadeReport, DriverState, design_cascade};
pub use cost::{CascadeCost, stage_cost};
pub use report::{format_coefficients, format_report};
pub use runtime::{DecimatorCascade, InterpolatorCascade};
