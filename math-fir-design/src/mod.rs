//! Equiripple FIR design and halfband filtering for audio resampling.
//!
//! This crate provides the numerical building blocks of a multirate
//! oversampling chain: Parks-McClellan synthesis of linear-phase FIR filters,
//! frequency response measurement, halfband structure handling and the 2:1 /
//! 1:2 resamplers that run on compressed halfband coefficients.
//!
//! # Features
//!
//! - **Remez exchange**: odd-length, symmetric equiripple filters from band specifications
//! - **Frequency response**: dB magnitude on a uniform grid, worst case over a band
//! - **Halfband helpers**: band edges, synthesis, structural verification, compression
//! - **Resamplers**: halfband decimator and interpolator
//!
//! # Example
//!
//! ```rust
//! use math_audio_fir_design::{compress_halfband, design_halfband, stopband_attenuation};
//!
//! // 23-tap halfband filter with a transition band of a quarter of the sample rate
//! let taps = design_halfband(6, 0.25, 64, 250).unwrap();
//! let compressed = compress_halfband(&taps).unwrap();
//! assert_eq!(compressed.len(), 6);
//!
//! // Stopband starts at 0.375 fs
//! let att = stopband_attenuation(&taps, 1.0, 1024, 0.375, 0.5).unwrap();
//! assert!(att < -60.0);
//! ```
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

// Module declarations
mod error;
mod halfband;
mod remez;
mod resampler;
mod response;

// Re-export error types
pub use error::{FirError, Result};

// Re-export synthesis
pub use remez::{
    Band, DEFAULT_GRID_DENSITY, DEFAULT_MAX_ITERATIONS, MIN_GRID_DENSITY, RemezDesign, RemezSpec,
    remez_lowpass,
};

// Re-export measurement
pub use response::{FrequencyResponse, frequency_response, magnitude_db_at, stopband_attenuation};

// Re-export halfband handling
pub use halfband::{
    CENTER_TAP, DEFAULT_HALFBAND_TOLERANCE, HALFBAND_CUTOFF, HalfbandSpec, compress_halfband,
    design_halfband, expand_halfband, halfband_band_edges, halfband_tap_count,
    verify_halfband_structure,
};
pub use resampler::{HalfbandDecimator, HalfbandInterpolator};

/// Converts a linear amplitude to decibels.
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.abs().max(1.0e-20).log10()
}

/// Converts decibels to a linear amplitude.
pub fn db_to_amplitude(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}
