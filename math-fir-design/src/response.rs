//! Frequency response measurement for FIR filters.
//!
//! The response is sampled on a uniform grid from DC up to (but excluding)
//! Nyquist, `f_k = k * fs / (2 * n)` for `k = 0..n`.

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{FirError, Result};

/// Magnitude floor used before converting to decibels.
const MIN_MAGNITUDE: f64 = 1.0e-20;

/// Magnitude response of a filter over a uniform frequency grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    /// Sample rate the grid was built for (Hz)
    pub sample_rate: f64,
    /// Grid frequencies (Hz)
    pub freqs: Array1<f64>,
    /// Magnitude at each grid frequency (dB)
    pub magnitude_db: Array1<f64>,
}

impl FrequencyResponse {
    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    /// Returns `true` if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Minimum and maximum magnitude (dB) over grid points in `[start_hz, end_hz]`.
    ///
    /// # Errors
    /// Returns [`FirError::EmptyStopband`] when no grid point lies in the range.
    pub fn db_range(&self, start_hz: f64, end_hz: f64) -> Result<(f64, f64)> {
        let mut count = 0usize;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (&f, &db) in self.freqs.iter().zip(self.magnitude_db.iter()) {
            if f >= start_hz && f <= end_hz {
                count += 1;
                lo = lo.min(db);
                hi = hi.max(db);
            }
        }
        if count == 0 {
            return Err(FirError::EmptyStopband { start_hz, end_hz });
        }
        Ok((lo, hi))
    }

    /// Worst-case (largest) magnitude in dB over `[start_hz, end_hz]`.
    pub fn max_db_in_range(&self, start_hz: f64, end_hz: f64) -> Result<f64> {
        self.db_range(start_hz, end_hz).map(|(_, hi)| hi)
    }
}

/// Computes the magnitude response of `coeffs` on an `n_points` grid.
///
/// # Arguments
/// * `coeffs` - Filter taps
/// * `sample_rate` - Sample rate in Hz
/// * `n_points` - Number of grid points between DC and Nyquist
pub fn frequency_response(
    coeffs: &[f64],
    sample_rate: f64,
    n_points: usize,
) -> Result<FrequencyResponse> {
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(FirError::InvalidSampleRate { sample_rate });
    }
    if n_points == 0 {
        return Err(FirError::InvalidResolution { points: n_points });
    }

    let freqs =
        Array1::from_shape_fn(n_points, |k| k as f64 * sample_rate / (2.0 * n_points as f64));
    let magnitude_db = Array1::from_shape_fn(n_points, |k| {
        let omega = PI * k as f64 / n_points as f64;
        let h: Complex64 = coeffs
            .iter()
            .enumerate()
            .map(|(j, &c)| c * Complex64::from_polar(1.0, -omega * j as f64))
            .sum();
        20.0 * h.norm().max(MIN_MAGNITUDE).log10()
    });

    Ok(FrequencyResponse {
        sample_rate,
        freqs,
        magnitude_db,
    })
}

/// Worst-case stopband magnitude (dB) of `coeffs` over `[start_hz, end_hz]`.
///
/// More negative is better.
pub fn stopband_attenuation(
    coeffs: &[f64],
    sample_rate: f64,
    n_points: usize,
    start_hz: f64,
    end_hz: f64,
) -> Result<f64> {
    frequency_response(coeffs, sample_rate, n_points)?.max_db_in_range(start_hz, end_hz)
}

/// Magnitude in dB of `coeffs` at a single frequency.
pub fn magnitude_db_at(coeffs: &[f64], sample_rate: f64, freq: f64) -> f64 {
    let omega = 2.0 * PI * freq / sample_rate;
    let h: Complex64 = coeffs
        .iter()
        .enumerate()
        .map(|(j, &c)| c * Complex64::from_polar(1.0, -omega * j as f64))
        .sum();
    20.0 * h.norm().max(MIN_MAGNITUDE).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_grid_excludes_nyquist() {
        let resp = frequency_response(&[1.0], 48000.0, 8).unwrap();
        assert_eq!(resp.len(), 8);
        assert_eq!(resp.freqs[0], 0.0);
        assert!(approx_eq(resp.freqs[1], 3000.0, 1e-9));
        assert!(resp.freqs[7] < 24000.0);
    }

    #[test]
    fn test_unit_impulse_is_flat() {
        let resp = frequency_response(&[1.0], 48000.0, 64).unwrap();
        for &db in resp.magnitude_db.iter() {
            assert!(approx_eq(db, 0.0, 1e-12));
        }
    }

    #[test]
    fn test_two_tap_average() {
        // [0.5, 0.5] has |H| = cos(w/2): 0 dB at DC, -3 dB at fs/4
        let resp = frequency_response(&[0.5, 0.5], 48000.0, 4).unwrap();
        assert!(approx_eq(resp.magnitude_db[0], 0.0, 1e-12));
        assert!(approx_eq(resp.magnitude_db[2], 20.0 * (0.5f64).sqrt().log10(), 1e-9));
    }

    #[test]
    fn test_zero_response_is_floored() {
        let resp = frequency_response(&[0.0, 0.0], 1000.0, 4).unwrap();
        assert!(resp.magnitude_db.iter().all(|&db| approx_eq(db, -400.0, 1e-9)));
    }

    #[test]
    fn test_max_db_in_range() {
        let coeffs = [0.25, 0.5, 0.25];
        let resp = frequency_response(&coeffs, 48000.0, 1024).unwrap();
        let max = resp.max_db_in_range(12000.0, 24000.0).unwrap();
        // |H| = cos^2(w/2), largest at the lower edge
        assert!(approx_eq(max, 20.0 * 0.5f64.log10(), 1e-6));
    }

    #[test]
    fn test_empty_range_fails() {
        let resp = frequency_response(&[1.0], 48000.0, 16).unwrap();
        let err = resp.max_db_in_range(30000.0, 40000.0).unwrap_err();
        assert!(matches!(err, FirError::EmptyStopband { .. }));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(frequency_response(&[1.0], 0.0, 16).unwrap_err().is_response_error());
        assert!(frequency_response(&[1.0], 48000.0, 0).unwrap_err().is_response_error());
    }

    #[test]
    fn test_magnitude_db_at_matches_grid() {
        let coeffs = [0.1, 0.3, 0.3, 0.1];
        let resp = frequency_response(&coeffs, 96000.0, 32).unwrap();
        for k in [0, 5, 17, 31] {
            let single = magnitude_db_at(&coeffs, 96000.0, resp.freqs[k]);
            assert!(approx_eq(single, resp.magnitude_db[k], 1e-9));
        }
    }

    #[test]
    fn test_stopband_attenuation_helper() {
        let att =
            stopband_attenuation(&[0.25, 0.5, 0.25], 48000.0, 1024, 12000.0, 24000.0).unwrap();
        assert!(approx_eq(att, -6.0206, 1e-3));
    }
}
