//! Halfband FIR filters.
//!
//! A halfband filter has its cutoff at a quarter of the sample rate with the
//! passband and stopband edges placed symmetrically around it. For an
//! equiripple design of length `4 * order - 1` this forces every odd-indexed
//! tap except the center one to zero and the center tap to 0.5, so only
//! `order` distinct coefficients remain (taps `0, 2, 4, ...` up to the one
//! before the center).

use serde::{Deserialize, Serialize};

use crate::error::{FirError, Result};
use crate::remez::{RemezDesign, RemezSpec};

/// Normalized cutoff of every halfband filter.
pub const HALFBAND_CUTOFF: f64 = 0.25;

/// Value of the center tap.
pub const CENTER_TAP: f64 = 0.5;

/// Default tolerance for [`verify_halfband_structure`].
pub const DEFAULT_HALFBAND_TOLERANCE: f64 = 1e-4;

/// Tap count of a halfband filter of the given order.
pub fn halfband_tap_count(order: usize) -> usize {
    4 * order - 1
}

/// Passband and stopband edges (normalized) for a transition width.
///
/// ```rust
/// use math_audio_fir_design::halfband_band_edges;
///
/// let (pass, stop) = halfband_band_edges(0.25);
/// assert_eq!((pass, stop), (0.125, 0.375));
/// ```
pub fn halfband_band_edges(transition: f64) -> (f64, f64) {
    (
        HALFBAND_CUTOFF - transition / 2.0,
        HALFBAND_CUTOFF + transition / 2.0,
    )
}

/// Parameters for one halfband synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfbandSpec {
    /// Filter order (number of distinct coefficients)
    pub order: usize,
    /// Normalized transition width, strictly between 0 and 0.5
    pub transition: f64,
    /// Dense grid density handed to the Remez exchange
    pub grid_density: usize,
    /// Exchange iteration budget
    pub max_iterations: usize,
}

impl HalfbandSpec {
    /// Creates a specification with the default grid density and iteration budget.
    pub fn new(order: usize, transition: f64) -> Self {
        Self {
            order,
            transition,
            grid_density: crate::remez::DEFAULT_GRID_DENSITY,
            max_iterations: crate::remez::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the dense grid density.
    pub fn with_grid_density(mut self, grid_density: usize) -> Self {
        self.grid_density = grid_density;
        self
    }

    /// Sets the exchange iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Number of taps of the designed filter.
    pub fn tap_count(&self) -> usize {
        halfband_tap_count(self.order)
    }

    /// Synthesizes the full tap sequence.
    pub fn design(&self) -> Result<RemezDesign> {
        if self.order == 0 {
            return Err(FirError::InvalidTapCount { taps: 0 });
        }
        let (pass, stop) = halfband_band_edges(self.transition);
        if !(self.transition > 0.0 && self.transition < 0.5) {
            return Err(FirError::InvalidBandEdges {
                low: pass,
                high: stop,
            });
        }

        RemezSpec::lowpass(pass, stop)
            .with_num_taps(self.tap_count())
            .with_grid_density(self.grid_density)
            .with_max_iterations(self.max_iterations)
            .design()
    }
}

/// Designs an equiripple halfband filter and returns the full taps.
///
/// # Arguments
/// * `order` - Filter order (>= 1); the filter has `4 * order - 1` taps
/// * `transition` - Normalized transition width in (0, 0.5)
/// * `grid_density` - Dense grid density (>= 16)
/// * `max_iterations` - Remez iteration budget
pub fn design_halfband(
    order: usize,
    transition: f64,
    grid_density: usize,
    max_iterations: usize,
) -> Result<Vec<f64>> {
    HalfbandSpec::new(order, transition)
        .with_grid_density(grid_density)
        .with_max_iterations(max_iterations)
        .design()
        .map(|design| design.taps)
}

fn order_of(taps: &[f64]) -> Result<usize> {
    if taps.len() < 3 || taps.len() % 4 != 3 {
        return Err(FirError::InvalidCoefficients {
            reason: format!(
                "{} taps is not a halfband length (expected 4 * order - 1)",
                taps.len()
            ),
        });
    }
    Ok(taps.len().div_ceil(4))
}

/// Checks that `taps` has halfband structure within `tolerance`.
///
/// The taps must be symmetric, the center tap must be 0.5 and every other
/// odd-indexed tap must be zero.
pub fn verify_halfband_structure(taps: &[f64], tolerance: f64) -> Result<()> {
    order_of(taps)?;
    let n = taps.len();
    let center = n / 2;

    for i in 0..center {
        let mirror = taps[n - 1 - i];
        if (taps[i] - mirror).abs() > tolerance {
            return Err(FirError::NotHalfband {
                index: i,
                value: taps[i],
                expected: mirror,
                tolerance,
            });
        }
    }

    if (taps[center] - CENTER_TAP).abs() > tolerance {
        return Err(FirError::NotHalfband {
            index: center,
            value: taps[center],
            expected: CENTER_TAP,
            tolerance,
        });
    }

    for i in (1..n).step_by(2).filter(|&i| i != center) {
        if taps[i].abs() > tolerance {
            return Err(FirError::NotHalfband {
                index: i,
                value: taps[i],
                expected: 0.0,
                tolerance,
            });
        }
    }

    Ok(())
}

/// Extracts the `order` distinct coefficients (taps `0, 2, ..., 2 * order - 2`).
pub fn compress_halfband(taps: &[f64]) -> Result<Vec<f64>> {
    let order = order_of(taps)?;
    Ok(taps.iter().step_by(2).take(order).copied().collect())
}

/// Rebuilds the full tap sequence from compressed coefficients.
pub fn expand_halfband(compressed: &[f64]) -> Vec<f64> {
    let order = compressed.len();
    if order == 0 {
        return Vec::new();
    }
    let n = halfband_tap_count(order);
    let mut taps = vec![0.0; n];
    for (k, &c) in compressed.iter().enumerate() {
        taps[2 * k] = c;
        taps[n - 1 - 2 * k] = c;
    }
    taps[n / 2] = CENTER_TAP;
    taps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn assert_coeffs(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
            assert!(approx_eq(a, e, tol), "coefficient {i}: {a} vs {e}");
        }
    }

    #[test]
    fn test_band_edges_are_symmetric_about_quarter() {
        let (pass, stop) = halfband_band_edges(0.08);
        assert!(approx_eq(pass + stop, 0.5, 1e-15));
        assert!(approx_eq(stop - pass, 0.08, 1e-15));
    }

    #[test]
    fn test_tap_count() {
        assert_eq!(halfband_tap_count(1), 3);
        assert_eq!(halfband_tap_count(6), 23);
        assert_eq!(HalfbandSpec::new(12, 0.1).tap_count(), 47);
    }

    #[test]
    fn test_reference_order_1() {
        let taps = design_halfband(1, 0.49609375, 262144, 250).unwrap();
        let compressed = compress_halfband(&taps).unwrap();
        assert_coeffs(&compressed, &[0.2500094126245982], 1e-6);
    }

    #[test]
    fn test_reference_order_2() {
        let taps = design_halfband(2, 0.46875, 32768, 250).unwrap();
        let compressed = compress_halfband(&taps).unwrap();
        assert_coeffs(
            &compressed,
            &[-0.03147685303471284, 0.2814757608962846],
            1e-5,
        );
    }

    #[test]
    fn test_reference_order_3() {
        let taps = design_halfband(3, 0.375, 8192, 250).unwrap();
        let compressed = compress_halfband(&taps).unwrap();
        assert_coeffs(
            &compressed,
            &[0.0071174511083665504, -0.05231169587073679, 0.2952039278517196],
            1e-5,
        );
    }

    #[test]
    fn test_reference_order_6() {
        let taps = design_halfband(6, 0.25, 4096, 250).unwrap();
        verify_halfband_structure(&taps, DEFAULT_HALFBAND_TOLERANCE).unwrap();
        let compressed = compress_halfband(&taps).unwrap();
        assert_coeffs(
            &compressed,
            &[
                -0.00034696754642661164,
                0.0025132384125000433,
                -0.010158904818112154,
                0.030552323579531526,
                -0.08198144832535462,
                0.3094188471351897,
            ],
            1e-5,
        );
    }

    #[test]
    fn test_designed_filter_is_halfband() {
        let taps = design_halfband(4, 0.2, 64, 250).unwrap();
        assert_eq!(taps.len(), 15);
        verify_halfband_structure(&taps, DEFAULT_HALFBAND_TOLERANCE).unwrap();
        assert!(approx_eq(taps[7], 0.5, 1e-4));
    }

    #[test]
    fn test_degenerate_transition_rejected() {
        for transition in [0.0, -0.1, 0.5, 0.7] {
            let err = design_halfband(2, transition, 64, 250).unwrap_err();
            assert!(err.is_spec_error(), "transition {transition}");
        }
    }

    #[test]
    fn test_zero_order_rejected() {
        let err = design_halfband(0, 0.2, 64, 250).unwrap_err();
        assert!(matches!(err, FirError::InvalidTapCount { taps: 0 }));
    }

    #[test]
    fn test_compress_takes_even_taps() {
        let taps = [1.0, 0.0, 2.0, 0.0, 3.0, 0.5, 3.0, 0.0, 2.0, 0.0, 1.0];
        assert_eq!(compress_halfband(&taps).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_expand_inverts_compress() {
        let compressed = vec![-0.03, 0.28];
        let taps = expand_halfband(&compressed);
        assert_eq!(taps, vec![-0.03, 0.0, 0.28, 0.5, 0.28, 0.0, -0.03]);
        assert_eq!(compress_halfband(&taps).unwrap(), compressed);
        assert!(expand_halfband(&[]).is_empty());
    }

    #[test]
    fn test_bad_length_rejected() {
        let err = compress_halfband(&[0.1, 0.5, 0.1, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, FirError::InvalidCoefficients { .. }));
    }

    #[test]
    fn test_verify_reports_offending_tap() {
        let mut taps = expand_halfband(&[0.01, -0.06, 0.3]);
        taps[3] = 0.01;
        taps[7] = 0.01;
        match verify_halfband_structure(&taps, 1e-4) {
            Err(FirError::NotHalfband { index, expected, .. }) => {
                assert_eq!(index, 3);
                assert_eq!(expected, 0.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_verify_detects_asymmetry() {
        let mut taps = expand_halfband(&[0.01, 0.3]);
        taps[0] = 0.02;
        let err = verify_halfband_structure(&taps, 1e-4).unwrap_err();
        assert!(matches!(err, FirError::NotHalfband { index: 0, .. }));
    }
}
