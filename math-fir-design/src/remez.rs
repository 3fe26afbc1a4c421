//! Parks-McClellan equiripple FIR design.
//!
//! Implements the Remez exchange algorithm over a dense frequency grid and
//! recovers the impulse response by frequency sampling of the optimal
//! amplitude response. Only symmetric, odd-length (type I) filters with
//! piecewise-constant bands are produced: lowpass, highpass, bandpass and
//! multiband magnitude targets.
//!
//! Frequencies are normalized to the sample rate (0 to 0.5).
//!
//! ## Example
//!
//! ```rust
//! use math_audio_fir_design::RemezSpec;
//!
//! // 31-tap lowpass, passband 0-0.2, stopband 0.3-0.5
//! let design = RemezSpec::lowpass(0.2, 0.3)
//!     .with_num_taps(31)
//!     .design()
//!     .expect("valid specification");
//! assert_eq!(design.taps.len(), 31);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{FirError, Result};

/// Default dense grid density (grid points per extremal).
pub const DEFAULT_GRID_DENSITY: usize = 16;

/// Smallest grid density accepted.
pub const MIN_GRID_DENSITY: usize = 16;

/// Default exchange iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Relative spread of the extremal errors below which the design is equiripple.
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Barycentric denominators are clamped to this magnitude.
const MIN_BARYCENTRIC_DENOM: f64 = 1e-5;

/// One band of a piecewise-constant magnitude target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower band edge (normalized, 0 to 0.5)
    pub low: f64,
    /// Upper band edge (normalized, 0 to 0.5)
    pub high: f64,
    /// Desired amplitude over the band
    pub desired: f64,
    /// Error weight over the band
    pub weight: f64,
}

impl Band {
    /// Creates a band with unit weight.
    pub fn new(low: f64, high: f64, desired: f64) -> Self {
        Self {
            low,
            high,
            desired,
            weight: 1.0,
        }
    }
}

/// Specification for an equiripple design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemezSpec {
    num_taps: usize,
    bands: Vec<Band>,
    grid_density: usize,
    max_iterations: usize,
}

/// Output of a converged Remez exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemezDesign {
    /// Impulse response, symmetric about the center tap
    pub taps: Vec<f64>,
    /// Exchange iterations performed
    pub iterations: usize,
    /// Weighted ripple magnitude of the final alternation (delta)
    pub deviation: f64,
    /// Number of points on the dense grid
    pub grid_size: usize,
}

impl RemezSpec {
    /// Creates a specification from explicit bands.
    pub fn new(bands: Vec<Band>) -> Self {
        Self {
            num_taps: 31,
            bands,
            grid_density: DEFAULT_GRID_DENSITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Creates a lowpass specification (unit passband, zero stopband, equal weights).
    ///
    /// # Arguments
    /// * `passband_edge` - End of passband (normalized, 0 to 0.5)
    /// * `stopband_edge` - Start of stopband (normalized, 0 to 0.5)
    pub fn lowpass(passband_edge: f64, stopband_edge: f64) -> Self {
        Self::new(vec![
            Band::new(0.0, passband_edge, 1.0),
            Band::new(stopband_edge, 0.5, 0.0),
        ])
    }

    /// Creates a highpass specification (zero stopband, unit passband).
    pub fn highpass(stopband_edge: f64, passband_edge: f64) -> Self {
        Self::new(vec![
            Band::new(0.0, stopband_edge, 0.0),
            Band::new(passband_edge, 0.5, 1.0),
        ])
    }

    /// Sets the number of filter taps (odd, >= 3).
    pub fn with_num_taps(mut self, num_taps: usize) -> Self {
        self.num_taps = num_taps;
        self
    }

    /// Sets passband and stopband weights.
    ///
    /// Bands whose desired amplitude is above 0.5 take the passband weight.
    pub fn with_weights(mut self, passband_weight: f64, stopband_weight: f64) -> Self {
        for band in &mut self.bands {
            band.weight = if band.desired > 0.5 {
                passband_weight
            } else {
                stopband_weight
            };
        }
        self
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

    /// Number of taps the design will produce.
    pub fn num_taps(&self) -> usize {
        self.num_taps
    }

    /// Band layout.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Dense grid density.
    pub fn grid_density(&self) -> usize {
        self.grid_density
    }

    fn validate(&self) -> Result<()> {
        if self.num_taps < 3 || self.num_taps.is_multiple_of(2) {
            return Err(FirError::InvalidTapCount {
                taps: self.num_taps,
            });
        }
        if self.grid_density < MIN_GRID_DENSITY {
            return Err(FirError::GridDensityTooLow {
                density: self.grid_density,
                min: MIN_GRID_DENSITY,
            });
        }
        if self.bands.is_empty() {
            return Err(FirError::InvalidBandEdges {
                low: f64::NAN,
                high: f64::NAN,
            });
        }
        let mut previous_high = 0.0;
        for band in &self.bands {
            let ordered = band.low >= previous_high && band.low < band.high;
            if !ordered || band.high > 0.5 || !band.low.is_finite() {
                return Err(FirError::InvalidBandEdges {
                    low: band.low,
                    high: band.high,
                });
            }
            if !(band.weight > 0.0 && band.weight.is_finite()) {
                return Err(FirError::InvalidWeight {
                    weight: band.weight,
                });
            }
            previous_high = band.high;
        }
        Ok(())
    }

    /// Runs the exchange and returns the impulse response.
    ///
    /// # Errors
    /// Specification errors are reported before any work is done. The
    /// exchange itself fails with `InsufficientExtremals`, `TooManyExtremals`
    /// or `NoConvergence` (see [`FirError::is_synthesis_error`]).
    pub fn design(&self) -> Result<RemezDesign> {
        self.validate()?;

        let n = self.num_taps;
        // Cosine terms in the amplitude response; r + 1 alternation points.
        let r = n.div_ceil(2);
        let grid = DenseGrid::new(&self.bands, r, self.grid_density);
        if grid.len() < r + 1 {
            return Err(FirError::InsufficientExtremals {
                iteration: 0,
                found: grid.len(),
                needed: r + 1,
            });
        }

        let mut ext: Vec<usize> = (0..=r).map(|i| i * (grid.len() - 1) / r).collect();
        let mut iterations = 0;
        let mut converged = false;
        for iteration in 0..self.max_iterations {
            let interpolant = Interpolant::new(&ext, &grid);
            let error = grid.weighted_error(&interpolant);
            ext = search_extremals(&error, r, iteration)?;
            iterations = iteration + 1;
            if is_equiripple(&ext, &error) {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(FirError::NoConvergence { iterations });
        }

        let interpolant = Interpolant::new(&ext, &grid);
        let half = (n - 1) / 2;
        let amplitudes: Vec<f64> = (0..=half)
            .map(|i| interpolant.amplitude(i as f64 / n as f64))
            .collect();
        let taps = frequency_sample(&amplitudes, n);

        log::debug!(
            "remez: {} taps converged in {} iterations, delta = {:.3e}, grid = {}",
            n,
            iterations,
            interpolant.delta.abs(),
            grid.len()
        );

        Ok(RemezDesign {
            taps,
            iterations,
            deviation: interpolant.delta.abs(),
            grid_size: grid.len(),
        })
    }
}

/// Designs an equiripple lowpass filter.
///
/// # Arguments
/// * `num_taps` - Number of filter taps (odd, >= 3)
/// * `passband_edge` - End of passband (normalized frequency, 0 to 0.5)
/// * `stopband_edge` - Start of stopband (normalized frequency)
/// * `grid_density` - Dense grid density (>= 16)
pub fn remez_lowpass(
    num_taps: usize,
    passband_edge: f64,
    stopband_edge: f64,
    grid_density: usize,
) -> Result<Vec<f64>> {
    RemezSpec::lowpass(passband_edge, stopband_edge)
        .with_num_taps(num_taps)
        .with_grid_density(grid_density)
        .design()
        .map(|design| design.taps)
}

/// Dense frequency grid with the desired response and weight sampled on it.
struct DenseGrid {
    freqs: Vec<f64>,
    desired: Vec<f64>,
    weights: Vec<f64>,
}

impl DenseGrid {
    fn new(bands: &[Band], r: usize, density: usize) -> Self {
        let delf = 0.5 / (density as f64 * r as f64);
        let mut grid = DenseGrid {
            freqs: Vec::new(),
            desired: Vec::new(),
            weights: Vec::new(),
        };

        for band in bands {
            let points = ((band.high - band.low) / delf + 0.5) as usize;
            let mut f = band.low;
            for _ in 0..points {
                grid.freqs.push(f);
                grid.desired.push(band.desired);
                grid.weights.push(band.weight);
                f += delf;
            }
            // Band edges are always on the grid.
            if points > 0
                && let Some(last) = grid.freqs.last_mut()
            {
                *last = band.high;
            }
        }
        grid
    }

    fn len(&self) -> usize {
        self.freqs.len()
    }

    fn weighted_error(&self, interpolant: &Interpolant) -> Vec<f64> {
        self.freqs
            .iter()
            .zip(self.desired.iter().zip(&self.weights))
            .map(|(&f, (&d, &w))| w * (d - interpolant.amplitude(f)))
            .collect()
    }
}

/// Barycentric Lagrange form of the trial amplitude response.
struct Interpolant {
    /// Nodes, `cos(2 pi f)` at the extremal frequencies
    x: Vec<f64>,
    /// Barycentric weights
    ad: Vec<f64>,
    /// Amplitude at each node
    y: Vec<f64>,
    /// Signed alternation ripple
    delta: f64,
}

impl Interpolant {
    fn new(ext: &[usize], grid: &DenseGrid) -> Self {
        let r = ext.len() - 1;
        let x: Vec<f64> = ext
            .iter()
            .map(|&i| (2.0 * PI * grid.freqs[i]).cos())
            .collect();

        // Interleaved products keep the partial products near unity.
        let stride = (r - 1) / 15 + 1;
        let ad: Vec<f64> = (0..=r)
            .map(|i| {
                let mut denom = 1.0;
                for start in 0..stride {
                    for k in (start..=r).step_by(stride) {
                        if k != i {
                            denom *= 2.0 * (x[i] - x[k]);
                        }
                    }
                }
                if denom.abs() < MIN_BARYCENTRIC_DENOM {
                    denom = MIN_BARYCENTRIC_DENOM;
                }
                1.0 / denom
            })
            .collect();

        let mut numer = 0.0;
        let mut denom = 0.0;
        let mut sign = 1.0;
        for (i, &e) in ext.iter().enumerate() {
            numer += ad[i] * grid.desired[e];
            denom += sign * ad[i] / grid.weights[e];
            sign = -sign;
        }
        let delta = numer / denom;

        let mut sign = 1.0;
        let y = ext
            .iter()
            .map(|&e| {
                let value = grid.desired[e] - sign * delta / grid.weights[e];
                sign = -sign;
                value
            })
            .collect();

        Self { x, ad, y, delta }
    }

    /// Amplitude response at normalized frequency `freq`.
    ///
    /// Only an exact node hit returns the node value: on dense grids many
    /// neighbours of a node lie within any fixed distance of it in
    /// `cos(2 pi f)`, and snapping them would flatten the error curve.
    fn amplitude(&self, freq: f64) -> f64 {
        let xc = (2.0 * PI * freq).cos();
        let mut numer = 0.0;
        let mut denom = 0.0;
        for ((&xi, &ai), &yi) in self.x.iter().zip(&self.ad).zip(&self.y) {
            let diff = xc - xi;
            if diff == 0.0 {
                return yi;
            }
            let c = ai / diff;
            denom += c;
            numer += c * yi;
        }
        numer / denom
    }
}

/// Locates the alternating extrema of the error curve.
///
/// A plateau counts once, at its last point; a plateau that runs into the
/// upper end of the grid is kept as the last extremum.
///
/// When more than `r + 1` extrema are found, adjacent non-alternating ones
/// are removed first, then the smallest, then the smaller of the two ends.
fn search_extremals(error: &[f64], r: usize, iteration: usize) -> Result<Vec<usize>> {
    let n = error.len();
    let limit = 2 * r;
    let mut found: Vec<usize> = Vec::with_capacity(limit);

    if (error[0] > 0.0 && error[0] > error[1]) || (error[0] < 0.0 && error[0] < error[1]) {
        found.push(0);
    }

    for i in 1..n - 1 {
        let is_max = error[i] >= error[i - 1] && error[i] > error[i + 1] && error[i] > 0.0;
        let is_min = error[i] <= error[i - 1] && error[i] < error[i + 1] && error[i] < 0.0;
        if is_max || is_min {
            if found.len() >= limit {
                return Err(FirError::TooManyExtremals { iteration, limit });
            }
            found.push(i);
        }
    }

    let last = n - 1;
    if (error[last] > 0.0 && error[last] >= error[last - 1])
        || (error[last] < 0.0 && error[last] <= error[last - 1])
    {
        if found.len() >= limit {
            return Err(FirError::TooManyExtremals { iteration, limit });
        }
        found.push(last);
    }

    if found.len() < r + 1 {
        return Err(FirError::InsufficientExtremals {
            iteration,
            found: found.len(),
            needed: r + 1,
        });
    }

    let mut extra = found.len() - (r + 1);
    while extra > 0 {
        let k = found.len();
        let mut up = error[found[0]] > 0.0;
        let mut smallest = 0;
        let mut alternating = true;
        for j in 1..k {
            if error[found[j]].abs() < error[found[smallest]].abs() {
                smallest = j;
            }
            if up && error[found[j]] < 0.0 {
                up = false;
            } else if !up && error[found[j]] > 0.0 {
                up = true;
            } else {
                alternating = false;
                break;
            }
        }

        if alternating && extra == 1 {
            smallest = if error[found[k - 1]].abs() < error[found[0]].abs() {
                k - 1
            } else {
                0
            };
        }

        found.remove(smallest);
        extra -= 1;
    }

    Ok(found)
}

fn is_equiripple(ext: &[usize], error: &[f64]) -> bool {
    let (min, max) = ext
        .iter()
        .map(|&i| error[i].abs())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), e| (lo.min(e), hi.max(e)));
    (max - min) / max < CONVERGENCE_THRESHOLD
}

/// Inverse DFT of a type I amplitude response sampled at `k / n`, `k = 0..=(n-1)/2`.
fn frequency_sample(amplitudes: &[f64], n: usize) -> Vec<f64> {
    let m = (n - 1) as f64 / 2.0;
    (0..n)
        .map(|idx| {
            let x = 2.0 * PI * (idx as f64 - m) / n as f64;
            let mut value = amplitudes[0];
            for (k, &a) in amplitudes.iter().enumerate().skip(1) {
                value += 2.0 * a * (x * k as f64).cos();
            }
            value / n as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Zero-phase amplitude of a symmetric odd-length filter.
    fn amplitude(taps: &[f64], f: f64) -> f64 {
        let m = (taps.len() - 1) as f64 / 2.0;
        taps.iter()
            .enumerate()
            .map(|(n, &h)| h * (2.0 * PI * f * (n as f64 - m)).cos())
            .sum()
    }

    fn max_deviation(taps: &[f64], low: f64, high: f64, desired: f64) -> f64 {
        (0..=400)
            .map(|i| low + (high - low) * i as f64 / 400.0)
            .map(|f| (amplitude(taps, f) - desired).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_remez_spec_lowpass() {
        let spec = RemezSpec::lowpass(0.2, 0.3);
        assert_eq!(spec.bands().len(), 2);
        assert_eq!(spec.bands()[0].desired, 1.0);
        assert_eq!(spec.bands()[1].desired, 0.0);
        assert_eq!(spec.bands()[1].high, 0.5);
    }

    #[test]
    fn test_with_weights_follows_desired_level() {
        let spec = RemezSpec::highpass(0.2, 0.3).with_weights(1.0, 10.0);
        assert_eq!(spec.bands()[0].weight, 10.0);
        assert_eq!(spec.bands()[1].weight, 1.0);
    }

    #[test]
    fn test_lowpass_is_symmetric() {
        let design = RemezSpec::lowpass(0.2, 0.3)
            .with_num_taps(31)
            .design()
            .unwrap();

        assert_eq!(design.taps.len(), 31);
        for i in 0..15 {
            assert!((design.taps[i] - design.taps[30 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_lowpass_is_equiripple() {
        let design = RemezSpec::lowpass(0.2, 0.3)
            .with_num_taps(31)
            .with_grid_density(32)
            .design()
            .unwrap();

        let pass = max_deviation(&design.taps, 0.0, 0.2, 1.0);
        let stop = max_deviation(&design.taps, 0.3, 0.5, 0.0);

        // Equal weights: both bands ripple by delta.
        assert!(pass <= design.deviation * 1.05, "pass {pass} vs {}", design.deviation);
        assert!(stop <= design.deviation * 1.05, "stop {stop} vs {}", design.deviation);
        assert!(pass >= design.deviation * 0.95);
        assert!(stop >= design.deviation * 0.95);
    }

    #[test]
    fn test_weighted_design_trades_ripple() {
        let design = RemezSpec::lowpass(0.2, 0.3)
            .with_num_taps(31)
            .with_weights(1.0, 10.0)
            .design()
            .unwrap();

        let pass = max_deviation(&design.taps, 0.0, 0.2, 1.0);
        let stop = max_deviation(&design.taps, 0.3, 0.5, 0.0);
        let ratio = pass / stop;
        assert!(ratio > 8.0 && ratio < 12.0, "ratio was {ratio}");
    }

    #[test]
    fn test_more_taps_reduce_deviation() {
        let short = RemezSpec::lowpass(0.2, 0.3).with_num_taps(15).design().unwrap();
        let long = RemezSpec::lowpass(0.2, 0.3).with_num_taps(45).design().unwrap();
        assert!(long.deviation < short.deviation);
    }

    #[test]
    fn test_remez_lowpass_helper() {
        let taps = remez_lowpass(21, 0.1, 0.2, 16).unwrap();
        let dc: f64 = taps.iter().sum();
        assert_eq!(taps.len(), 21);
        assert!((dc - 1.0).abs() < 0.05, "DC gain was {dc}");
    }

    #[test]
    fn test_even_tap_count_rejected() {
        let err = RemezSpec::lowpass(0.2, 0.3).with_num_taps(30).design().unwrap_err();
        assert!(matches!(err, FirError::InvalidTapCount { taps: 30 }));
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let err = RemezSpec::lowpass(0.3, 0.2).with_num_taps(31).design().unwrap_err();
        assert!(err.is_spec_error());
    }

    #[test]
    fn test_low_grid_density_rejected() {
        let err = RemezSpec::lowpass(0.2, 0.3)
            .with_grid_density(8)
            .design()
            .unwrap_err();
        assert!(matches!(err, FirError::GridDensityTooLow { density: 8, .. }));
    }

    #[test]
    fn test_zero_iterations_do_not_converge() {
        let err = RemezSpec::lowpass(0.2, 0.3)
            .with_max_iterations(0)
            .design()
            .unwrap_err();
        assert!(err.is_synthesis_error());
    }

    #[test]
    fn test_search_keeps_plateau_at_upper_end() {
        let error = [0.5, 0.2, -0.3, 0.1, -0.4, 0.4, 0.4, 0.4];
        let ext = search_extremals(&error, 4, 0).unwrap();
        assert_eq!(ext, vec![0, 2, 3, 4, 7]);
    }

    #[test]
    fn test_search_counts_inner_plateau_once() {
        let error = [0.5, 0.5, 0.5, -0.2, 0.3, 0.3, -0.1];
        let ext = search_extremals(&error, 3, 0).unwrap();
        assert_eq!(ext, vec![2, 3, 5, 6]);
    }

    #[test]
    fn test_amplitude_hits_nodes_exactly() {
        let bands = [Band::new(0.0, 0.1, 1.0), Band::new(0.4, 0.5, 0.0)];
        let grid = DenseGrid::new(&bands, 2, 8192);
        let last = grid.len() - 1;
        let interpolant = Interpolant::new(&[0, last / 2, last], &grid);

        assert_eq!(interpolant.amplitude(grid.freqs[last]), interpolant.y[2]);
        // The neighbour of a node is interpolated, not snapped onto it.
        assert_ne!(interpolant.amplitude(grid.freqs[last - 1]), interpolant.y[2]);
    }

    #[test]
    fn test_dense_grid_halfband_lengths_converge() {
        // Quarter-band transition at the density used for 8x stages
        let expected_db = [-39.07, -55.95, -72.41, -88.63, -104.70];
        for (order, &db) in (2..=6).zip(&expected_db) {
            let n = 4 * order - 1;
            let design = RemezSpec::lowpass(0.125, 0.375)
                .with_num_taps(n)
                .with_grid_density(8192)
                .with_max_iterations(250)
                .design()
                .unwrap_or_else(|e| panic!("{n} taps: {e}"));

            let stop = max_deviation(&design.taps, 0.375, 0.5, 0.0);
            let stop_db = 20.0 * stop.log10();
            assert!((stop_db - db).abs() < 0.1, "{n} taps: {stop_db} dB vs {db} dB");
        }
    }

    #[test]
    fn test_frequency_sample_constant_response() {
        // Flat unit amplitude is a unit impulse at the center tap.
        let taps = frequency_sample(&[1.0; 4], 7);
        for (i, &h) in taps.iter().enumerate() {
            let expected = if i == 3 { 1.0 } else { 0.0 };
            assert!((h - expected).abs() < 1e-12, "tap {i} = {h}");
        }
    }
}
