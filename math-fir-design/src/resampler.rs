//! Halfband decimator and interpolator driven by compressed coefficients.
//!
//! Both run the full `4 * order - 1` tap filter but touch only the `order`
//! distinct coefficients: the center tap is the constant 0.5, odd taps are
//! structurally zero and the remaining taps are used pairwise.

use crate::error::{FirError, Result};
use crate::halfband::{CENTER_TAP, halfband_tap_count};

fn check_coefficients(coeffs: &[f64]) -> Result<()> {
    if coeffs.is_empty() {
        return Err(FirError::InvalidCoefficients {
            reason: "at least one coefficient is required".to_string(),
        });
    }
    if let Some(index) = coeffs.iter().position(|c| !c.is_finite()) {
        return Err(FirError::InvalidCoefficients {
            reason: format!("coefficient {index} is not finite"),
        });
    }
    Ok(())
}

/// 2:1 decimator.
#[derive(Debug, Clone)]
pub struct HalfbandDecimator {
    coeffs: Vec<f64>,
    /// Circular buffer holding the last `4 * order - 1` input samples
    history: Vec<f64>,
    /// Index of the newest sample in `history`
    pos: usize,
    /// `true` when the next input completes an output pair
    odd_phase: bool,
}

impl HalfbandDecimator {
    /// Creates a decimator from compressed halfband coefficients.
    pub fn new(coeffs: Vec<f64>) -> Result<Self> {
        check_coefficients(&coeffs)?;
        let len = halfband_tap_count(coeffs.len());
        Ok(Self {
            coeffs,
            history: vec![0.0; len],
            pos: 0,
            odd_phase: false,
        })
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.coeffs.len()
    }

    /// Compressed coefficients.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Group delay in input samples.
    pub fn latency(&self) -> usize {
        2 * self.order() - 1
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
        self.odd_phase = false;
    }

    fn push(&mut self, x: f64) {
        self.pos = (self.pos + 1) % self.history.len();
        self.history[self.pos] = x;
    }

    /// Input sample `delay` steps before the newest one.
    fn delayed(&self, delay: usize) -> f64 {
        let len = self.history.len();
        self.history[(self.pos + len - delay) % len]
    }

    fn convolve(&self) -> f64 {
        let last = self.history.len() - 1;
        let mut y = CENTER_TAP * self.delayed(self.latency());
        for (k, &c) in self.coeffs.iter().enumerate() {
            y += c * (self.delayed(2 * k) + self.delayed(last - 2 * k));
        }
        y
    }

    /// Filters `input` and returns every second output sample.
    ///
    /// Phase is carried across calls, so odd-length blocks are fine.
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len() / 2 + 1);
        for &x in input {
            self.push(x);
            if self.odd_phase {
                output.push(self.convolve());
            }
            self.odd_phase = !self.odd_phase;
        }
        output
    }
}

/// 1:2 interpolator with unity passband gain.
#[derive(Debug, Clone)]
pub struct HalfbandInterpolator {
    coeffs: Vec<f64>,
    /// Circular buffer holding the last `2 * order` input samples
    history: Vec<f64>,
    pos: usize,
}

impl HalfbandInterpolator {
    /// Creates an interpolator from compressed halfband coefficients.
    pub fn new(coeffs: Vec<f64>) -> Result<Self> {
        check_coefficients(&coeffs)?;
        let len = 2 * coeffs.len();
        Ok(Self {
            coeffs,
            history: vec![0.0; len],
            pos: 0,
        })
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.coeffs.len()
    }

    /// Compressed coefficients.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Group delay in output samples.
    pub fn latency(&self) -> usize {
        2 * self.order() - 1
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }

    fn delayed(&self, delay: usize) -> f64 {
        let len = self.history.len();
        self.history[(self.pos + len - delay) % len]
    }

    /// Produces two output samples per input sample.
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(2 * input.len());
        let last = self.history.len() - 1;
        for &x in input {
            self.pos = (self.pos + 1) % self.history.len();
            self.history[self.pos] = x;

            // Polyphase split: even outputs use the even taps, odd outputs
            // only the center tap. Gain 2 restores unity passband.
            let mut even = 0.0;
            for (k, &c) in self.coeffs.iter().enumerate() {
                even += c * (self.delayed(k) + self.delayed(last - k));
            }
            output.push(2.0 * even);
            output.push(2.0 * CENTER_TAP * self.delayed(self.order() - 1));
        }
        output
    }
}
