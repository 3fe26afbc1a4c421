//! Cascade configuration.
//!
//! [`CascadeConfig`] is immutable once built. Use [`CascadeConfigBuilder`] for
//! validated construction or [`CascadeConfig::from_file`] to load JSON; missing
//! fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CascadeError, Result};

/// Smallest accepted grid or response resolution.
pub const MIN_RESOLUTION: usize = 16;

/// Settings for one cascade design run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Base (1x) sample rate in Hz
    pub base_sample_rate: f64,
    /// Highest oversampling factor, a power of two >= 2
    pub max_oversampling: usize,
    /// Required worst-case stopband level in dB (negative)
    pub target_stopband_attenuation_db: f64,
    /// Fixed passband edge of the 2x -> 1x stage (Hz)
    pub audio_band_edge_hz: f64,
    /// Highest filter order tried before giving up on a stage
    pub max_order: usize,
    /// Remez grid density per unit of oversampling
    pub grid_resolution: usize,
    /// Frequency response points per unit of oversampling
    pub response_resolution: usize,
    /// Remez exchange iteration budget per synthesis
    pub max_remez_iterations: usize,
    /// Largest magnitude allowed at structural zero taps
    pub halfband_tolerance: f64,
    /// Design stages concurrently
    pub parallel: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            base_sample_rate: 48000.0,
            max_oversampling: 8,
            target_stopband_attenuation_db: -60.0,
            audio_band_edge_hz: 20000.0,
            max_order: 64,
            grid_resolution: 1024,
            response_resolution: 1024,
            max_remez_iterations: 250,
            halfband_tolerance: 1e-4,
            parallel: false,
        }
    }
}

impl CascadeConfig {
    /// Checks every field.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_sample_rate > 0.0 && self.base_sample_rate.is_finite()) {
            return Err(CascadeError::InvalidSampleRate {
                sample_rate: self.base_sample_rate,
            });
        }
        if self.max_oversampling < 2 || !self.max_oversampling.is_power_of_two() {
            return Err(CascadeError::InvalidOversampling {
                factor: self.max_oversampling,
            });
        }
        if !(self.target_stopband_attenuation_db < 0.0
            && self.target_stopband_attenuation_db.is_finite())
        {
            return Err(CascadeError::InvalidAttenuationTarget {
                target_db: self.target_stopband_attenuation_db,
            });
        }
        if !(self.audio_band_edge_hz > 0.0 && self.audio_band_edge_hz.is_finite()) {
            return Err(CascadeError::InvalidAudioBandEdge {
                edge_hz: self.audio_band_edge_hz,
            });
        }
        if self.max_order == 0 {
            return Err(CascadeError::InvalidMaxOrder {
                max_order: self.max_order,
            });
        }
        for (name, value) in [
            ("grid resolution", self.grid_resolution),
            ("response resolution", self.response_resolution),
        ] {
            if value < MIN_RESOLUTION {
                return Err(CascadeError::InvalidResolution {
                    name,
                    value,
                    min: MIN_RESOLUTION,
                });
            }
            if value.checked_mul(self.max_oversampling).is_none() {
                return Err(CascadeError::ResolutionOverflow {
                    name,
                    value,
                    max_oversampling: self.max_oversampling,
                });
            }
        }
        if self.max_remez_iterations == 0 {
            return Err(CascadeError::InvalidIterations {
                iterations: self.max_remez_iterations,
            });
        }
        if !(self.halfband_tolerance > 0.0 && self.halfband_tolerance.is_finite()) {
            return Err(CascadeError::InvalidTolerance {
                tolerance: self.halfband_tolerance,
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: CascadeConfig =
            serde_json::from_str(contents).map_err(|e| CascadeError::ConfigFile {
                path: String::from("<string>"),
                reason: format!("failed to parse JSON: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CascadeError::ConfigFile {
            path: path.display().to_string(),
            reason: format!("failed to read config file: {}", e),
        })?;

        let config: CascadeConfig =
            serde_json::from_str(&contents).map_err(|e| CascadeError::ConfigFile {
                path: path.display().to_string(),
                reason: format!("failed to parse JSON: {}", e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Number of filtering stages (`log2(max_oversampling)`).
    pub fn stage_count(&self) -> usize {
        self.max_oversampling.trailing_zeros() as usize
    }
}

/// Fluent builder for [`CascadeConfig`].
#[derive(Debug, Clone)]
pub struct CascadeConfigBuilder {
    cfg: CascadeConfig,
}

impl Default for CascadeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            cfg: CascadeConfig::default(),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(cfg: CascadeConfig) -> Self {
        Self { cfg }
    }

    /// Sets the base sample rate (Hz).
    pub fn base_sample_rate(mut self, v: f64) -> Self {
        self.cfg.base_sample_rate = v;
        self
    }
    /// Sets the highest oversampling factor.
    pub fn max_oversampling(mut self, v: usize) -> Self {
        self.cfg.max_oversampling = v;
        self
    }
    /// Sets the stopband attenuation target (dB, negative).
    pub fn target_stopband_attenuation_db(mut self, v: f64) -> Self {
        self.cfg.target_stopband_attenuation_db = v;
        self
    }
    /// Sets the fixed passband edge of the final stage (Hz).
    pub fn audio_band_edge_hz(mut self, v: f64) -> Self {
        self.cfg.audio_band_edge_hz = v;
        self
    }
    /// Sets the order search ceiling.
    pub fn max_order(mut self, v: usize) -> Self {
        self.cfg.max_order = v;
        self
    }
    /// Sets the Remez grid density per unit of oversampling.
    pub fn grid_resolution(mut self, v: usize) -> Self {
        self.cfg.grid_resolution = v;
        self
    }
    /// Sets the response evaluation points per unit of oversampling.
    pub fn response_resolution(mut self, v: usize) -> Self {
        self.cfg.response_resolution = v;
        self
    }
    /// Sets the Remez iteration budget.
    pub fn max_remez_iterations(mut self, v: usize) -> Self {
        self.cfg.max_remez_iterations = v;
        self
    }
    /// Sets the halfband structure tolerance.
    pub fn halfband_tolerance(mut self, v: f64) -> Self {
        self.cfg.halfband_tolerance = v;
        self
    }
    /// Enables or disables stage-parallel design.
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<CascadeConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = CascadeConfigBuilder::new().build().unwrap();
        assert_eq!(cfg, CascadeConfig::default());
        assert_eq!(cfg.stage_count(), 3);
    }

    #[test]
    fn test_builder_sets_fields() {
        let cfg = CascadeConfigBuilder::new()
            .base_sample_rate(44100.0)
            .max_oversampling(16)
            .target_stopband_attenuation_db(-90.0)
            .max_order(100)
            .parallel(true)
            .build()
            .unwrap();
        assert_eq!(cfg.base_sample_rate, 44100.0);
        assert_eq!(cfg.max_oversampling, 16);
        assert_eq!(cfg.target_stopband_attenuation_db, -90.0);
        assert_eq!(cfg.max_order, 100);
        assert!(cfg.parallel);
        assert_eq!(cfg.stage_count(), 4);
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        for factor in [0, 1, 3, 6, 12] {
            let err = CascadeConfigBuilder::new()
                .max_oversampling(factor)
                .build()
                .unwrap_err();
            assert!(matches!(err, CascadeError::InvalidOversampling { .. }));
        }
    }

    #[test]
    fn test_non_negative_target_rejected() {
        for target in [0.0, 6.0, f64::NAN] {
            let err = CascadeConfigBuilder::new()
                .target_stopband_attenuation_db(target)
                .build()
                .unwrap_err();
            assert!(err.is_config_error());
        }
    }

    #[test]
    fn test_bad_sample_rate_rejected() {
        let err = CascadeConfigBuilder::new()
            .base_sample_rate(-48000.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSampleRate { .. }));
    }

    #[test]
    fn test_low_resolution_rejected() {
        let err = CascadeConfigBuilder::new()
            .response_resolution(8)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CascadeError::InvalidResolution {
                name: "response resolution",
                value: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_scaled_resolution_overflow_rejected() {
        let factor = 1usize << (usize::BITS - 8);
        let err = CascadeConfigBuilder::new()
            .max_oversampling(factor)
            .build()
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(matches!(
            err,
            CascadeError::ResolutionOverflow {
                name: "grid resolution",
                value: 1024,
                ..
            }
        ));

        // Small enough resolutions still fit.
        let cfg = CascadeConfigBuilder::new()
            .max_oversampling(factor)
            .grid_resolution(16)
            .response_resolution(16)
            .build()
            .unwrap();
        assert_eq!(cfg.max_oversampling, factor);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let cfg = CascadeConfig::from_json_str(
            r#"{ "base_sample_rate": 44100.0, "target_stopband_attenuation_db": -80.0 }"#,
        )
        .unwrap();
        assert_eq!(cfg.base_sample_rate, 44100.0);
        assert_eq!(cfg.target_stopband_attenuation_db, -80.0);
        assert_eq!(cfg.max_oversampling, 8);
        assert_eq!(cfg.audio_band_edge_hz, 20000.0);
    }

    #[test]
    fn test_json_is_validated() {
        let err = CascadeConfig::from_json_str(r#"{ "max_oversampling": 6 }"#).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidOversampling { factor: 6 }));

        let err = CascadeConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CascadeError::ConfigFile { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = CascadeConfig::from_file("/nonexistent/cascade.json").unwrap_err();
        assert!(err.is_config_error());
    }
}
