//! Digitization configuration.

use crate::partition::{DetectorType, RpcAboveClassifier};
use crate::threshold::WindowedThresholdClusterer;
use serde::{Deserialize, Serialize};
use simdigi_core::{Energy, Error, Result, Schema, Time, Units};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Hit field whose energy is accumulated inside a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyField {
    /// Deposited energy.
    #[default]
    Deposit,
    /// Particle energy.
    E,
}

/// Whether a hit exactly `spacing` after the window start is inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowBound {
    /// `t <= t0 + spacing`.
    #[default]
    Inclusive,
    /// `t < t0 + spacing`.
    Exclusive,
}

/// How many hits an emitted pulse consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumePolicy {
    /// The whole window; every hit is consumed exactly once.
    #[default]
    Window,
    /// Only the hits up to and including the threshold crossing.
    Prefix,
}

/// Energy thresholds per detector type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Scintillator threshold in MeV.
    pub scintillator_mev: f64,
    /// RPC threshold in MeV.
    pub rpc_mev: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            scintillator_mev: 0.65,
            rpc_mev: 0.17e-3, // 0.17 keV
        }
    }
}

impl Thresholds {
    /// Threshold applied to channels of the given type.
    #[must_use]
    pub fn for_type(&self, detector_type: DetectorType) -> Energy {
        match detector_type {
            DetectorType::Scintillator => Energy::from_mev(self.scintillator_mev),
            DetectorType::Rpc => Energy::from_mev(self.rpc_mev),
        }
    }
}

/// Configuration for digitizing events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitizationConfig {
    /// Clustering window length in nanoseconds.
    pub spacing_ns: f64,
    /// Energy thresholds per detector type.
    pub thresholds: Thresholds,
    /// Channels with an ID above this value are RPCs.
    pub rpc_channel_min: i64,
    /// Energy field that is accumulated.
    pub energy_field: EnergyField,
    /// Upper window bound convention.
    pub window_bound: WindowBound,
    /// Hits consumed by an emitted pulse.
    pub consume: ConsumePolicy,
    /// Units of the input records.
    pub units: Units,
}

impl Default for DigitizationConfig {
    fn default() -> Self {
        Self {
            spacing_ns: 20.0,
            thresholds: Thresholds::default(),
            rpc_channel_min: 1000,
            energy_field: EnergyField::default(),
            window_bound: WindowBound::default(),
            consume: ConsumePolicy::default(),
            units: Units::default(),
        }
    }
}

impl DigitizationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window spacing.
    #[must_use]
    pub fn with_spacing_ns(mut self, spacing_ns: f64) -> Self {
        self.spacing_ns = spacing_ns;
        self
    }

    /// Sets the scintillator threshold.
    #[must_use]
    pub fn with_scintillator_threshold_mev(mut self, mev: f64) -> Self {
        self.thresholds.scintillator_mev = mev;
        self
    }

    /// Sets the RPC threshold.
    #[must_use]
    pub fn with_rpc_threshold_mev(mut self, mev: f64) -> Self {
        self.thresholds.rpc_mev = mev;
        self
    }

    /// Sets the RPC channel boundary.
    #[must_use]
    pub fn with_rpc_channel_min(mut self, rpc_channel_min: i64) -> Self {
        self.rpc_channel_min = rpc_channel_min;
        self
    }

    /// Sets the accumulated energy field.
    #[must_use]
    pub fn with_energy_field(mut self, energy_field: EnergyField) -> Self {
        self.energy_field = energy_field;
        self
    }

    /// Sets the window bound convention.
    #[must_use]
    pub fn with_window_bound(mut self, window_bound: WindowBound) -> Self {
        self.window_bound = window_bound;
        self
    }

    /// Sets the consumption policy.
    #[must_use]
    pub fn with_consume(mut self, consume: ConsumePolicy) -> Self {
        self.consume = consume;
        self
    }

    /// Sets the input units.
    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that spacing and thresholds are usable.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !self.spacing_ns.is_finite() || self.spacing_ns <= 0.0 {
            return Err(Error::ConfigError(format!(
                "spacing must be a positive number of nanoseconds, got {}",
                self.spacing_ns
            )));
        }
        for (name, value) in [
            ("scintillator", self.thresholds.scintillator_mev),
            ("rpc", self.thresholds.rpc_mev),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{name} threshold must be a non-negative energy, got {value} MeV"
                )));
            }
        }
        Ok(())
    }

    /// Window spacing as a typed time.
    #[must_use]
    pub fn spacing(&self) -> Time {
        Time::from_ns(self.spacing_ns)
    }

    /// The input schema with this configuration's units.
    #[must_use]
    pub fn schema(&self) -> Schema {
        Schema::default().with_units(self.units)
    }

    /// The clusterer described by this configuration.
    #[must_use]
    pub fn clusterer(&self) -> WindowedThresholdClusterer {
        WindowedThresholdClusterer::new(self.spacing())
            .with_energy_field(self.energy_field)
            .with_window_bound(self.window_bound)
            .with_consume(self.consume)
    }

    /// The channel classifier described by this configuration.
    #[must_use]
    pub fn classifier(&self) -> RpcAboveClassifier {
        RpcAboveClassifier::new(self.rpc_channel_min)
    }
}
