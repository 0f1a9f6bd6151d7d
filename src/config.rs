use serde::{Deserialize, Serialize};

use crate::dsp::estimator::DetectorConfig;
use crate::error::Result;
use crate::tracking::tracker::TrackerParams;
use crate::types::PitchAlgorithm;
use crate::zones::{ZoneBand, ZoneTable};

/// Engine configuration, usually loaded from a TOML fragment.
///
/// serde's `default` attribute means: if a field is missing from the TOML,
/// use the value from the Default implementation instead of failing to
/// parse. Every field is optional — an empty string parses to the factory
/// settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub zones: ZonesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Analysis window length in samples. Must be a power of two between
    /// 512 and 4096; the estimator rejects anything else per frame.
    pub window_size: usize,
    /// Expected capture sample rate. Sources may override per frame.
    pub sample_rate: u32,
    /// Lower edge of the plausible voice band in Hz. Candidates below this
    /// are rejected as sub-bass rumble.
    pub pitch_floor_hz: f32,
    /// Upper edge of the plausible voice band in Hz.
    pub pitch_ceiling_hz: f32,
    /// Which detection pipeline to run per frame.
    pub algorithm: PitchAlgorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Kalman process noise in Hz^2 per second — how fast the filter lets
    /// the pitch drift between observations.
    pub process_noise: f32,
    /// Base Kalman observation noise in Hz^2, scaled up for low-clarity
    /// frames (a clarity-0.5 frame is trusted half as much).
    pub observation_noise: f32,
    /// Raw estimates with clarity below this count as misses, not
    /// observations.
    pub clarity_floor: f32,
    /// Consecutive misses before the tracker declares voice loss and
    /// resets to its uninitialized state.
    pub miss_threshold: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    pub too_low_label: String,
    pub too_high_label: String,
    /// Ordered, contiguous, half-open `[min, max)` bands.
    pub bands: Vec<ZoneBand>,
}

// --- Default implementations ---
// Factory settings: a 2048-sample window at 44.1 kHz (~46 ms, enough for
// two full cycles at 50 Hz) and the default male voice-range table.

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            tracking: TrackingConfig::default(),
            zones: ZonesConfig::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            sample_rate: 44100,
            pitch_floor_hz: 50.0,
            pitch_ceiling_hz: 1000.0,
            algorithm: PitchAlgorithm::Hybrid,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            process_noise: 40.0,
            observation_noise: 16.0,
            clarity_floor: 0.3,
            miss_threshold: 5,
        }
    }
}

impl Default for ZonesConfig {
    fn default() -> Self {
        let table = ZoneTable::default_male();
        Self {
            too_low_label: table.too_low_label().to_string(),
            too_high_label: table.too_high_label().to_string(),
            bands: table.bands().to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML fragment, filling unspecified fields with defaults.
    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Build the validated zone boundary table this config describes.
    pub fn zone_table(&self) -> Result<ZoneTable> {
        ZoneTable::new(
            self.zones.bands.clone(),
            self.zones.too_low_label.clone(),
            self.zones.too_high_label.clone(),
        )
    }
}

/// Bridge between the user-facing config and the DSP parameters.
impl From<&DetectionConfig> for DetectorConfig {
    fn from(cfg: &DetectionConfig) -> Self {
        DetectorConfig {
            pitch_floor_hz: cfg.pitch_floor_hz,
            pitch_ceiling_hz: cfg.pitch_ceiling_hz,
            algorithm: cfg.algorithm,
            ..DetectorConfig::default()
        }
    }
}

/// Bridge between the user-facing config and the filter parameters.
impl From<&TrackingConfig> for TrackerParams {
    fn from(cfg: &TrackingConfig) -> Self {
        TrackerParams {
            process_noise: cfg.process_noise,
            observation_noise: cfg.observation_noise,
            clarity_floor: cfg.clarity_floor,
            miss_threshold: cfg.miss_threshold,
            ..TrackerParams::default()
        }
    }
}
