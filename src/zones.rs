use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One half-open `[min_hz, max_hz)` voice-range band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub min_hz: f32,
    pub max_hz: f32,
    pub label: String,
}

/// Ordered voice-range boundary table.
///
/// Bands are contiguous and strictly increasing; a pitch exactly on a
/// boundary belongs to the higher band. Pitches below the first band or
/// at/above the last bound map to the dedicated too-low/too-high labels —
/// classification always produces a label for a finite pitch, never an
/// error.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    bands: Vec<ZoneBand>,
    too_low: String,
    too_high: String,
}

impl ZoneTable {
    /// Validate and build a table. Fails with `InvalidZoneTable` when the
    /// bands are empty, out of order, overlapping, or leave gaps.
    pub fn new(bands: Vec<ZoneBand>, too_low: String, too_high: String) -> Result<Self> {
        if bands.is_empty() {
            return Err(EngineError::invalid_zone_table("no bands defined"));
        }
        for band in &bands {
            if !(band.min_hz.is_finite() && band.max_hz.is_finite()) || band.min_hz >= band.max_hz {
                return Err(EngineError::invalid_zone_table(format!(
                    "band '{}' has invalid range [{}, {})",
                    band.label, band.min_hz, band.max_hz
                )));
            }
        }
        for pair in bands.windows(2) {
            if pair[0].max_hz != pair[1].min_hz {
                return Err(EngineError::invalid_zone_table(format!(
                    "bands '{}' and '{}' are not contiguous ({} vs {})",
                    pair[0].label, pair[1].label, pair[0].max_hz, pair[1].min_hz
                )));
            }
        }
        Ok(Self {
            bands,
            too_low,
            too_high,
        })
    }

    /// Default male voice ranges, sized to fit inside the engine's 50-1000
    /// Hz detection band. Classical singing ranges overlap, so these are
    /// non-overlapping working boundaries rather than textbook tessituras.
    pub fn default_male() -> Self {
        Self {
            bands: vec![
                ZoneBand {
                    min_hz: 82.0,
                    max_hz: 131.0,
                    label: "Bass".into(),
                },
                ZoneBand {
                    min_hz: 131.0,
                    max_hz: 175.0,
                    label: "Baritone".into(),
                },
                ZoneBand {
                    min_hz: 175.0,
                    max_hz: 330.0,
                    label: "Tenor".into(),
                },
            ],
            too_low: "Too Low".into(),
            too_high: "Too High".into(),
        }
    }

    pub fn bands(&self) -> &[ZoneBand] {
        &self.bands
    }

    pub fn too_low_label(&self) -> &str {
        &self.too_low
    }

    pub fn too_high_label(&self) -> &str {
        &self.too_high
    }

    /// Map a pitch to its zone label. `None` in, `None` out; any finite
    /// pitch maps to exactly one label.
    pub fn classify(&self, pitch_hz: Option<f32>) -> Option<&str> {
        let pitch = pitch_hz?;
        if pitch < self.bands[0].min_hz {
            return Some(&self.too_low);
        }
        for band in &self.bands {
            // Half-open [min, max): a boundary pitch lands in the higher band.
            if pitch >= band.min_hz && pitch < band.max_hz {
                return Some(&band.label);
            }
        }
        Some(&self.too_high)
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::default_male()
    }
}
