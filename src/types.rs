use serde::{Deserialize, Serialize};

/// One fixed-length window of time-domain audio, plus its sample rate.
///
/// Owned by the caller for the duration of one estimation call; the engine
/// never retains or mutates it.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Frame duration in seconds. Callers driving a tracker directly use
    /// this as the filter time step, so replays stay deterministic (no
    /// wall-clock reads).
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Which detection pipeline produced a raw estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchAlgorithm {
    /// Normalized time-domain autocorrelation peak search.
    Autocorrelation,
    /// Cepstral peak (FFT -> log power -> IFFT) quefrency search.
    Cepstral,
    /// Autocorrelation frequency, cross-checked against the cepstral
    /// estimate; disagreement lowers clarity.
    Hybrid,
}

/// Raw per-frame estimate from the Frame Pitch Estimator.
///
/// `frequency_hz` is `None` when no periodicity was found in the plausible
/// band (silence, noise, unvoiced speech). A frequency may still be reported
/// with low clarity; consumers gate on clarity, not on presence alone.
#[derive(Debug, Clone, Copy)]
pub struct RawPitchEstimate {
    pub frequency_hz: Option<f32>,
    pub algorithm: PitchAlgorithm,
    /// Strength of the detected periodicity, 0.0 (noise) to 1.0 (pure tone).
    pub clarity: f32,
}

impl RawPitchEstimate {
    /// An estimate carrying no periodicity at all (silent/empty frame).
    pub fn unvoiced(algorithm: PitchAlgorithm) -> Self {
        Self {
            frequency_hz: None,
            algorithm,
            clarity: 0.0,
        }
    }
}

/// Diagnostics from the temporal tracking filter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilterQuality {
    /// Exponentially-weighted frame-to-frame consistency, 0.0-1.0.
    /// Diagnostics only; nothing gates on it.
    pub stability: f32,
    /// Filter-level trust in the smoothed estimate, 0.0-1.0.
    pub confidence: f32,
    /// Current scalar error covariance of the Kalman recursion (Hz^2).
    pub error_covariance: f32,
}

/// The externally visible output of the live pipeline, recomputed each frame.
#[derive(Debug, Clone, Serialize)]
pub struct LivePitchSample {
    /// Smoothed pitch, or `None` while no voice is being tracked.
    pub pitch_hz: Option<f32>,
    /// Filter-level trust in `pitch_hz`, 0.0-1.0.
    pub confidence: f32,
    /// Clarity of the raw estimate this sample was built from.
    pub clarity: f32,
    pub algorithm: PitchAlgorithm,
    /// Present only while the filter is actively tracking.
    pub filter_quality: Option<FilterQuality>,
    /// Voice-range zone of `pitch_hz`, or `None` when there is no pitch.
    pub zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_duration() {
        let frame = AudioFrame::new(vec![0.0; 2048], 44100);
        let dt = frame.duration_secs();
        assert!((dt - 2048.0 / 44100.0).abs() < 1e-6);
    }

    #[test]
    fn unvoiced_has_zero_clarity() {
        let raw = RawPitchEstimate::unvoiced(PitchAlgorithm::Hybrid);
        assert!(raw.frequency_hz.is_none());
        assert_eq!(raw.clarity, 0.0);
    }
}
