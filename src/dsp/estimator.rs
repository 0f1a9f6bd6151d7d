use crate::dsp::{autocorr, cepstrum, windowing};
use crate::error::{EngineError, Result};
use crate::types::{AudioFrame, PitchAlgorithm, RawPitchEstimate};

/// Smallest supported analysis window, in samples.
pub const MIN_WINDOW: usize = 512;
/// Largest supported analysis window, in samples.
pub const MAX_WINDOW: usize = 4096;

/// Window size used by the batch `dominant_pitch` helper.
const BATCH_WINDOW: usize = 2048;
/// Frames below this clarity are ignored when picking a dominant pitch.
const BATCH_CLARITY_FLOOR: f32 = 0.3;

/// Parameters for the per-frame estimator.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Lower edge of the plausible voice band in Hz.
    pub pitch_floor_hz: f32,
    /// Upper edge of the plausible voice band in Hz.
    pub pitch_ceiling_hz: f32,
    pub algorithm: PitchAlgorithm,
    /// Half-width of the hinted lag search, as a fraction of the hinted
    /// period. 0.3 = search ±30% around the last known pitch.
    pub hint_band: f32,
    /// Relative frequency difference below which the cepstral cross-check
    /// counts as agreeing with the autocorrelation estimate.
    pub hybrid_tolerance: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            pitch_floor_hz: 50.0,
            pitch_ceiling_hz: 1000.0,
            algorithm: PitchAlgorithm::Hybrid,
            hint_band: 0.3,
            hybrid_tolerance: 0.1,
        }
    }
}

/// Estimate the fundamental frequency of one audio frame.
///
/// Stateless and side-effect free; safe to run on independent frames in
/// parallel. `hint`, when present, narrows the lag search around the last
/// known pitch to reduce octave errors; `None` forces a full-band search.
///
/// "No pitch found" is a normal outcome (`frequency_hz: None`), never an
/// error. The only failure is an unsupported frame length, which is fatal
/// to this call alone.
pub fn estimate(
    frame: &AudioFrame,
    hint: Option<f32>,
    cfg: &DetectorConfig,
) -> Result<RawPitchEstimate> {
    let n = frame.samples.len();
    if !n.is_power_of_two() || n < MIN_WINDOW || n > MAX_WINDOW {
        return Err(EngineError::InvalidFrameSize {
            got: n,
            min: MIN_WINDOW,
            max: MAX_WINDOW,
        });
    }

    // Energy gate: a silent frame has nothing to correlate. This also keeps
    // the cepstral path away from log-of-zero spectra.
    if frame_rms(&frame.samples) < 1e-6 {
        return Ok(RawPitchEstimate::unvoiced(cfg.algorithm));
    }

    let sr = frame.sample_rate;

    // The autocorrelation path runs on the raw samples: a taper would make
    // the two copies being correlated unequal in amplitude, which skews the
    // peak lag (worst at long periods, i.e. exactly the low male pitches).
    // Only the spectral path needs a window, to contain FFT leakage.
    let (frequency, clarity) = match cfg.algorithm {
        PitchAlgorithm::Autocorrelation => acf_estimate(&frame.samples, sr, hint, cfg),
        PitchAlgorithm::Cepstral => {
            let windowed = windowing::hann(&frame.samples);
            cepstral_estimate(&windowed, sr, cfg)
        }
        PitchAlgorithm::Hybrid => {
            let (freq, clarity) = acf_estimate(&frame.samples, sr, hint, cfg);
            match freq {
                None => (None, clarity),
                Some(f) => {
                    // The cepstral path fails differently than ACF does, so
                    // agreement is evidence the peak is a real fundamental.
                    // Disagreement (or no cepstral peak) halves the clarity
                    // rather than discarding the frame.
                    let windowed = windowing::hann(&frame.samples);
                    let agrees = cepstrum::cepstral_pitch(
                        &windowed,
                        sr,
                        cfg.pitch_floor_hz,
                        cfg.pitch_ceiling_hz,
                    )
                    .is_some_and(|c| {
                        (c.frequency_hz - f).abs() / f <= cfg.hybrid_tolerance
                    });
                    (Some(f), if agrees { clarity } else { clarity * 0.5 })
                }
            }
        }
    };

    // Final band rejection: sub-bass rumble and high artifacts are "no
    // voice", whichever path produced them.
    let frequency =
        frequency.filter(|&f| f >= cfg.pitch_floor_hz && f <= cfg.pitch_ceiling_hz);

    Ok(RawPitchEstimate {
        frequency_hz: frequency,
        algorithm: cfg.algorithm,
        clarity: if frequency.is_some() { clarity } else { 0.0 },
    })
}

/// Autocorrelation path: peak lag in the band, optionally hint-narrowed.
/// Takes the raw (untapered) samples.
fn acf_estimate(
    samples: &[f32],
    sample_rate: u32,
    hint: Option<f32>,
    cfg: &DetectorConfig,
) -> (Option<f32>, f32) {
    let sr = sample_rate as f32;
    let full_min = (sr / cfg.pitch_ceiling_hz).ceil() as usize;
    let full_max = (sr / cfg.pitch_floor_hz).ceil() as usize;

    let (min_lag, max_lag) = match hint {
        Some(h) if h >= cfg.pitch_floor_hz && h <= cfg.pitch_ceiling_hz => {
            let hint_lag = sr / h;
            let lo = (hint_lag * (1.0 - cfg.hint_band)) as usize;
            let hi = (hint_lag * (1.0 + cfg.hint_band)).ceil() as usize;
            (lo.max(full_min), hi.min(full_max))
        }
        _ => (full_min, full_max),
    };

    match autocorr::find_pitch_peak(samples, min_lag, max_lag) {
        Some(peak) if peak.lag > 0.0 => {
            (Some(sr / peak.lag), peak.value.clamp(0.0, 1.0))
        }
        _ => (None, 0.0),
    }
}

/// Cepstral path: peak quefrency in the band; salience doubles as clarity.
fn cepstral_estimate(
    windowed: &[f32],
    sample_rate: u32,
    cfg: &DetectorConfig,
) -> (Option<f32>, f32) {
    match cepstrum::cepstral_pitch(windowed, sample_rate, cfg.pitch_floor_hz, cfg.pitch_ceiling_hz)
    {
        Some(peak) => (Some(peak.frequency_hz), peak.salience.clamp(0.0, 1.0)),
        None => (None, 0.0),
    }
}

/// One representative pitch for a whole recording: the median of all
/// confident per-frame estimates. Batch counterpart of `estimate`, used by
/// callers that analyze stored recordings rather than live frames.
pub fn dominant_pitch(samples: &[f32], sample_rate: u32, cfg: &DetectorConfig) -> Option<f32> {
    if samples.len() < BATCH_WINDOW {
        return None;
    }

    let hop = BATCH_WINDOW / 2;
    let mut frequencies = Vec::new();
    let mut pos = 0;
    while pos + BATCH_WINDOW <= samples.len() {
        let frame = AudioFrame::new(samples[pos..pos + BATCH_WINDOW].to_vec(), sample_rate);
        // Window size is fixed and valid here, so estimate cannot fail.
        if let Ok(raw) = estimate(&frame, None, cfg) {
            if raw.clarity >= BATCH_CLARITY_FLOOR {
                if let Some(f) = raw.frequency_hz {
                    frequencies.push(f);
                }
            }
        }
        pos += hop;
    }

    if frequencies.is_empty() {
        return None;
    }
    frequencies.sort_by(|a, b| a.partial_cmp(b).unwrap());
    Some(frequencies[frequencies.len() / 2])
}

/// RMS of a sample buffer (linear, not dB).
pub(crate) fn frame_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_frame(freq: f32, sample_rate: u32, len: usize) -> AudioFrame {
        let samples = (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioFrame::new(samples, sample_rate)
    }

    fn acf_config() -> DetectorConfig {
        DetectorConfig {
            algorithm: PitchAlgorithm::Autocorrelation,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn rejects_bad_frame_sizes() {
        for len in [0, 100, 511, 1000, 8192] {
            let frame = AudioFrame::new(vec![0.0; len], 44100);
            let err = estimate(&frame, None, &DetectorConfig::default()).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidFrameSize { got, .. } if got == len),
                "len {len} should be rejected"
            );
        }
    }

    #[test]
    fn silence_is_unvoiced_with_zero_clarity() {
        let frame = AudioFrame::new(vec![0.0; 2048], 44100);
        let raw = estimate(&frame, None, &DetectorConfig::default()).unwrap();
        assert!(raw.frequency_hz.is_none());
        assert_eq!(raw.clarity, 0.0);
    }

    #[test]
    fn detects_sine_within_one_percent() {
        // 82 and 110 Hz sit at the long-period end of the male range, where
        // any lag bias shows up first.
        for freq in [82.0f32, 110.0, 146.8, 220.0, 440.0] {
            let frame = sine_frame(freq, 44100, 2048);
            let raw = estimate(&frame, None, &acf_config()).unwrap();
            let got = raw.frequency_hz.expect("sine should be voiced");
            assert!(
                (got - freq).abs() / freq < 0.01,
                "expected ~{freq} Hz, got {got:.1}"
            );
            assert!(raw.clarity > 0.8, "clarity for pure sine was {:.2}", raw.clarity);
        }
    }

    #[test]
    fn hybrid_agreement_keeps_clarity_high() {
        let frame = sine_frame(220.0, 44100, 2048);
        let hybrid = estimate(&frame, None, &DetectorConfig::default()).unwrap();
        let acf = estimate(&frame, None, &acf_config()).unwrap();
        assert_eq!(hybrid.algorithm, PitchAlgorithm::Hybrid);
        let got = hybrid.frequency_hz.expect("sine should be voiced");
        assert!((got - 220.0).abs() / 220.0 < 0.01);
        // Both paths see 220 Hz, so the cross-check must not halve clarity.
        assert!(
            hybrid.clarity > 0.6 * acf.clarity,
            "agreeing hybrid clarity {:.2} vs acf {:.2}",
            hybrid.clarity,
            acf.clarity
        );
    }

    #[test]
    fn cepstral_mode_detects_harmonic_tone() {
        let sr = 44100u32;
        let samples: Vec<f32> = (0..4096)
            .map(|i| {
                let t = i as f32 / sr as f32;
                (1..=5)
                    .map(|h| (2.0 * PI * 165.0 * h as f32 * t).sin() / h as f32)
                    .sum()
            })
            .collect();
        let frame = AudioFrame::new(samples, sr);
        let cfg = DetectorConfig {
            algorithm: PitchAlgorithm::Cepstral,
            ..DetectorConfig::default()
        };
        let raw = estimate(&frame, None, &cfg).unwrap();
        let got = raw.frequency_hz.expect("harmonic tone should be voiced");
        assert!(
            (got - 165.0).abs() / 165.0 < 0.03,
            "expected ~165 Hz, got {got:.1}"
        );
    }

    #[test]
    fn hint_narrows_search_to_same_answer() {
        let frame = sine_frame(196.0, 44100, 2048);
        let cfg = acf_config();
        let full = estimate(&frame, None, &cfg).unwrap().frequency_hz.unwrap();
        let hinted = estimate(&frame, Some(200.0), &cfg)
            .unwrap()
            .frequency_hz
            .unwrap();
        assert!((full - hinted).abs() < 1.0);
    }

    #[test]
    fn hint_outside_band_is_ignored() {
        let frame = sine_frame(220.0, 44100, 2048);
        let raw = estimate(&frame, Some(5000.0), &acf_config()).unwrap();
        let got = raw.frequency_hz.expect("full-band search should run");
        assert!((got - 220.0).abs() / 220.0 < 0.01);
    }

    #[test]
    fn tone_below_band_is_rejected() {
        // 30 Hz is below the 50 Hz floor; its correlation only decays across
        // the search range, so no pitch may be reported.
        let frame = sine_frame(30.0, 44100, 4096);
        let raw = estimate(&frame, None, &acf_config()).unwrap();
        if let Some(f) = raw.frequency_hz {
            assert!(
                f >= 50.0,
                "sub-band tone must not report {f:.1} Hz below the floor"
            );
        }
    }

    #[test]
    fn dominant_pitch_of_steady_sine() {
        let sr = 44100u32;
        let samples: Vec<f32> = (0..sr as usize)
            .map(|i| (2.0 * PI * 150.0 * i as f32 / sr as f32).sin())
            .collect();
        let got = dominant_pitch(&samples, sr, &acf_config()).unwrap();
        assert!((got - 150.0).abs() / 150.0 < 0.01, "got {got:.1}");
    }

    #[test]
    fn dominant_pitch_none_for_silence() {
        assert!(dominant_pitch(&vec![0.0; 44100], 44100, &DetectorConfig::default()).is_none());
    }

    #[test]
    fn dominant_pitch_none_for_short_input() {
        assert!(dominant_pitch(&[0.1; 512], 44100, &DetectorConfig::default()).is_none());
    }

    #[test]
    fn frame_rms_values() {
        assert_eq!(frame_rms(&[]), 0.0);
        assert_eq!(frame_rms(&[0.0; 8]), 0.0);
        assert!((frame_rms(&[0.5; 8]) - 0.5).abs() < 1e-6);
    }
}
