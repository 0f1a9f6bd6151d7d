use tracing::debug;

use crate::tracking::kalman::Kalman1D;
use crate::types::{FilterQuality, LivePitchSample, PitchAlgorithm, RawPitchEstimate};

/// Smoothing factor for the clarity and stability running averages.
const EWMA_ALPHA: f32 = 0.15;

/// Frame-to-frame variance (Hz^2) at which stability reads 0.5.
/// A steady held note jitters by well under 5 Hz between frames.
const STABILITY_NORM_HZ2: f32 = 25.0;

/// Tunable parameters of the temporal tracking filter.
#[derive(Debug, Clone)]
pub struct TrackerParams {
    /// Process noise in Hz^2 per second.
    pub process_noise: f32,
    /// Base observation noise in Hz^2; divided by clarity per frame, so
    /// low-clarity estimates are trusted less.
    pub observation_noise: f32,
    /// Raw estimates below this clarity count as misses.
    pub clarity_floor: f32,
    /// Consecutive misses before the tracker declares voice loss.
    pub miss_threshold: u32,
    /// Covariance assigned when (re)initializing on a first valid frame.
    pub initial_covariance: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            process_noise: 40.0,
            observation_noise: 16.0,
            clarity_floor: 0.3,
            miss_threshold: 5,
            initial_covariance: 1000.0,
        }
    }
}

/// Filter lifecycle. `Lost` behaves exactly like `Uninitialized` on the
/// next valid frame; it exists so diagnostics can distinguish "never saw a
/// voice" from "voice went away".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Uninitialized,
    Tracking,
    Lost,
}

/// Recursive pitch tracker: a 1-D Kalman-style state estimator over raw
/// per-frame estimates.
///
/// Owns all mutable state of the temporal filter; one instance per live
/// session, updated by exactly one caller at a time, in frame order.
/// Deterministic: identical input sequences produce identical outputs.
#[derive(Debug, Clone)]
pub struct PitchTracker {
    params: TrackerParams,
    kalman: Kalman1D,
    phase: TrackerPhase,
    misses: u32,
    frames_since_reset: u64,
    clarity_ewma: f32,
    /// EWMA of squared frame-to-frame pitch change, feeding the stability
    /// diagnostic. Not used for gating.
    delta_var: f32,
    last_pitch: Option<f32>,
}

impl PitchTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            params,
            kalman: Kalman1D::new(),
            phase: TrackerPhase::Uninitialized,
            misses: 0,
            frames_since_reset: 0,
            clarity_ewma: 0.0,
            delta_var: 0.0,
            last_pitch: None,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn frames_since_reset(&self) -> u64 {
        self.frames_since_reset
    }

    /// Current smoothed pitch while tracking, used by the session loop as
    /// the estimator's search hint.
    pub fn current_pitch(&self) -> Option<f32> {
        if self.phase == TrackerPhase::Tracking {
            Some(self.kalman.position())
        } else {
            None
        }
    }

    /// Drop all state back to the uninitialized, high-uncertainty start.
    pub fn reset(&mut self) {
        self.kalman.reset();
        self.phase = TrackerPhase::Uninitialized;
        self.misses = 0;
        self.frames_since_reset = 0;
        self.clarity_ewma = 0.0;
        self.delta_var = 0.0;
        self.last_pitch = None;
    }

    /// Consume one raw estimate, advance the filter by `dt_seconds`, and
    /// produce the externally visible sample (zone left unclassified).
    pub fn update(&mut self, raw: &RawPitchEstimate, dt_seconds: f32) -> LivePitchSample {
        let observation = raw
            .frequency_hz
            .filter(|_| raw.clarity >= self.params.clarity_floor);

        match observation {
            Some(z) => self.observe(z, raw.clarity, dt_seconds),
            None => return self.miss(dt_seconds, raw.algorithm, raw.clarity),
        }

        self.sample(raw.algorithm, raw.clarity)
    }

    /// Register a frame with no usable estimate. A frame whose estimation
    /// failed upstream is fed through here too, so errors never corrupt
    /// filter state — they just look like one more miss.
    pub fn miss(&mut self, dt_seconds: f32, algorithm: PitchAlgorithm, clarity: f32) -> LivePitchSample {
        if self.phase == TrackerPhase::Tracking {
            // Predict-only: carry the estimate forward, let uncertainty grow.
            self.kalman.predict(dt_seconds, self.params.process_noise);
            self.frames_since_reset += 1;
            self.clarity_ewma += EWMA_ALPHA * (clarity - self.clarity_ewma);
            self.misses += 1;
            if self.misses >= self.params.miss_threshold {
                debug!(
                    misses = self.misses,
                    "voice lost; tracker will re-initialize on the next voiced frame"
                );
                self.phase = TrackerPhase::Lost;
            }
        }

        self.sample(algorithm, clarity)
    }

    fn observe(&mut self, z: f32, clarity: f32, dt_seconds: f32) {
        match self.phase {
            TrackerPhase::Tracking => {
                self.kalman.predict(dt_seconds, self.params.process_noise);
                let r = self.params.observation_noise / clarity.max(0.05);
                self.kalman.update(z, r);
                self.misses = 0;
                self.frames_since_reset += 1;
                self.clarity_ewma += EWMA_ALPHA * (clarity - self.clarity_ewma);

                let pitch = self.kalman.position();
                if let Some(last) = self.last_pitch {
                    let delta = pitch - last;
                    self.delta_var += EWMA_ALPHA * (delta * delta - self.delta_var);
                }
                self.last_pitch = Some(pitch);
            }
            TrackerPhase::Uninitialized | TrackerPhase::Lost => {
                // First valid frame (re)seeds the filter directly at the
                // observation — no stale bias survives a silence gap.
                debug!(pitch_hz = z, "tracker initialized");
                self.kalman.init(z, self.params.initial_covariance);
                self.phase = TrackerPhase::Tracking;
                self.misses = 0;
                self.frames_since_reset = 1;
                self.clarity_ewma = clarity;
                self.delta_var = 0.0;
                self.last_pitch = Some(z);
            }
        }
    }

    fn sample(&self, algorithm: PitchAlgorithm, clarity: f32) -> LivePitchSample {
        if self.phase != TrackerPhase::Tracking {
            return LivePitchSample {
                pitch_hz: None,
                confidence: 0.0,
                clarity,
                algorithm,
                filter_quality: None,
                zone: None,
            };
        }

        let p = self.kalman.covariance();
        let p0 = self.params.initial_covariance;
        // Confidence combines observation quality (smoothed clarity) with
        // how far the covariance has shrunk from its initial value.
        let confidence = (self.clarity_ewma * (p0 / (p0 + p))).clamp(0.0, 1.0);
        let stability = 1.0 / (1.0 + self.delta_var / STABILITY_NORM_HZ2);

        LivePitchSample {
            pitch_hz: Some(self.kalman.position()),
            confidence,
            clarity,
            algorithm,
            filter_quality: Some(FilterQuality {
                stability,
                confidence,
                error_covariance: p,
            }),
            zone: None,
        }
    }
}
