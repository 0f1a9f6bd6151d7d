//! voxtrack — real-time vocal pitch detection and tracking.
//!
//! The engine turns a stream of raw audio frames into a stable,
//! confidence-scored fundamental-frequency estimate, classifies it into
//! voice-range zones, and can summarize batches of stored pitch values.
//!
//! The live pipeline is estimator → tracker → classifier:
//!
//! ```text
//! AudioSource --frames--> dsp::estimator --raw--> tracking::PitchTracker
//!                                                        |
//!                          LivePitchSample <-- zones::ZoneTable
//! ```
//!
//! Capture devices, persistence, and rendering live outside this crate;
//! frames come in through the [`AudioSource`] trait and results go out as
//! plain serializable values.
//!
//! # Live tracking
//!
//! ```no_run
//! use voxtrack::{start_tracking, AudioSource, EngineConfig, Result};
//!
//! struct Mic;
//! impl AudioSource for Mic {
//!     fn sample_rate(&self) -> u32 { 44100 }
//!     fn next_frame(&mut self) -> Result<Option<Vec<f32>>> {
//!         Ok(Some(vec![0.0; 2048])) // real sources block on the device
//!     }
//! }
//!
//! let mut session = start_tracking(Mic, EngineConfig::default())?;
//! if let Some(sample) = session.latest() {
//!     println!("{:?} ({:?})", sample.pitch_hz, sample.zone);
//! }
//! session.stop();
//! # Ok::<(), voxtrack::EngineError>(())
//! ```
//!
//! # Batch statistics
//!
//! ```
//! let summary = voxtrack::summarize_history(&[100.0, 150.0, 200.0]);
//! assert_eq!(summary.mean_hz, Some(150.0));
//! assert_eq!(summary.dominant_category, "Baritone");
//! ```

pub mod config;
pub mod dsp;
pub mod error;
pub mod session;
pub mod stats;
pub mod tracking;
pub mod types;
pub mod zones;

pub use config::{DetectionConfig, EngineConfig, TrackingConfig, ZonesConfig};
pub use dsp::estimator::{dominant_pitch, estimate, DetectorConfig};
pub use error::{EngineError, Result};
pub use session::{start_tracking, AudioSource, SessionHandle, SessionStatus};
pub use stats::{summarize, PitchStatsSummary};
pub use tracking::tracker::{PitchTracker, TrackerParams, TrackerPhase};
pub use types::{
    AudioFrame, FilterQuality, LivePitchSample, PitchAlgorithm, RawPitchEstimate,
};
pub use zones::{ZoneBand, ZoneTable};

/// Summarize stored pitch values against the default male voice-range
/// table. The statistics/feedback layer calls this over the pitch values
/// already persisted for a user's past recordings.
pub fn summarize_history(values: &[f32]) -> PitchStatsSummary {
    stats::summarize(values, &ZoneTable::default_male())
}
