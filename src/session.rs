use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dsp::estimator::{self, DetectorConfig};
use crate::error::Result;
use crate::tracking::tracker::{PitchTracker, TrackerParams};
use crate::types::{AudioFrame, LivePitchSample};
use crate::zones::ZoneTable;

/// Where live audio comes from. Capture devices, file readers, and test
/// scripts all sit behind this trait; the engine never touches a device
/// itself.
///
/// `next_frame` blocks until the next chunk of samples is available and
/// should return within roughly one frame period, so that stopping a
/// session stays bounded. Chunks may be any length — the session buffers
/// them and cuts fixed analysis windows itself. Returning `Ok(None)` ends
/// the stream cleanly; returning an error means the source is gone for
/// good (device disconnect).
pub trait AudioSource: Send + 'static {
    fn sample_rate(&self) -> u32;
    fn next_frame(&mut self) -> Result<Option<Vec<f32>>>;
}

/// Lifecycle of a live tracking session as observers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Stopped by the caller or by the source ending cleanly.
    Stopped,
    /// The audio source disappeared mid-session. Terminal; the caller must
    /// start a new session. Distinct from "listening but hearing nothing",
    /// which is a Running session with a pitch-less sample.
    SourceLost(String),
}

/// State shared between the session worker and observers. The latest
/// sample is committed whole under the mutex, so readers never observe a
/// partially updated sample.
struct Shared {
    latest: Mutex<Option<LivePitchSample>>,
    status: Mutex<SessionStatus>,
    stop: AtomicBool,
}

/// A running live-analysis session.
///
/// Owns the worker thread that drives estimator → tracker → classifier for
/// every frame the source produces. Dropping the handle stops the session.
pub struct SessionHandle {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

/// Start the live pipeline against an audio source.
///
/// Fails only on configuration problems (an invalid zone table or window
/// size); a source that produces no frames is still a valid, silent
/// session.
pub fn start_tracking<S: AudioSource>(source: S, config: EngineConfig) -> Result<SessionHandle> {
    let zone_table = config.zone_table()?;
    let detector: DetectorConfig = (&config.detection).into();
    let params: TrackerParams = (&config.tracking).into();

    let window = config.detection.window_size;
    if !window.is_power_of_two()
        || window < estimator::MIN_WINDOW
        || window > estimator::MAX_WINDOW
    {
        return Err(crate::error::EngineError::InvalidFrameSize {
            got: window,
            min: estimator::MIN_WINDOW,
            max: estimator::MAX_WINDOW,
        });
    }

    // The source's own rate wins; the configured rate covers sources that
    // can't report one.
    let sample_rate = match source.sample_rate() {
        0 => config.detection.sample_rate,
        rate => rate,
    };

    let shared = Arc::new(Shared {
        latest: Mutex::new(None),
        status: Mutex::new(SessionStatus::Running),
        stop: AtomicBool::new(false),
    });

    let worker_shared = Arc::clone(&shared);
    let worker = std::thread::spawn(move || {
        run_session(source, window, sample_rate, detector, params, zone_table, worker_shared);
    });

    debug!("tracking session started");
    Ok(SessionHandle {
        shared,
        worker: Some(worker),
    })
}

impl SessionHandle {
    /// Most recent committed sample, or `None` before the first frame.
    /// Cheap enough to poll once per animation tick.
    pub fn latest(&self) -> Option<LivePitchSample> {
        self.shared
            .latest
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    pub fn status(&self) -> SessionStatus {
        self.shared
            .status
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(SessionStatus::Stopped)
    }

    /// Stop the session and join the worker. Idempotent; after it returns
    /// there is no background work left. A `SourceLost` status set by the
    /// worker is preserved.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            if let Ok(mut status) = self.shared.status.lock() {
                if *status == SessionStatus::Running {
                    *status = SessionStatus::Stopped;
                }
            }
            debug!("tracking session stopped");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The per-frame loop. Exclusive owner of the tracker state; windows are
/// cut from the incoming stream in order and processed strictly in order.
fn run_session<S: AudioSource>(
    mut source: S,
    window: usize,
    sample_rate: u32,
    detector: DetectorConfig,
    params: TrackerParams,
    zone_table: ZoneTable,
    shared: Arc<Shared>,
) {
    let mut tracker = PitchTracker::new(params);
    let mut buffer: Vec<f32> = Vec::with_capacity(window * 2);
    // Half-window overlap: consecutive analysis windows share 50% of their
    // samples, so the filter sees one update per hop.
    let hop = window / 2;
    let dt = hop as f32 / sample_rate as f32;

    loop {
        if shared.stop.load(Ordering::Relaxed) {
            break;
        }

        let chunk = match source.next_frame() {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                debug!("audio source ended");
                set_status(&shared, SessionStatus::Stopped);
                break;
            }
            Err(err) => {
                warn!(%err, "audio source lost");
                set_status(&shared, SessionStatus::SourceLost(err.to_string()));
                break;
            }
        };

        buffer.extend_from_slice(&chunk);
        while buffer.len() >= window {
            let frame = AudioFrame::new(buffer[..window].to_vec(), sample_rate);

            // A frame the estimator rejects is equivalent to a missed
            // frame: tracker state stays intact, voice-loss counting still
            // applies.
            let mut sample =
                match estimator::estimate(&frame, tracker.current_pitch(), &detector) {
                    Ok(raw) => tracker.update(&raw, dt),
                    Err(err) => {
                        debug!(%err, "frame skipped");
                        tracker.miss(dt, detector.algorithm, 0.0)
                    }
                };
            sample.zone = zone_table.classify(sample.pitch_hz).map(str::to_string);

            if let Ok(mut latest) = shared.latest.lock() {
                *latest = Some(sample);
            }

            buffer.drain(..hop);
        }
    }
}

fn set_status(shared: &Shared, status: SessionStatus) {
    if let Ok(mut guard) = shared.status.lock() {
        if *guard == SessionStatus::Running {
            *guard = status;
        }
    }
}
