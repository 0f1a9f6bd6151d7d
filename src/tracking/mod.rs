//! Temporal tracking: the stateful filter that turns noisy per-frame
//! estimates into a smoothed, confidence-scored pitch.

pub(crate) mod kalman;
pub mod tracker;
