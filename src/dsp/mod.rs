//! Per-frame signal processing: windowing, the autocorrelation and
//! cepstral periodicity searches, and the frame pitch estimator built on
//! top of them. Everything here is stateless per call.

pub mod autocorr;
pub mod cepstrum;
pub mod estimator;
pub mod windowing;
