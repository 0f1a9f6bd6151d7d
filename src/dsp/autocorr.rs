/// Time-domain periodicity search via normalized autocorrelation.
///
/// The autocorrelation at lag L compares the signal with a copy of itself
/// shifted by L samples. A voiced frame repeats every pitch period, so the
/// correlation peaks at the lag matching that period; the peak's normalized
/// value doubles as a clarity measure (1.0 = perfectly periodic, 0.0 =
/// noise).

/// A refined autocorrelation peak: sub-sample lag plus its peak value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AcfPeak {
    /// Lag in samples (fractional after parabolic interpolation).
    pub lag: f32,
    /// Normalized correlation at the peak, clamped to [0, 1] by the caller.
    pub value: f32,
}

/// Normalized autocorrelation at a single lag.
///
/// r(L) = Σ x(n)·x(n+L) / sqrt(Σ x(n)² · Σ x(n+L)²)
///
/// A dot product between the signal and its shifted copy, normalized so the
/// result is between -1 and 1 regardless of amplitude or window taper.
pub fn normalized_autocorrelation(samples: &[f32], lag: usize) -> f32 {
    if lag == 0 || lag >= samples.len() {
        return 0.0;
    }
    let n = samples.len() - lag;

    let mut cross = 0.0f32;
    let mut energy_a = 0.0f32;
    let mut energy_b = 0.0f32;
    for i in 0..n {
        let a = samples[i];
        let b = samples[i + lag];
        cross += a * b;
        energy_a += a * a;
        energy_b += b * b;
    }

    let norm = (energy_a * energy_b).sqrt();
    if norm <= f32::EPSILON {
        return 0.0;
    }
    cross / norm
}

/// Locate the pitch-period peak within `[min_lag, max_lag]`.
///
/// Picks the *earliest* local maximum within 90% of the global maximum
/// rather than the global maximum itself: a strongly periodic signal
/// correlates almost as well at 2x and 3x the true period, and taking the
/// first strong peak avoids those octave-low errors.
///
/// Returns `None` when the frame has no positive interior peak anywhere in
/// the range (silence, pure noise, or periodicity outside the band).
pub(crate) fn find_pitch_peak(samples: &[f32], min_lag: usize, max_lag: usize) -> Option<AcfPeak> {
    if samples.len() < 4 {
        return None;
    }
    // Keep at least a quarter window of overlap so the correlation estimate
    // at the longest lag is still meaningful.
    let lag_limit = samples.len() - samples.len() / 4;
    let min_lag = min_lag.max(1);
    let max_lag = max_lag.min(lag_limit.saturating_sub(1));
    if min_lag > max_lag {
        return None;
    }

    // Compute one extra lag on each side so boundary lags can still be
    // judged as local maxima and interpolated.
    let lo = min_lag.saturating_sub(1).max(1);
    let hi = (max_lag + 1).min(samples.len() - 2);
    let r: Vec<f32> = (lo..=hi)
        .map(|lag| normalized_autocorrelation(samples, lag))
        .collect();

    let at = |lag: usize| r[lag - lo];

    let mut global_max = 0.0f32;
    for lag in min_lag..=max_lag {
        if at(lag) > global_max {
            global_max = at(lag);
        }
    }
    if global_max <= 0.0 {
        return None;
    }

    // First local maximum within 90% of the global one. Requiring a true
    // local maximum (not just a range boundary) matters: a tone below the
    // search band produces a correlation that only *decays* across the
    // range, and its high boundary value must not be mistaken for a pitch.
    let threshold = 0.9 * global_max;
    let mut best_lag = None;
    for lag in min_lag..=max_lag {
        let v = at(lag);
        if v < threshold {
            continue;
        }
        let left = if lag > lo { at(lag - 1) } else { v };
        let right = if lag < hi { at(lag + 1) } else { v };
        if v >= left && v >= right {
            best_lag = Some(lag);
            break;
        }
    }

    best_lag.map(|lag| refine_peak(&r, lo, lag))
}

/// Parabolic interpolation through a peak and its neighbors, for sub-sample
/// lag resolution. Falls back to the integer lag when the neighbors don't
/// bracket a curvature (flat or edge peak).
fn refine_peak(r: &[f32], lo: usize, lag: usize) -> AcfPeak {
    let i = lag - lo;
    if i == 0 || i + 1 >= r.len() {
        return AcfPeak {
            lag: lag as f32,
            value: r[i],
        };
    }
    let (left, mid, right) = (r[i - 1], r[i], r[i + 1]);
    let denom = left - 2.0 * mid + right;
    if denom.abs() <= f32::EPSILON {
        return AcfPeak {
            lag: lag as f32,
            value: mid,
        };
    }
    let delta = 0.5 * (left - right) / denom;
    let delta = delta.clamp(-0.5, 0.5);
    AcfPeak {
        lag: lag as f32 + delta,
        value: mid - 0.25 * (left - right) * delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn correlation_peaks_at_period() {
        // 100 Hz at 44.1 kHz has an exact-ish period of 441 samples.
        let samples = sine(100.0, 44100, 2048);
        let r = normalized_autocorrelation(&samples, 441);
        assert!(r > 0.99, "r at the true period should be ~1, got {r:.3}");
        let r_off = normalized_autocorrelation(&samples, 441 / 2);
        assert!(r_off < 0.0, "half a period out of phase, got {r_off:.3}");
    }

    #[test]
    fn correlation_zero_for_silence() {
        assert_eq!(normalized_autocorrelation(&vec![0.0; 1024], 100), 0.0);
    }

    #[test]
    fn correlation_degenerate_lags() {
        let samples = sine(100.0, 44100, 512);
        assert_eq!(normalized_autocorrelation(&samples, 0), 0.0);
        assert_eq!(normalized_autocorrelation(&samples, 512), 0.0);
    }

    #[test]
    fn finds_200hz_period() {
        let samples = sine(200.0, 44100, 2048);
        let peak = find_pitch_peak(&samples, 44, 882).unwrap();
        // True period = 44100 / 200 = 220.5 samples
        assert!(
            (peak.lag - 220.5).abs() < 2.0,
            "expected lag ~220.5, got {:.1}",
            peak.lag
        );
        assert!(peak.value > 0.9, "sine peak should be strong, got {:.3}", peak.value);
    }

    #[test]
    fn prefers_fundamental_over_double_period() {
        // The correlation at 2x the period is just as strong; first-strong-
        // peak picking must still report the fundamental.
        let samples = sine(400.0, 44100, 2048);
        let peak = find_pitch_peak(&samples, 44, 882).unwrap();
        let period = 44100.0 / 400.0;
        assert!(
            (peak.lag - period).abs() < 2.0,
            "expected lag ~{period:.1}, got {:.1}",
            peak.lag
        );
    }

    #[test]
    fn no_peak_in_silence() {
        assert!(find_pitch_peak(&vec![0.0; 2048], 44, 882).is_none());
    }

    #[test]
    fn noise_has_weak_peak() {
        // Deterministic LCG noise so the test never flakes.
        let mut state: u32 = 7;
        let samples: Vec<f32> = (0..2048)
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        if let Some(peak) = find_pitch_peak(&samples, 44, 882) {
            assert!(
                peak.value < 0.5,
                "noise should not look periodic, got {:.3}",
                peak.value
            );
        }
    }
}
