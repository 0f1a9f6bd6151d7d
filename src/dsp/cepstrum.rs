use rustfft::{num_complex::Complex, FftPlanner};

/// Cepstral pitch detection.
///
/// The cepstrum is the inverse FFT of the log power spectrum. A voiced
/// frame's harmonics form a regular comb in the spectrum, and that comb's
/// spacing shows up as a single peak in the cepstrum at the quefrency
/// (in samples) of the pitch period. Less precise than autocorrelation at
/// low pitch, but it fails differently — which is exactly what the hybrid
/// mode wants for cross-checking octave errors.

/// A cepstral peak converted back to frequency, with a 0-1 salience score.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CepstralPeak {
    pub frequency_hz: f32,
    /// How much the peak stands out above the in-band cepstral floor,
    /// 0.0 (buried) to 1.0 (dominant).
    pub salience: f32,
}

/// Find the pitch-period peak in the cepstrum of a (windowed) frame.
///
/// `frame.len()` should be a power of two; the estimator guarantees this.
/// Returns `None` when no positive peak exists in the quefrency band
/// (silence, or energy entirely outside the band).
pub(crate) fn cepstral_pitch(
    frame: &[f32],
    sample_rate: u32,
    min_hz: f32,
    max_hz: f32,
) -> Option<CepstralPeak> {
    let n = frame.len();
    if n < 8 {
        return None;
    }
    let sr = sample_rate as f32;

    // Quefrency band: high frequency = short quefrency.
    let q_min = (sr / max_hz).floor().max(2.0) as usize;
    let q_max = ((sr / min_hz).ceil() as usize).min(n / 2 - 1);
    if q_min >= q_max {
        return None;
    }

    let mut planner = FftPlanner::new();
    let fft_forward = planner.plan_fft_forward(n);
    let fft_inverse = planner.plan_fft_inverse(n);

    // FFT -> log power spectrum
    let mut buf: Vec<Complex<f32>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft_forward.process(&mut buf);
    let mut log_spec: Vec<Complex<f32>> = buf
        .iter()
        .map(|c| Complex::new((c.norm_sqr() + 1e-12).ln(), 0.0))
        .collect();

    // IFFT of the log spectrum -> cepstrum (real part, 1/N normalized)
    fft_inverse.process(&mut log_spec);
    let cepstrum: Vec<f32> = log_spec.iter().map(|c| c.re / n as f32).collect();

    // The spectral envelope leaks a slowly falling ramp into the low
    // quefrencies, which drags the in-band argmax below the true period.
    // Fit a line over the band and search the residual instead, the same
    // detrending a cepstral peak prominence measure uses.
    let band = &cepstrum[q_min..=q_max];
    let (slope, intercept) = linear_trend(band, q_min);
    let residual: Vec<f32> = band
        .iter()
        .enumerate()
        .map(|(i, &v)| v - (slope * (q_min + i) as f32 + intercept))
        .collect();

    let (peak_off, &peak_val) = residual
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())?;
    // Real cepstral peaks are O(0.1) and up; anything this small is
    // numerical residue from an (almost) empty spectrum.
    if peak_val <= 1e-4 {
        return None;
    }
    let floor = residual.iter().map(|v| v.abs()).sum::<f32>() / residual.len() as f32;

    // Parabolic refinement of the quefrency for sub-sample resolution,
    // on the detrended values so the ramp doesn't skew the vertex either.
    let q = q_min + peak_off;
    let quefrency = if peak_off > 0 && peak_off + 1 < residual.len() {
        let (left, mid, right) = (
            residual[peak_off - 1],
            residual[peak_off],
            residual[peak_off + 1],
        );
        let denom = left - 2.0 * mid + right;
        if denom.abs() > f32::EPSILON {
            q as f32 + (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
        } else {
            q as f32
        }
    } else {
        q as f32
    };

    let salience = (1.0 - floor / peak_val).clamp(0.0, 1.0);
    Some(CepstralPeak {
        frequency_hz: sr / quefrency,
        salience,
    })
}

/// Least-squares line through `band`, with x measured in absolute
/// quefrency samples starting at `offset`.
fn linear_trend(band: &[f32], offset: usize) -> (f32, f32) {
    let n = band.len() as f32;
    let mut sum_x = 0.0f32;
    let mut sum_y = 0.0f32;
    let mut sum_xy = 0.0f32;
    let mut sum_xx = 0.0f32;
    for (i, &y) in band.iter().enumerate() {
        let x = (offset + i) as f32;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-10 {
        return (0.0, sum_y / n.max(1.0));
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}
