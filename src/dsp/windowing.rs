use std::f32::consts::PI;

/// Apply a Hann window to a frame of samples, returning a new Vec.
///
/// Tapers the frame to zero at both edges so the FFT doesn't see the
/// discontinuity of an abrupt cut mid-cycle.
///
/// w(n) = 0.5 * (1 - cos(2π * n / (N - 1)))
pub fn hann(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n <= 1 {
        return samples.to_vec();
    }

    let scale = 2.0 * PI / (n - 1) as f32;
    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| s * 0.5 * (1.0 - (scale * i as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_edges_are_zero() {
        let windowed = hann(&vec![1.0; 128]);
        assert!(windowed[0].abs() < 1e-6);
        assert!(windowed[127].abs() < 1e-6);
    }

    #[test]
    fn hann_center_is_one() {
        let n = 129; // odd length so there's an exact center
        let windowed = hann(&vec![1.0; n]);
        assert!((windowed[64] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn window_is_symmetric() {
        let windowed = hann(&vec![1.0; 64]);
        for i in 0..32 {
            assert!(
                (windowed[i] - windowed[63 - i]).abs() < 1e-6,
                "asymmetry at index {i}"
            );
        }
    }

    #[test]
    fn degenerate_inputs_pass_through() {
        assert!(hann(&[]).is_empty());
        assert_eq!(hann(&[0.5]), vec![0.5]);
    }
}
