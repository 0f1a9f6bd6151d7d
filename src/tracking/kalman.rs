/// Scalar Kalman filter over a single slowly-varying value.
///
/// The pitch is modeled as locally constant between frames: the predict
/// step carries the estimate forward unchanged and only inflates the error
/// covariance, and the correct step blends in an observation weighted by
/// the relative uncertainty of the two.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kalman1D {
    /// Current estimate (Hz).
    x: f32,
    /// Error covariance (Hz^2).
    p: f32,
    initialized: bool,
}

impl Kalman1D {
    pub(crate) fn new() -> Self {
        Self {
            x: 0.0,
            p: 0.0,
            initialized: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Seed the filter directly at an observed value with high uncertainty.
    pub(crate) fn init(&mut self, z: f32, p0: f32) {
        self.x = z;
        self.p = p0;
        self.initialized = true;
    }

    /// Predict step: estimate unchanged, covariance inflated by the process
    /// noise accumulated over `dt` seconds.
    pub(crate) fn predict(&mut self, dt: f32, q: f32) {
        if !self.initialized {
            return;
        }
        self.p += q * dt.max(0.0);
    }

    /// Correct step against observation `z` with observation noise `r`.
    pub(crate) fn update(&mut self, z: f32, r: f32) {
        if !self.initialized {
            return;
        }
        let k = self.p / (self.p + r.max(f32::EPSILON));
        self.x += k * (z - self.x);
        self.p *= 1.0 - k;
    }

    pub(crate) fn position(&self) -> f32 {
        self.x
    }

    pub(crate) fn covariance(&self) -> f32 {
        self.p
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uninitialized() {
        let k = Kalman1D::new();
        assert!(!k.is_initialized());
    }

    #[test]
    fn init_seeds_estimate_and_covariance() {
        let mut k = Kalman1D::new();
        k.init(220.0, 1000.0);
        assert!(k.is_initialized());
        assert_eq!(k.position(), 220.0);
        assert_eq!(k.covariance(), 1000.0);
    }

    #[test]
    fn predict_inflates_covariance_only() {
        let mut k = Kalman1D::new();
        k.init(220.0, 100.0);
        k.predict(0.05, 40.0);
        assert_eq!(k.position(), 220.0);
        assert!((k.covariance() - 102.0).abs() < 1e-3);
    }

    #[test]
    fn update_moves_toward_observation() {
        let mut k = Kalman1D::new();
        k.init(220.0, 1000.0);
        let p_before = k.covariance();
        k.update(230.0, 10.0);
        assert!(k.position() > 220.0 && k.position() < 230.0);
        // High prior uncertainty vs low observation noise: mostly trusts z.
        assert!(k.position() > 229.0);
        assert!(k.covariance() < p_before);
    }

    #[test]
    fn noisier_observation_moves_less() {
        let mut trusting = Kalman1D::new();
        let mut wary = Kalman1D::new();
        trusting.init(220.0, 100.0);
        wary.init(220.0, 100.0);
        trusting.update(240.0, 10.0);
        wary.update(240.0, 1000.0);
        assert!(trusting.position() > wary.position());
    }

    #[test]
    fn uninitialized_steps_are_inert() {
        let mut k = Kalman1D::new();
        k.predict(0.05, 40.0);
        k.update(220.0, 10.0);
        assert!(!k.is_initialized());
        assert_eq!(k.position(), 0.0);
    }

    #[test]
    fn converges_on_constant_observations() {
        let mut k = Kalman1D::new();
        k.init(220.0, 1000.0);
        for _ in 0..100 {
            k.predict(0.046, 40.0);
            k.update(220.0, 16.0);
        }
        assert!((k.position() - 220.0).abs() < 0.01);
        assert!(k.covariance() < 20.0);
    }
}
