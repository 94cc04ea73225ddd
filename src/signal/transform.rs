//! ECG → EEG band transform.
//!
//! Each band is `|ecg| * scale + coeff * osc(now) + r`. Alpha has no oscillation
//! term. `r` is drawn once per call and shared by all four bands.
use crate::signal::source::Entropy;
use crate::types::{Band, BandVector, EegSample, Sample};
/// Upper bound of the shared random factor.
pub const RANDOM_FACTOR_CEILING: f64 = 0.2;
/// Clock-driven oscillation added to `band`, already scaled by its coefficient.
pub fn oscillation(band: Band, now_ms: i64) -> f64 {
    let now = now_ms as f64;
    match band {
        Band::Alpha => 0.0,
        Band::Beta => 0.2 * (now * 0.001).sin(),
        Band::Theta => 0.15 * (now * 0.0005).cos(),
        Band::Delta => 0.1 * (now * 0.0002).sin(),
    }
}
/// Noise-free component of the transform.
pub fn deterministic(ecg: f64, now_ms: i64) -> BandVector {
    with_random_factor(ecg, now_ms, 0.0)
}
pub fn transform<E: Entropy + ?Sized>(ecg: f64, now_ms: i64, rng: &mut E) -> BandVector {
    let random_factor = rng.uniform(0.0, RANDOM_FACTOR_CEILING);
    with_random_factor(ecg, now_ms, random_factor)
}
/// Transform every sample of a series, using each sample's own timestamp as the clock.
pub fn transform_series<'a, E, I>(samples: I, rng: &mut E) -> Vec<EegSample>
where
    E: Entropy + ?Sized,
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .map(|s| EegSample {
            timestamp: s.timestamp,
            bands: transform(s.value, s.timestamp, &mut *rng),
        })
        .collect()
}
fn with_random_factor(ecg: f64, now_ms: i64, random_factor: f64) -> BandVector {
    let magnitude = ecg.abs();
    BandVector::from_fn(|band| magnitude * band.scale() + oscillation(band, now_ms) + random_factor)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::source::{ConstantEntropy, RngEntropy, SequenceEntropy};
    use approx::assert_relative_eq;
    #[test]
    fn reference_vector_at_time_zero() {
        let mut rng = ConstantEntropy(0.1);
        let bands = transform(2.0, 0, &mut rng);
        assert_relative_eq!(bands.alpha, 1.5, epsilon = 1e-12);
        assert_relative_eq!(bands.beta, 1.1, epsilon = 1e-12);
        assert_relative_eq!(bands.theta, 0.85, epsilon = 1e-12);
        assert_relative_eq!(bands.delta, 0.5, epsilon = 1e-12);
    }
    #[test]
    fn one_random_draw_is_shared_by_all_bands() {
        let mut rng = SequenceEntropy::new([0.05, 0.15, 0.19, 0.01]);
        let bands = transform(1.0, 0, &mut rng);
        assert_eq!(rng.draws(), 1);
        let det = deterministic(1.0, 0);
        for band in Band::ALL {
            assert_relative_eq!(bands.get(band) - det.get(band), 0.05, epsilon = 1e-12);
        }
    }
    #[test]
    fn zero_input_leaves_only_oscillation_and_noise() {
        let now = 123_456;
        let det = deterministic(0.0, now);
        assert_eq!(det.alpha, 0.0);
        for band in [Band::Beta, Band::Theta, Band::Delta] {
            assert_relative_eq!(det.get(band), oscillation(band, now));
        }
        let noisy = transform(0.0, now, &mut ConstantEntropy(0.13));
        assert_relative_eq!(noisy.alpha, 0.13);
    }
    #[test]
    fn deterministic_component_is_monotonic_in_magnitude() {
        let now = 4_321;
        let mut previous = deterministic(0.0, now);
        for step in 1..200 {
            let magnitude = step as f64 * 0.05;
            for ecg in [magnitude, -magnitude] {
                let current = deterministic(ecg, now);
                for band in Band::ALL {
                    assert!(current.get(band) >= previous.get(band));
                }
            }
            previous = deterministic(magnitude, now);
        }
    }
    #[test]
    fn output_is_not_clamped_at_zero() {
        // theta oscillation bottoms out at -0.15 when cos(now * 0.0005) == -1
        let now = (std::f64::consts::PI / 0.0005).round() as i64;
        let bands = transform(0.0, now, &mut ConstantEntropy(0.0));
        assert!(bands.theta < 0.0);
    }
    #[test]
    fn series_is_keyed_by_sample_timestamp() {
        let samples = [Sample::new(1_000, 0.5), Sample::new(2_000, -0.5)];
        let mut rng = RngEntropy::seeded(3);
        let series = transform_series(&samples, &mut rng);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].timestamp, 1_000);
        assert_eq!(series[1].timestamp, 2_000);
        let det = deterministic(-0.5, 2_000);
        let r = series[1].bands.alpha - det.alpha;
        assert!((0.0..RANDOM_FACTOR_CEILING).contains(&r));
    }
}
