//! Per-band relationship check between an ECG value and observed EEG powers.
//!
//! `expected = |ecg| * scale * 1.5`. Oscillation and noise terms of the transform
//! are not part of `expected`, so the check is stricter than the transform's
//! spread for small inputs. With `ecg == 0` any non-zero band is flagged.
use crate::types::{Band, BandFlags, BandVector};
/// Headroom applied over the transform's scale coefficient.
pub const HEADROOM: f64 = 1.5;
/// Allowed deviation, relative to `expected`.
pub const TOLERANCE: f64 = 0.5;
pub fn expected(ecg: f64, band: Band) -> f64 {
    ecg.abs() * band.scale() * HEADROOM
}
pub fn is_anomalous(ecg: f64, band: Band, observed: f64) -> bool {
    let expected = expected(ecg, band);
    (observed - expected).abs() > expected * TOLERANCE
}
pub fn flag(ecg: f64, observed: &BandVector) -> BandFlags {
    BandFlags {
        alpha: is_anomalous(ecg, Band::Alpha, observed.alpha),
        beta: is_anomalous(ecg, Band::Beta, observed.beta),
        theta: is_anomalous(ecg, Band::Theta, observed.theta),
        delta: is_anomalous(ecg, Band::Delta, observed.delta),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::source::ConstantEntropy;
    use crate::signal::synth::indexed_ecg;
    use crate::signal::transform::transform;
    #[test]
    fn zero_ecg_flags_exactly_the_nonzero_bands() {
        let observed = BandVector {
            alpha: 0.0,
            beta: 0.3,
            theta: -0.01,
            delta: 0.0,
        };
        let flags = flag(0.0, &observed);
        assert!(!flags.alpha);
        assert!(flags.beta);
        assert!(flags.theta);
        assert!(!flags.delta);
    }
    #[test]
    fn tolerance_boundary_is_exclusive() {
        // expected alpha for ecg 1.0 is 1.05, tolerance 0.525
        assert!(!is_anomalous(1.0, Band::Alpha, 1.05 + 0.5));
        assert!(is_anomalous(1.0, Band::Alpha, 1.05 + 0.6));
        assert!(is_anomalous(1.0, Band::Alpha, 0.5));
        assert!(!is_anomalous(-1.0, Band::Alpha, 0.6));
    }
    #[test]
    fn bands_are_judged_independently() {
        let observed = BandVector {
            alpha: 1.05,
            beta: 10.0,
            theta: 0.45,
            delta: 0.3,
        };
        let flags = flag(1.0, &observed);
        assert_eq!(
            flags,
            BandFlags {
                alpha: false,
                beta: true,
                theta: false,
                delta: false,
            }
        );
    }
    #[test]
    fn noise_free_pipeline_output_is_not_flagged() {
        let mut silent = ConstantEntropy(0.0);
        // sin(0) == 0 keeps beta/delta oscillation out; theta's cos(0) term
        // stays inside tolerance once |ecg| >= 0.4
        for t in [0.8_f64, 1.0, 1.2, std::f64::consts::FRAC_PI_2, 5.0] {
            let ecg = indexed_ecg(t, &mut silent);
            let bands = transform(ecg, 0, &mut silent);
            let flags = flag(ecg, &bands);
            assert!(!flags.any(), "t={t} ecg={ecg} flags={flags:?}");
        }
    }
}
