//! Closed-form ECG synthesis.
//!
//! Two variants feed the dashboard: the chart walker advances a scalar `t` by a
//! fixed step every redraw, the live stream reads the wall clock. Neither keeps
//! state; the caller owns the window the samples go into.
use crate::signal::source::Entropy;
use crate::signal::{SignalError, Window};
use crate::types::{BandVector, EegSample, Sample};
/// Step applied to `t` per chart tick.
pub const CHART_STEP: f64 = 0.1;
/// Upper bound of the additive ECG noise.
pub const ECG_NOISE_CEILING: f64 = 0.1;
/// Upper bound of the additive noise on the chart's EEG trace.
pub const CHART_EEG_NOISE_CEILING: f64 = 0.05;
pub const R_WAVE_AMPLITUDE: f64 = 1.0;
pub const R_WAVE_PERIOD_MS: i64 = 10_000;
pub const R_WAVE_WIDTH_MS: i64 = 1_000;
/// Spacing between backfilled history points.
pub const BACKFILL_SPACING_MS: i64 = 1_000;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcgMode {
    /// `t` is derived from a call index.
    Indexed,
    /// `t` is ignored, the wall clock drives the waveform.
    Live,
}
/// Produce one ECG value. `index_or_time` is read in [`EcgMode::Indexed`],
/// `now_ms` in [`EcgMode::Live`].
pub fn synthesize<E: Entropy + ?Sized>(
    mode: EcgMode,
    index_or_time: f64,
    now_ms: i64,
    rng: &mut E,
) -> f64 {
    match mode {
        EcgMode::Indexed => indexed_ecg(index_or_time, rng),
        EcgMode::Live => live_ecg(now_ms, rng),
    }
}
pub fn indexed_ecg<E: Entropy + ?Sized>(t: f64, rng: &mut E) -> f64 {
    t.sin() * 0.5 + (t * 2.0).sin() * 0.3 + rng.uniform(0.0, ECG_NOISE_CEILING)
}
pub fn live_ecg<E: Entropy + ?Sized>(now_ms: i64, rng: &mut E) -> f64 {
    (now_ms as f64 * 0.0002).sin() * 0.5 + r_wave(now_ms) + rng.uniform(0.0, ECG_NOISE_CEILING)
}
/// Spike during the first second of every ten.
pub fn r_wave(now_ms: i64) -> f64 {
    if now_ms.rem_euclid(R_WAVE_PERIOD_MS) < R_WAVE_WIDTH_MS {
        R_WAVE_AMPLITUDE
    } else {
        0.0
    }
}
/// History point `i`: slow sine with an R peak every tenth point.
pub fn backfill_ecg<E: Entropy + ?Sized>(i: usize, rng: &mut E) -> f64 {
    let base = (i as f64 * 0.2).sin() * 0.5;
    let r = if i % 10 == 0 { R_WAVE_AMPLITUDE } else { 0.0 };
    base + r + rng.uniform(0.0, ECG_NOISE_CEILING)
}
/// EEG trace drawn next to the indexed ECG on the redraw chart.
pub fn chart_eeg<E: Entropy + ?Sized>(t: f64, rng: &mut E) -> f64 {
    (t * 0.5).sin() * 0.3 + (t * 1.5).cos() * 0.2 + rng.uniform(0.0, CHART_EEG_NOISE_CEILING)
}
/// Fill a fresh window with `capacity` history points ending at `now_ms`,
/// one per second.
pub fn backfill_window<E: Entropy + ?Sized>(
    capacity: usize,
    now_ms: i64,
    rng: &mut E,
) -> Result<Window<Sample>, SignalError> {
    let mut window = Window::with_capacity(capacity)?;
    for i in 0..capacity {
        let timestamp = now_ms - (capacity - 1 - i) as i64 * BACKFILL_SPACING_MS;
        window.push(Sample::new(timestamp, backfill_ecg(i, rng)));
    }
    Ok(window)
}
/// Standalone EEG history used when there is no ECG to derive bands from:
/// `count` points one second apart ending at `now_ms`, each band its own
/// slow wave plus noise.
pub fn mock_eeg_series<E: Entropy + ?Sized>(count: usize, now_ms: i64, rng: &mut E) -> Vec<EegSample> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            let timestamp = now_ms - (count - 1 - i) as i64 * BACKFILL_SPACING_MS;
            let alpha = (x * 0.1).sin() * 0.5 + rng.uniform(0.0, 0.2);
            let beta = (x * 0.15).cos() * 0.3 + rng.uniform(0.0, 0.15);
            let theta = (x * 0.05).sin() * 0.4 + rng.uniform(0.0, 0.1);
            let delta = (x * 0.03).cos() * 0.6 + rng.uniform(0.0, 0.05);
            EegSample {
                timestamp,
                bands: BandVector {
                    alpha,
                    beta,
                    theta,
                    delta,
                },
            }
        })
        .collect()
}
