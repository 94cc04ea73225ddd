use crate::signal::flagger::flag;
use crate::signal::source::Entropy;
use crate::signal::synth::{self, backfill_window, chart_eeg, indexed_ecg, mock_eeg_series, EcgMode};
use crate::signal::transform::{transform, transform_series};
use crate::signal::{SignalError, Window};
use crate::types::{ChartPoint, EegSample, LiveReading, Sample};
/// Synthesizer → transform → flagger over a wall-clock ECG stream.
/// Owns the rolling window the live panel draws from.
pub struct LivePipeline {
    window: Window<Sample>,
}
impl LivePipeline {
    /// Start from `capacity` backfilled points ending at `now_ms`.
    pub fn seeded<E: Entropy + ?Sized>(
        capacity: usize,
        now_ms: i64,
        rng: &mut E,
    ) -> Result<Self, SignalError> {
        Ok(Self {
            window: backfill_window(capacity, now_ms, rng)?,
        })
    }
    pub fn empty(capacity: usize) -> Result<Self, SignalError> {
        Ok(Self {
            window: Window::with_capacity(capacity)?,
        })
    }
    /// Produce, transform and flag one sample. The sample is stamped one
    /// backfill step after the newest point in the window.
    pub fn tick<E: Entropy + ?Sized>(&mut self, now_ms: i64, rng: &mut E) -> LiveReading {
        let value = synth::synthesize(EcgMode::Live, 0.0, now_ms, rng);
        let timestamp = self
            .window
            .last()
            .map(|s| s.timestamp + synth::BACKFILL_SPACING_MS)
            .unwrap_or(now_ms);
        let sample = Sample::new(timestamp, value);
        let bands = transform(value, now_ms, rng);
        let flags = flag(value, &bands);
        self.window.push(sample);
        LiveReading {
            sample,
            bands,
            flags,
        }
    }
    pub fn window(&self) -> &Window<Sample> {
        &self.window
    }
    /// Derived EEG view of the whole window, one band vector per sample.
    /// An empty window falls back to a standalone mock history ending at `now_ms`.
    pub fn eeg_series<E: Entropy + ?Sized>(&self, now_ms: i64, rng: &mut E) -> Vec<EegSample> {
        if self.window.is_empty() {
            return mock_eeg_series(self.window.capacity(), now_ms, rng);
        }
        transform_series(self.window.iter(), rng)
    }
}
/// Index-driven walker behind the redraw chart.
pub struct ChartPipeline {
    window: Window<ChartPoint>,
    ticks: u64,
    step: f64,
}
impl ChartPipeline {
    /// Pre-fill the window with points at `t = 0, step, 2*step, ...`.
    pub fn seeded<E: Entropy + ?Sized>(
        capacity: usize,
        step: f64,
        rng: &mut E,
    ) -> Result<Self, SignalError> {
        let mut window = Window::with_capacity(capacity)?;
        for i in 0..capacity {
            window.push(Self::point(i as f64 * step, rng));
        }
        let ticks = capacity.saturating_sub(1) as u64;
        Ok(Self { window, ticks, step })
    }
    /// Next point at `t = n * step`, computed from the tick count so `t` never drifts.
    pub fn tick<E: Entropy + ?Sized>(&mut self, rng: &mut E) -> ChartPoint {
        self.ticks += 1;
        let point = Self::point(self.t(), rng);
        self.window.push(point);
        point
    }
    pub fn window(&self) -> &Window<ChartPoint> {
        &self.window
    }
    pub fn t(&self) -> f64 {
        self.ticks as f64 * self.step
    }
    fn point<E: Entropy + ?Sized>(t: f64, rng: &mut E) -> ChartPoint {
        let ecg = indexed_ecg(t, rng);
        let eeg = chart_eeg(t, rng);
        ChartPoint { t, ecg, eeg }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::source::{ConstantEntropy, RngEntropy};
    use approx::assert_relative_eq;
    #[test]
    fn live_tick_appends_after_newest_point_and_keeps_capacity() {
        let mut rng = RngEntropy::seeded(1);
        let now = 1_700_000_000_000;
        let mut pipeline = LivePipeline::seeded(100, now, &mut rng).unwrap();
        let first = pipeline.window().first().copied().unwrap();
        let reading = pipeline.tick(now + 1_000, &mut rng);
        assert_eq!(reading.sample.timestamp, now + 1_000);
        assert_eq!(pipeline.window().len(), 100);
        assert_eq!(pipeline.window().last(), Some(&reading.sample));
        assert_ne!(pipeline.window().first(), Some(&first));
    }
    #[test]
    fn live_reading_is_consistent_with_stages() {
        let mut rng = ConstantEntropy(0.0);
        let mut pipeline = LivePipeline::empty(10).unwrap();
        let now = 500;
        let reading = pipeline.tick(now, &mut rng);
        assert_eq!(reading.sample.timestamp, now);
        // inside the R-wave
        assert_relative_eq!(reading.sample.value, (500.0_f64 * 0.0002).sin() * 0.5 + 1.0);
        assert_eq!(reading.bands, transform(reading.sample.value, now, &mut rng));
        assert_eq!(reading.flags, flag(reading.sample.value, &reading.bands));
    }
    #[test]
    fn eeg_series_covers_window() {
        let mut rng = RngEntropy::seeded(9);
        let pipeline = LivePipeline::seeded(20, 50_000, &mut rng).unwrap();
        let series = pipeline.eeg_series(99_999, &mut rng);
        assert_eq!(series.len(), 20);
        assert_eq!(series[19].timestamp, 50_000);
    }
    #[test]
    fn empty_window_falls_back_to_mock_eeg() {
        let mut rng = ConstantEntropy(0.0);
        let pipeline = LivePipeline::empty(100).unwrap();
        let series = pipeline.eeg_series(200_000, &mut rng);
        assert_eq!(series.len(), 100);
        assert_eq!(series[99].timestamp, 200_000);
        assert_eq!(series, mock_eeg_series(100, 200_000, &mut rng));
    }
    #[test]
    fn chart_walker_advances_by_step() {
        let mut rng = ConstantEntropy(0.0);
        let mut chart = ChartPipeline::seeded(100, 0.1, &mut rng).unwrap();
        assert_eq!(chart.window().len(), 100);
        assert_relative_eq!(chart.window().last().unwrap().t, 9.9, epsilon = 1e-9);
        let next = chart.tick(&mut rng);
        assert_relative_eq!(next.t, 10.0, epsilon = 1e-9);
        assert_relative_eq!(next.ecg, indexed_ecg(next.t, &mut rng));
        assert_eq!(chart.window().len(), 100);
        assert_relative_eq!(chart.window().first().unwrap().t, 0.1, epsilon = 1e-9);
    }
    #[test]
    fn chart_time_does_not_drift_over_long_runs() {
        let mut rng = ConstantEntropy(0.0);
        let mut chart = ChartPipeline::seeded(100, 0.1, &mut rng).unwrap();
        let mut last = chart.window().last().copied().unwrap();
        for _ in 0..100_000 {
            last = chart.tick(&mut rng);
        }
        assert_eq!(last.t, 100_099_f64 * 0.1);
        assert_eq!(chart.t(), last.t);
    }
}
