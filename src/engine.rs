// src/engine.rs
//! Background feeds. Each feed runs on its own thread, owns its window and
//! reports through a channel; the live stream and the redraw chart never share
//! a clock or a window.
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crate::config::DashboardConfig;
use crate::signal::{ChartPipeline, Clock, Entropy, LivePipeline, SignalError};
use crate::types::FeedMessage;
/// Handle to a running feed. Stopping (or dropping) it joins the worker, so no
/// message is produced once `stop` returns.
pub struct FeedHandle {
    name: String,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}
impl FeedHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
    pub fn stop(mut self) {
        self.shutdown();
    }
    fn shutdown(&mut self) {
        // dropping the sender wakes the worker out of recv_timeout
        self.stop_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("feed '{}' panicked", self.name);
            } else {
                log::info!("feed '{}' stopped", self.name);
            }
        }
    }
}
impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
/// Run `tick` every `period` until stopped or until `tick` returns `false`.
pub fn spawn_periodic<F>(name: &str, period: Duration, mut tick: F) -> Result<FeedHandle, SignalError>
where
    F: FnMut() -> bool + Send + 'static,
{
    if period.is_zero() {
        return Err(SignalError::InvalidPeriod);
    }
    let (stop_tx, stop_rx) = channel::<()>();
    let thread_name = name.to_owned();
    let worker = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if !tick() {
                        log::debug!("feed '{thread_name}' has no listener left");
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;
    log::info!("feed '{name}' started, period {period:?}");
    Ok(FeedHandle {
        name: name.to_owned(),
        stop_tx: Some(stop_tx),
        worker: Some(worker),
    })
}
/// Wall-clock ECG stream: backfilled window, then one transformed and flagged
/// sample per `live_period`.
pub fn spawn_live_feed<E, C>(
    config: &DashboardConfig,
    tx: Sender<FeedMessage>,
    mut rng: E,
    clock: C,
) -> Result<FeedHandle, SignalError>
where
    E: Entropy + Send + 'static,
    C: Clock + Send + 'static,
{
    let mut pipeline = LivePipeline::seeded(config.window_capacity, clock.now_ms(), &mut rng)?;
    tx.send(FeedMessage::Log(format!(
        "live feed seeded with {} samples",
        pipeline.window().len()
    )))
    .ok();
    spawn_periodic("live-feed", config.live_period(), move || {
        let reading = pipeline.tick(clock.now_ms(), &mut rng);
        log::debug!(
            "live sample t={} ecg={:.3}",
            reading.sample.timestamp,
            reading.sample.value
        );
        if reading.flags.any() {
            log::warn!(
                "ECG/EEG relationship out of range at t={}: {:?}",
                reading.sample.timestamp,
                reading.flags
            );
        }
        tx.send(FeedMessage::Live(reading)).is_ok()
    })
}
/// Index-driven redraw walker, one point per `chart_period`.
pub fn spawn_chart_feed<E>(
    config: &DashboardConfig,
    tx: Sender<FeedMessage>,
    mut rng: E,
) -> Result<FeedHandle, SignalError>
where
    E: Entropy + Send + 'static,
{
    let mut pipeline = ChartPipeline::seeded(config.window_capacity, config.chart_step, &mut rng)?;
    tx.send(FeedMessage::Log(format!(
        "chart feed seeded with {} points",
        pipeline.window().len()
    )))
    .ok();
    spawn_periodic("chart-feed", config.chart_period(), move || {
        let point = pipeline.tick(&mut rng);
        tx.send(FeedMessage::Chart(point)).is_ok()
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ManualClock, RngEntropy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    fn fast_config() -> DashboardConfig {
        DashboardConfig {
            live_period_ms: 5,
            chart_period_ms: 2,
            window_capacity: 10,
            ..Default::default()
        }
    }
    #[test]
    fn zero_period_is_rejected() {
        let result = spawn_periodic("noop", Duration::ZERO, || true);
        assert!(matches!(result, Err(SignalError::InvalidPeriod)));
    }
    #[test]
    fn stop_is_final() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let handle = spawn_periodic("counter", Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .unwrap();
        while ticks.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        handle.stop();
        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }
    #[test]
    fn worker_exits_when_tick_declines() {
        let handle = spawn_periodic("once", Duration::from_millis(1), || false).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_running());
    }
    #[test]
    fn live_feed_reports_consecutive_samples() {
        let (tx, rx) = channel();
        let clock = ManualClock::at(1_000_000);
        let handle =
            spawn_live_feed(&fast_config(), tx, RngEntropy::seeded(4), clock.clone()).unwrap();
        let mut live = Vec::new();
        while live.len() < 3 {
            match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
                FeedMessage::Live(reading) => live.push(reading),
                FeedMessage::Log(_) => {}
                FeedMessage::Chart(_) => panic!("live feed sent a chart point"),
            }
        }
        handle.stop();
        assert_eq!(live[0].sample.timestamp, 1_001_000);
        assert_eq!(live[1].sample.timestamp, 1_002_000);
        assert_eq!(live[2].sample.timestamp, 1_003_000);
        // drain what was already queued; nothing new may arrive afterwards
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }
    #[test]
    fn feeds_run_independently() {
        let config = fast_config();
        let (live_tx, live_rx) = channel();
        let (chart_tx, chart_rx) = channel();
        let live =
            spawn_live_feed(&config, live_tx, RngEntropy::seeded(1), ManualClock::at(0)).unwrap();
        let chart = spawn_chart_feed(&config, chart_tx, RngEntropy::seeded(2)).unwrap();
        live.stop();
        let mut chart_points = 0;
        while chart_points < 3 {
            if let FeedMessage::Chart(point) = chart_rx.recv_timeout(Duration::from_secs(2)).unwrap()
            {
                assert!(point.t > 0.9);
                chart_points += 1;
            }
        }
        drop(chart);
        assert!(live_rx.iter().all(|m| !matches!(m, FeedMessage::Chart(_))));
        assert!(chart_rx.try_iter().all(|m| !matches!(m, FeedMessage::Live(_))));
    }
}
