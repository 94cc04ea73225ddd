// src/api/fit.rs
//! Fitness-tracker session and its simulated data source.
//!
//! The session is a plain value: every transition takes the old session and
//! returns the new one, so the caller decides where it lives.
use std::thread;
use std::time::Duration as StdDuration;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use crate::api::ApiError;
use crate::config::FitLatency;
use crate::signal::{Clock, Entropy};
const MINUTE_MS: i64 = 60_000;
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitState {
    #[default]
    Uninitialized,
    Initialized,
    Authorized,
}
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitSession {
    pub state: FitState,
    pub last_sync: Option<DateTime<Utc>>,
}
impl FitSession {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_authorized(&self) -> bool {
        self.state == FitState::Authorized
    }
    pub fn initialized(self) -> Self {
        match self.state {
            FitState::Uninitialized => Self {
                state: FitState::Initialized,
                ..self
            },
            _ => self,
        }
    }
    /// Authorize, initializing first when needed.
    pub fn authorized(self) -> Self {
        Self {
            state: FitState::Authorized,
            ..self.initialized()
        }
    }
    /// Drop authorization. An initialized client stays initialized.
    pub fn revoked(self) -> Self {
        match self.state {
            FitState::Authorized => Self {
                state: FitState::Initialized,
                ..self
            },
            _ => self,
        }
    }
    pub fn synced(self, at: DateTime<Utc>) -> Self {
        Self {
            last_sync: Some(at),
            ..self
        }
    }
    pub fn require_authorized(&self) -> Result<(), ApiError> {
        if self.is_authorized() {
            Ok(())
        } else {
            Err(ApiError::NotAuthorized)
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    pub timestamp: i64,
    /// Beats per minute.
    pub value: u32,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Still,
    Walking,
    Running,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SleepStage {
    Awake,
    Light,
    Deep,
    Rem,
}
/// Anything that can label a [`TimedSegment`].
pub trait SegmentKind: Copy {
    fn label(self) -> &'static str;
}
impl SegmentKind for ActivityKind {
    fn label(self) -> &'static str {
        match self {
            ActivityKind::Still => "Still (not moving)",
            ActivityKind::Walking => "Walking",
            ActivityKind::Running => "Running",
        }
    }
}
impl SegmentKind for SleepStage {
    fn label(self) -> &'static str {
        match self {
            SleepStage::Awake => "Awake",
            SleepStage::Light => "Light sleep",
            SleepStage::Deep => "Deep sleep",
            SleepStage::Rem => "REM sleep",
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedSegment<K> {
    #[serde(rename = "type")]
    pub kind: K,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Minutes.
    pub duration: f64,
}
pub type ActivitySegment = TimedSegment<ActivityKind>;
pub type SleepSegment = TimedSegment<SleepStage>;
/// A fetch result together with the session it left behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched<T> {
    pub session: FitSession,
    pub data: Vec<T>,
}
const ACTIVITY_PLAN: [(ActivityKind, i64); 5] = [
    (ActivityKind::Still, 30),
    (ActivityKind::Walking, 15),
    (ActivityKind::Running, 20),
    (ActivityKind::Still, 60),
    (ActivityKind::Walking, 10),
];
const SLEEP_PLAN: [(SleepStage, i64); 7] = [
    (SleepStage::Awake, 10),
    (SleepStage::Light, 120),
    (SleepStage::Deep, 90),
    (SleepStage::Rem, 60),
    (SleepStage::Light, 90),
    (SleepStage::Deep, 60),
    (SleepStage::Rem, 30),
];
/// Dashboard-facing fitness integration.
pub trait FitnessTracker {
    fn connect(&mut self, session: FitSession) -> FitSession;
    fn disconnect(&mut self, session: FitSession) -> FitSession;
    /// No-op unless the session is authorized.
    fn sync(&mut self, session: FitSession) -> FitSession;
    fn fetch_heart_rate(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<HeartRatePoint>, ApiError>;
    fn fetch_activity(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<ActivitySegment>, ApiError>;
    fn fetch_sleep(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<SleepSegment>, ApiError>;
}
/// Tracker that answers every call locally after a configurable delay.
pub struct SimulatedFitTracker<E, C> {
    latency: FitLatency,
    rng: E,
    clock: C,
}
impl<E: Entropy, C: Clock> SimulatedFitTracker<E, C> {
    pub fn new(latency: FitLatency, rng: E, clock: C) -> Self {
        Self {
            latency,
            rng,
            clock,
        }
    }
    pub fn initialize(&mut self, session: FitSession) -> FitSession {
        if session.state != FitState::Uninitialized {
            return session;
        }
        pause(self.latency.initialize_ms);
        log::info!("fitness client initialized");
        session.initialized()
    }
    pub fn authorize(&mut self, session: FitSession) -> FitSession {
        let session = self.initialize(session);
        pause(self.latency.authorize_ms);
        log::info!("fitness client authorized");
        session.authorized()
    }
    pub fn revoke(&mut self, session: FitSession) -> FitSession {
        pause(self.latency.revoke_ms);
        log::info!("fitness authorization revoked");
        session.revoked()
    }
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }
    fn begin_fetch(&self, session: &FitSession, what: &str) -> Result<(), ApiError> {
        if let Err(e) = session.require_authorized() {
            log::error!("failed to fetch {what} data: {e}");
            return Err(e);
        }
        pause(self.latency.fetch_ms);
        Ok(())
    }
    fn finish<T>(&self, session: &FitSession, data: Vec<T>) -> Fetched<T> {
        Fetched {
            session: session.clone().synced(self.now()),
            data,
        }
    }
}
impl<E: Entropy, C: Clock> FitnessTracker for SimulatedFitTracker<E, C> {
    fn connect(&mut self, session: FitSession) -> FitSession {
        let session = self.authorize(session);
        session.synced(self.now())
    }
    fn disconnect(&mut self, session: FitSession) -> FitSession {
        self.revoke(session)
    }
    fn sync(&mut self, session: FitSession) -> FitSession {
        if !session.is_authorized() {
            log::debug!("sync skipped, fitness client not authorized");
            return session;
        }
        pause(self.latency.sync_ms);
        let now = self.now();
        log::info!("fitness data synced at {now}");
        session.synced(now)
    }
    fn fetch_heart_rate(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<HeartRatePoint>, ApiError> {
        self.begin_fetch(session, "heart rate")?;
        let end_ms = end.timestamp_millis();
        let mut data = Vec::new();
        let mut ts = start.timestamp_millis();
        while ts <= end_ms {
            data.push(HeartRatePoint {
                timestamp: ts,
                value: heart_rate(ts, &mut self.rng),
            });
            ts += MINUTE_MS;
        }
        Ok(self.finish(session, data))
    }
    fn fetch_activity(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<ActivitySegment>, ApiError> {
        self.begin_fetch(session, "activity")?;
        let data = lay_out(&ACTIVITY_PLAN, start, end);
        Ok(self.finish(session, data))
    }
    fn fetch_sleep(
        &mut self,
        session: &FitSession,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Fetched<SleepSegment>, ApiError> {
        self.begin_fetch(session, "sleep")?;
        let data = match sleep_window(start, end) {
            Some((from, to)) => lay_out(&SLEEP_PLAN, from, to),
            None => Vec::new(),
        };
        Ok(self.finish(session, data))
    }
}
/// `round(70 + sin(ts*0.0001)*10 + U(-5, 5))`
pub fn heart_rate<E: Entropy + ?Sized>(timestamp_ms: i64, rng: &mut E) -> u32 {
    let base = 70.0 + (timestamp_ms as f64 * 0.0001).sin() * 10.0;
    (base + rng.uniform(-5.0, 5.0)).round().max(0.0) as u32
}
/// The night ending on `start`'s day: 23:00 UTC the day before to 07:00,
/// clipped to `[start, end]`. `None` when the two do not overlap.
pub fn sleep_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let day = start.date_naive();
    let day_start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?);
    let night_start = day_start - Duration::hours(1);
    let night_end = day_start + Duration::hours(7);
    if night_start < end && night_end > start {
        Some((night_start.max(start), night_end.min(end)))
    } else {
        None
    }
}
/// `[end - hours, end]`, with negative counts treated as zero. `None` when
/// the start would fall outside chrono's range.
pub fn lookback(end: DateTime<Utc>, hours: i64) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let span = Duration::try_hours(hours.max(0))?;
    Some((end.checked_sub_signed(span)?, end))
}
// plan durations are minutes; segments stop once the range is used up
fn lay_out<K: SegmentKind>(plan: &[(K, i64)], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimedSegment<K>> {
    let mut segments = Vec::with_capacity(plan.len());
    let mut current = start;
    for &(kind, minutes) in plan {
        if current >= end {
            break;
        }
        let segment_end = (current + Duration::minutes(minutes)).min(end);
        segments.push(TimedSegment {
            kind,
            name: kind.label().to_owned(),
            start_time: current,
            end_time: segment_end,
            duration: (segment_end - current).num_milliseconds() as f64 / MINUTE_MS as f64,
        });
        current = segment_end;
    }
    segments
}
fn pause(ms: u64) {
    if ms > 0 {
        thread::sleep(StdDuration::from_millis(ms));
    }
}
