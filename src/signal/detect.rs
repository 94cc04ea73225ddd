//! Batch anomaly detection over a recorded ECG/EEG window.
//!
//! All three detectors share the same shape: skip five points at either edge
//! and require the deviation to hold for three consecutive points. Every index
//! that passes is reported, so a long episode yields one record per point.
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use crate::signal::flagger;
use crate::types::{Anomaly, AnomalyKind, AnomalyStatus, Band, EegSample, Sample, Severity};
/// Points ignored at both ends of a series.
pub const EDGE_SAMPLES: usize = 5;
/// Deviation (in σ) that opens a candidate.
pub const TRIGGER_SIGMA: f64 = 2.5;
/// Deviation (in σ) the two following points must keep.
pub const SUSTAIN_SIGMA: f64 = 2.0;
/// Deviation (in σ) above which an anomaly is rated high.
pub const HIGH_SIGMA: f64 = 3.0;
/// Mean and population standard deviation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub std_dev: f64,
}
impl SeriesStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
    /// `|value - mean|` in units of σ; zero when the series is flat.
    pub fn sigma(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 {
            (value - self.mean).abs() / self.std_dev
        } else {
            0.0
        }
    }
}
/// Which detectors to run. `None` in [`detect_anomalies`] runs all of them.
pub type KindFilter = Option<AnomalyKind>;
pub fn detect_anomalies(ecg: &[Sample], eeg: &[EegSample], kind: KindFilter) -> Vec<Anomaly> {
    let wants = |k: AnomalyKind| kind.map_or(true, |only| only == k);
    let mut anomalies = Vec::new();
    if !ecg.is_empty() && wants(AnomalyKind::Ecg) {
        anomalies.extend(detect_ecg_anomalies(ecg));
    }
    if !eeg.is_empty() && wants(AnomalyKind::Eeg) {
        anomalies.extend(detect_eeg_anomalies(eeg));
    }
    if !ecg.is_empty() && !eeg.is_empty() && wants(AnomalyKind::Combined) {
        anomalies.extend(detect_combined_anomalies(ecg, eeg));
    }
    log::debug!(
        "detected {} anomalies over {} ECG / {} EEG points",
        anomalies.len(),
        ecg.len(),
        eeg.len()
    );
    anomalies
}
pub fn detect_ecg_anomalies(ecg: &[Sample]) -> Vec<Anomaly> {
    let Some(stats) = SeriesStats::from_values(ecg.iter().map(|s| s.value)) else {
        return Vec::new();
    };
    if stats.std_dev == 0.0 {
        return Vec::new();
    }
    scan(ecg.len(), |i| {
        let sigma = stats.sigma(ecg[i].value);
        if sigma <= TRIGGER_SIGMA {
            return None;
        }
        let sustained = (1..=2).all(|k| stats.sigma(ecg[i + k].value) > SUSTAIN_SIGMA);
        if !sustained {
            return None;
        }
        let severity = if sigma > HIGH_SIGMA {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(new_anomaly(
            ecg[i].timestamp,
            AnomalyKind::Ecg,
            severity,
            "Irregular heartbeat pattern detected".into(),
            "The ECG shows signs of arrhythmia with irregular R-R intervals. \
             This pattern has persisted for over 5 minutes."
                .into(),
        ))
    })
}
pub fn detect_eeg_anomalies(eeg: &[EegSample]) -> Vec<Anomaly> {
    let stats: Vec<(Band, SeriesStats)> = Band::ALL
        .iter()
        .filter_map(|&band| {
            SeriesStats::from_values(eeg.iter().map(|p| p.bands.get(band))).map(|s| (band, s))
        })
        .collect();
    if stats.len() != Band::ALL.len() {
        return Vec::new();
    }
    scan(eeg.len(), |i| {
        let point = &eeg[i].bands;
        // 按 alpha/beta/theta/delta 顺序取第一个越界的频段做持续性检查
        let (band, band_stats) = stats
            .iter()
            .find(|(band, s)| s.sigma(point.get(*band)) > TRIGGER_SIGMA)?;
        let sustained =
            (1..=2).all(|k| band_stats.sigma(eeg[i + k].bands.get(*band)) > SUSTAIN_SIGMA);
        if !sustained {
            return None;
        }
        let (worst, max_deviation) = stats
            .iter()
            .map(|(band, s)| (*band, s.sigma(point.get(*band))))
            .fold((Band::Alpha, f64::MIN), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });
        let severity = if max_deviation > HIGH_SIGMA {
            Severity::High
        } else if max_deviation > TRIGGER_SIGMA {
            Severity::Medium
        } else {
            Severity::Low
        };
        let name = worst.name();
        let mut capitalized = name.to_owned();
        capitalized[..1].make_ascii_uppercase();
        Some(new_anomaly(
            eeg[i].timestamp,
            AnomalyKind::Eeg,
            severity,
            format!("Unusual {name} wave activity"),
            format!(
                "{capitalized} wave patterns show unusual amplitude variations during rest state. \
                 This may indicate increased stress or anxiety."
            ),
        ))
    })
}
pub fn detect_combined_anomalies(ecg: &[Sample], eeg: &[EegSample]) -> Vec<Anomaly> {
    let len = ecg.len().min(eeg.len());
    let related = |i: usize| flagger::flag(ecg[i].value, &eeg[i].bands).any();
    scan(len, |i| {
        if !(related(i) && related(i + 1) && related(i + 2)) {
            return None;
        }
        Some(new_anomaly(
            ecg[i].timestamp,
            AnomalyKind::Combined,
            Severity::Low,
            "Minor correlation anomaly between EEG and ECG".into(),
            "The correlation between EEG and ECG patterns shows a slight deviation from the \
             baseline. This is likely temporary but worth monitoring."
                .into(),
        ))
    })
}
/// Walk indices `EDGE..=len-EDGE`, calling `check` on each candidate. `check`
/// may index up to `i + 2`.
fn scan(len: usize, mut check: impl FnMut(usize) -> Option<Anomaly>) -> Vec<Anomaly> {
    let mut found = Vec::new();
    let Some(last) = len.checked_sub(EDGE_SAMPLES) else {
        return found;
    };
    for i in EDGE_SAMPLES..=last {
        found.extend(check(i));
    }
    found
}
fn new_anomaly(
    timestamp_ms: i64,
    kind: AnomalyKind,
    severity: Severity,
    description: String,
    details: String,
) -> Anomaly {
    Anomaly {
        id: Uuid::new_v4().to_string(),
        timestamp: DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default(),
        kind,
        severity,
        description,
        details,
        status: AnomalyStatus::Active,
    }
}
/// The three alerts the dashboard shows before any detection has run.
pub fn demo_anomalies(now: DateTime<Utc>) -> Vec<Anomaly> {
    vec![
        Anomaly {
            id: "1".into(),
            timestamp: now,
            kind: AnomalyKind::Ecg,
            severity: Severity::High,
            description: "Irregular heartbeat pattern detected".into(),
            details: "The ECG shows signs of arrhythmia with irregular R-R intervals. \
                      This pattern has persisted for over 5 minutes."
                .into(),
            status: AnomalyStatus::Active,
        },
        Anomaly {
            id: "2".into(),
            timestamp: now - Duration::minutes(30),
            kind: AnomalyKind::Eeg,
            severity: Severity::Medium,
            description: "Unusual alpha wave activity".into(),
            details: "Alpha wave patterns show unusual amplitude variations during rest state. \
                      This may indicate increased stress or anxiety."
                .into(),
            status: AnomalyStatus::Active,
        },
        Anomaly {
            id: "3".into(),
            timestamp: now - Duration::minutes(120),
            kind: AnomalyKind::Combined,
            severity: Severity::Low,
            description: "Minor correlation anomaly between EEG and ECG".into(),
            details: "The correlation between EEG and ECG patterns shows a slight deviation \
                      from the baseline. This is likely temporary but worth monitoring."
                .into(),
            status: AnomalyStatus::Resolved,
        },
    ]
}
