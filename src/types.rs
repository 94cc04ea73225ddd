// src/types.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ECG reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

// EEG 频段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Alpha,
    Beta,
    Theta,
    Delta,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Alpha, Band::Beta, Band::Theta, Band::Delta];

    pub fn name(self) -> &'static str {
        match self {
            Band::Alpha => "alpha",
            Band::Beta => "beta",
            Band::Theta => "theta",
            Band::Delta => "delta",
        }
    }

    /// Linear coefficient applied to `|ecg|` for this band.
    pub fn scale(self) -> f64 {
        match self {
            Band::Alpha => 0.7,
            Band::Beta => 0.5,
            Band::Theta => 0.3,
            Band::Delta => 0.2,
        }
    }
}

/// Derived EEG band powers for one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandVector {
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
}

impl BandVector {
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Theta => self.theta,
            Band::Delta => self.delta,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Band) -> f64) -> Self {
        Self {
            alpha: f(Band::Alpha),
            beta: f(Band::Beta),
            theta: f(Band::Theta),
            delta: f(Band::Delta),
        }
    }
}

/// Band vector keyed by the timestamp of the ECG sample it came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EegSample {
    pub timestamp: i64,
    #[serde(flatten)]
    pub bands: BandVector,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyFlag {
    pub band: Band,
    pub is_anomalous: bool,
}

/// Per-band result of the flagger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandFlags {
    pub alpha: bool,
    pub beta: bool,
    pub theta: bool,
    pub delta: bool,
}

impl BandFlags {
    pub fn get(&self, band: Band) -> bool {
        match band {
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Theta => self.theta,
            Band::Delta => self.delta,
        }
    }

    pub fn any(&self) -> bool {
        self.alpha || self.beta || self.theta || self.delta
    }

    pub fn flags(&self) -> [AnomalyFlag; 4] {
        Band::ALL.map(|band| AnomalyFlag {
            band,
            is_anomalous: self.get(band),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    #[serde(rename = "ECG")]
    Ecg,
    #[serde(rename = "EEG")]
    Eeg,
    Combined,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::Ecg => "ECG",
            AnomalyKind::Eeg => "EEG",
            AnomalyKind::Combined => "Combined",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyStatus {
    Active,
    Resolved,
}

/// Health anomaly as shown on the alerts panel and sent to the LLM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub details: String,
    pub status: AnomalyStatus,
}

/// Point on the redraw chart: indexed ECG plus its companion EEG trace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub t: f64,
    pub ecg: f64,
    pub eeg: f64,
}

/// Output of one live tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveReading {
    pub sample: Sample,
    pub bands: BandVector,
    pub flags: BandFlags,
}

// 后台 feed 发给前端的消息
#[derive(Clone, Debug)]
pub enum FeedMessage {
    Log(String),
    Live(LiveReading),
    Chart(ChartPoint),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_flags_list_every_band_in_order() {
        let flags = BandFlags {
            alpha: false,
            beta: true,
            theta: false,
            delta: true,
        };
        let listed = flags.flags();
        assert_eq!(listed[1].band, Band::Beta);
        assert!(listed[1].is_anomalous);
        assert!(!listed[2].is_anomalous);
        assert!(flags.any());
        assert!(!BandFlags::default().any());
    }

    #[test]
    fn anomaly_serializes_with_dashboard_field_names() {
        let anomaly = Anomaly {
            id: "1".into(),
            timestamp: DateTime::from_timestamp_millis(0).unwrap(),
            kind: AnomalyKind::Ecg,
            severity: Severity::High,
            description: "d".into(),
            details: "x".into(),
            status: AnomalyStatus::Active,
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["type"], "ECG");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn eeg_sample_flattens_bands() {
        let sample = EegSample {
            timestamp: 5,
            bands: BandVector {
                alpha: 1.0,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["timestamp"], 5);
        assert_eq!(json["alpha"], 1.0);
    }
}
