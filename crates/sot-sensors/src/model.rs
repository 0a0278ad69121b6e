//! Domain Models
//!
//! Sensor kinds, registrations and the threshold table used for event detection.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sot_core::world::Scalar;

/// One batch of readings keyed by sensor kind, plus `timestamp`
pub type SensorReadings = IndexMap<String, Scalar>;

/// Kind of a registered sensor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Motion,
    /// Anything the simulated driver does not know how to produce
    Other(String),
}

impl SensorKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Motion => "motion",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SensorKind {
    fn from(value: &str) -> Self {
        match value {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            "motion" => Self::Motion,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for SensorKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SensorKind> for String {
    fn from(value: SensorKind) -> Self {
        value.as_str().to_string()
    }
}

/// A registered sensor and its last known state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorRegistration {
    pub kind: SensorKind,

    /// Free-form driver configuration
    #[serde(default)]
    pub config: serde_json::Value,

    pub last_reading: Option<Scalar>,

    pub last_updated: Option<DateTime<Utc>>,
}

impl SensorRegistration {
    pub const fn new(kind: SensorKind, config: serde_json::Value) -> Self {
        Self {
            kind,
            config,
            last_reading: None,
            last_updated: None,
        }
    }
}

/// High/low limits for one measured quantity
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub high: f64,
    pub low: f64,
}

/// Event detection thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Celsius
    pub temperature: Band,

    /// Percent
    pub humidity: Band,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: Band { high: 30.0, low: 5.0 },
            humidity: Band { high: 70.0, low: 30.0 },
        }
    }
}
