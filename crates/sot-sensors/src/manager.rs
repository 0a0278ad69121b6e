//! Sensor Data Manager
//!
//! Collects readings from registered sensors, derives features and turns threshold
//! crossings into human-readable events.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use sot_core::world::{Scalar, WorldModel};

use crate::driver::{SensorDriver, SimulatedDriver};
use crate::error::Result;
use crate::model::{SensorKind, SensorReadings, SensorRegistration, Thresholds};

/// Kinds read when nothing is registered
const FALLBACK_KINDS: [SensorKind; 3] =
    [SensorKind::Temperature, SensorKind::Humidity, SensorKind::Motion];

/// Heat index weight on relative humidity
const HEAT_INDEX_HUMIDITY_FACTOR: f64 = 0.05;

pub struct SensorDataManager {
    driver: Arc<dyn SensorDriver>,
    sensors: IndexMap<String, SensorRegistration>,
    thresholds: Thresholds,
}

impl Default for SensorDataManager {
    fn default() -> Self {
        Self::new(Arc::new(SimulatedDriver::new()))
    }
}

impl SensorDataManager {
    pub fn new(driver: Arc<dyn SensorDriver>) -> Self {
        tracing::info!(driver = driver.name(), "SensorDataManager initialized");
        Self {
            driver,
            sensors: IndexMap::new(),
            thresholds: Thresholds::default(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn sensors(&self) -> impl Iterator<Item = (&String, &SensorRegistration)> {
        self.sensors.iter()
    }

    /// Register a sensor. Returns `false` if the id is already taken.
    pub fn register_sensor(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<SensorKind>,
        config: serde_json::Value,
    ) -> bool {
        let id = id.into();
        if self.sensors.contains_key(&id) {
            tracing::warn!(sensor = %id, "Sensor already registered");
            return false;
        }

        let kind = kind.into();
        tracing::info!(sensor = %id, %kind, "Registered sensor");
        self.sensors.insert(id, SensorRegistration::new(kind, config));
        true
    }

    /// Read one sensor and remember the reading.
    ///
    /// Unknown ids yield `Ok(None)`.
    pub async fn read_sensor(&mut self, id: &str) -> Result<Option<Scalar>> {
        let Some(registration) = self.sensors.get_mut(id) else {
            tracing::warn!(sensor = %id, "Sensor not registered");
            return Ok(None);
        };

        let reading = self.driver.read(&registration.kind).await?;
        registration.last_reading.clone_from(&reading);
        registration.last_updated = Some(Utc::now());

        tracing::debug!(sensor = %id, ?reading, "Read sensor");
        Ok(reading)
    }

    /// Read every registered sensor, keyed by kind, plus `timestamp`.
    ///
    /// With nothing registered, temperature, humidity and motion are read
    /// straight from the driver. Failing sensors are skipped.
    pub async fn read_all(&mut self) -> SensorReadings {
        let mut readings = SensorReadings::new();

        if self.sensors.is_empty() {
            tracing::debug!("No sensors registered, using driver defaults");
            for kind in &FALLBACK_KINDS {
                match self.driver.read(kind).await {
                    Ok(value) => {
                        readings.insert(kind.to_string(), value.unwrap_or(Scalar::Null));
                    }
                    Err(e) => tracing::warn!(%kind, "Fallback reading failed: {}", e),
                }
            }
        } else {
            let ids: Vec<String> = self.sensors.keys().cloned().collect();
            for id in ids {
                match self.read_sensor(&id).await {
                    Ok(value) => {
                        if let Some(registration) = self.sensors.get(&id) {
                            readings.insert(
                                registration.kind.to_string(),
                                value.unwrap_or(Scalar::Null),
                            );
                        }
                    }
                    Err(e) => tracing::warn!(sensor = %id, "Sensor read failed: {}", e),
                }
            }
        }

        readings.insert("timestamp".into(), Scalar::Number(now_secs()));
        readings
    }

    /// Pass through known quantities and derive `heat_index`.
    pub fn preprocess(&self, raw: &SensorReadings) -> SensorReadings {
        let mut out = SensorReadings::new();

        for key in ["temperature", "humidity", "motion"] {
            if let Some(value) = raw.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }

        let temperature = out.get("temperature").and_then(Scalar::as_f64);
        let humidity = out.get("humidity").and_then(Scalar::as_f64);
        if let (Some(t), Some(h)) = (temperature, humidity) {
            out.insert(
                "heat_index".into(),
                Scalar::Number(HEAT_INDEX_HUMIDITY_FACTOR.mul_add(h, t)),
            );
        }

        let timestamp = raw
            .get("timestamp")
            .cloned()
            .unwrap_or_else(|| Scalar::Number(now_secs()));
        out.insert("timestamp".into(), timestamp);

        out
    }

    /// Threshold checks against the current world model, in a fixed order:
    /// temperature high/low, humidity high/low, motion.
    pub fn detect_events(&self, world: &WorldModel) -> Vec<String> {
        let mut events = Vec::new();
        let Thresholds { temperature, humidity } = &self.thresholds;

        if let Some(t) = world.get_f64("temperature") {
            if t > temperature.high {
                events.push(format!(
                    "High temperature detected: {t:.1}°C exceeds threshold of {:.1}°C",
                    temperature.high
                ));
            }
            if t < temperature.low {
                events.push(format!(
                    "Low temperature detected: {t:.1}°C below threshold of {:.1}°C",
                    temperature.low
                ));
            }
        }

        if let Some(h) = world.get_f64("humidity") {
            if h > humidity.high {
                events.push(format!(
                    "High humidity detected: {h:.1}% exceeds threshold of {:.1}%",
                    humidity.high
                ));
            }
            if h < humidity.low {
                events.push(format!(
                    "Low humidity detected: {h:.1}% below threshold of {:.1}%",
                    humidity.low
                ));
            }
        }

        if world.get("motion").is_some_and(|m| m.is_truthy()) {
            events.push("Motion detected".into());
        }

        if !events.is_empty() {
            tracing::info!(count = events.len(), "Detected sensor events");
        }
        events
    }
}

#[allow(clippy::cast_precision_loss)]
fn now_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
