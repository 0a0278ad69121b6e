//! Error Types for Sensors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SensorError>;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Sensor not registered: {0}")]
    UnknownSensor(String),

    #[error("Sensor already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
