//! # sot-sensors
//!
//! Sensor intake for the Sketch-of-Thought agent: a registry of sensors read
//! through a pluggable [`SensorDriver`], light preprocessing, and threshold
//! events that the agent turns into queries.
//!
//! ```text
//! driver.read ──► read_all ──► preprocess ──► world model ──► detect_events
//!                 {kind: v,     + heat_index                  ["High temperature ...",
//!                  timestamp}                                  "Motion detected"]
//! ```

pub mod driver;
pub mod error;
pub mod manager;
pub mod model;

pub use driver::{SensorDriver, SimulatedDriver};
pub use error::{Result, SensorError};
pub use manager::SensorDataManager;
pub use model::{Band, SensorKind, SensorReadings, SensorRegistration, Thresholds};
