//! Sensor Drivers
//!
//! Abstraction over where readings come from: hardware, IoT gateways, HTTP APIs.

mod simulated;

pub use simulated::SimulatedDriver;

use async_trait::async_trait;
use sot_core::world::Scalar;

use crate::error::Result;
use crate::model::SensorKind;

/// Sensor driver trait (Strategy pattern)
///
/// Implement this for each data source. `Ok(None)` means the driver has no
/// reading for that kind.
#[async_trait]
pub trait SensorDriver: Send + Sync {
    /// Take one reading for a sensor of the given kind
    async fn read(&self, kind: &SensorKind) -> Result<Option<Scalar>>;

    /// Check if the data source is reachable
    async fn health_check(&self) -> bool;

    /// Driver name
    fn name(&self) -> &str;
}
