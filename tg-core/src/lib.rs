//! Thermguard Core Library
//!
//! Thermal protection for fixed-configuration switch platforms.
//!
//! # Features
//!
//! - **Snapshot Sampling**: CPU, ASIC, and per-transceiver temperatures
//!   gathered once per poll cycle, failures degraded to fail-safe sentinels
//! - **Hysteretic Policy**: a four/five-level state machine with distinct
//!   rising and falling thresholds per slot
//! - **Fan Actuation**: level-to-duty mapping with a fan-failure override
//! - **Emergency Shutdown**: one-way lpmode/flush/power-off sequence on
//!   sustained over-temperature
//! - **Test Mode**: injected synthetic drifting sensors and dry-run actuators
//!
//! # Module Structure
//!
//! - `types`, `thresholds`, `constants` - data model and configuration
//! - `policy` - the level state machine
//! - `reader`, `actuator`, `shutdown` - the control-path components
//! - `platform` - capability traits at the hardware seam
//! - `hw/` - production adapters (sysfs, vendor CLI, telemetry, ipmitool)
//! - `sim` - synthetic test-mode implementations

pub mod actuator;
pub mod constants;
pub mod hw;
pub mod platform;
pub mod policy;
pub mod reader;
pub mod shutdown;
pub mod sim;
pub mod thresholds;
pub mod types;

// Re-export primary types
pub use types::{
    FanRecord, PolicyState, SensorKind, SensorReading, Snapshot, TemperatureSample, ThermalLevel,
};

pub use thresholds::{EdgeThresholds, ThresholdEdge, ThresholdTable};

pub use policy::{Decision, OtpBreach, PolicyEngine};

pub use actuator::FanActuator;
pub use reader::SensorReader;
pub use shutdown::ShutdownController;

pub use platform::{
    EmergencyPower, FanControl, SensorSource, Slot, ThermalReport, TransceiverControl,
};

// Re-export error types
pub use tg_error::{Result, ThermError};
