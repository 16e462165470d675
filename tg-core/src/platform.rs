//! Platform capability traits
//!
//! The policy path talks to hardware only through these seams. Production
//! implementations live in `hw/`; the synthetic test-mode implementations in
//! `sim` are injected at startup, never selected by a runtime branch inside
//! production code.

use tg_error::Result;

use crate::types::{FanRecord, SensorReading};

/// A monitored thermal slot address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Cpu,
    Asic,
    Transceiver(usize),
}

/// Source of raw temperatures and presence flags
pub trait SensorSource {
    /// Called once at the top of each poll cycle, before any reads
    fn begin_cycle(&mut self) {}

    /// Temperature of a slot in millidegrees Celsius
    fn read_temperature(&mut self, slot: Slot) -> SensorReading;

    /// Whether the slot is physically present (fixed sensors always are)
    fn present(&mut self, slot: Slot) -> bool;

    /// Interface name of a transceiver port
    fn port_name(&self, port: usize) -> String;
}

/// Fan presence/health reads and duty cycle writes
pub trait FanControl {
    /// Current state of every fan tray
    fn fan_records(&mut self) -> Vec<FanRecord>;

    /// Drive all fans at the given duty cycle (0-100)
    fn set_duty_cycle(&mut self, percent: u8) -> Result<()>;
}

/// Transceiver power management
pub trait TransceiverControl {
    fn set_low_power_mode(&mut self, port: usize, enable: bool) -> Result<()>;
}

/// Storage flush and out-of-band power-off
///
/// `power_off` is one-way on real hardware. Dry-run substitutes are separate
/// implementations of this trait.
pub trait EmergencyPower {
    fn flush_storage(&mut self) -> Result<()>;
    fn power_off(&mut self) -> Result<()>;
}

/// Best-effort thermal telemetry towards the management controller
pub trait ThermalReport {
    /// Report the ASIC temperature and the hottest present transceiver
    /// (port index, millidegrees), if any.
    fn send(&mut self, asic_millideg: i64, hottest: Option<(usize, i64)>) -> Result<()>;
}
