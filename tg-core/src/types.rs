//! Core data types for thermguard
//!
//! Defines the primary data structures shared by the sensor reader, policy
//! engine, fan actuator, and shutdown controller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

use crate::constants::duty;

/// Class of a monitored thermal slot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Cpu,
    Asic,
    Transceiver,
}

/// Outcome of a single sensor access
///
/// Accessors never panic and never raise through the policy path; a reading
/// is a value, an expected absence, or a described failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorReading {
    /// Temperature in millidegrees Celsius
    Value(i64),
    /// The sensor (or its backing service) is not available right now
    Unavailable,
    /// The access was attempted and failed
    Failed(String),
}

impl SensorReading {
    /// Collapse to millidegrees, treating absence and failure as the
    /// fail-safe low sentinel (0)
    pub fn or_sentinel(&self) -> i64 {
        match self {
            SensorReading::Value(v) => *v,
            SensorReading::Unavailable | SensorReading::Failed(_) => 0,
        }
    }
}

/// One monitored slot's temperature within a snapshot
///
/// Immutable once produced; a fresh set is built every poll cycle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TemperatureSample {
    pub kind: SensorKind,
    /// Slot index within its kind (0 for CPU/ASIC, port index for transceivers)
    pub slot: usize,
    pub name: String,
    pub millidegrees: i64,
    pub present: bool,
}

/// Timestamped temperature snapshot of all monitored slots
///
/// Samples are ordered: CPU, ASIC, then the full transceiver port range.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Snapshot {
    pub taken_at: SystemTime,
    pub samples: Vec<TemperatureSample>,
}

impl Snapshot {
    pub fn new(samples: Vec<TemperatureSample>) -> Self {
        Self {
            taken_at: SystemTime::now(),
            samples,
        }
    }

    /// Number of fixed (non-transceiver) sensors in the snapshot
    pub fn fixed_sensor_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.kind != SensorKind::Transceiver)
            .count()
    }

    /// Number of transceiver ports currently present
    pub fn present_transceivers(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.kind == SensorKind::Transceiver && s.present)
            .count()
    }

    /// Hottest present transceiver, if any
    pub fn hottest_transceiver(&self) -> Option<&TemperatureSample> {
        self.samples
            .iter()
            .filter(|s| s.kind == SensorKind::Transceiver && s.present)
            .max_by_key(|s| s.millidegrees)
    }

    /// Sample for a fixed sensor kind
    pub fn fixed_sensor(&self, kind: SensorKind) -> Option<&TemperatureSample> {
        self.samples.iter().find(|s| s.kind == kind)
    }

    /// Snapshot rendered as JSON for diagnostic logging
    pub fn to_json(&self) -> tg_error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Discrete cooling level driven by the policy engine
///
/// Ordered from coldest to hottest. `Otp` is a one-shot critical-action
/// marker: the engine reports it, the shutdown controller acts on it, and the
/// stored level remains `Max`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThermalLevel {
    Init,
    Min,
    Mid,
    Max,
    Otp,
}

impl ThermalLevel {
    /// Fan duty cycle mandated by this level
    pub fn duty(&self) -> u8 {
        match self {
            ThermalLevel::Init => duty::DEFAULT,
            ThermalLevel::Min => duty::MIN,
            ThermalLevel::Mid => duty::MID,
            // Otp is only ever reached from Max and keeps the fans pinned
            ThermalLevel::Max | ThermalLevel::Otp => duty::MAX,
        }
    }

    /// Level the state machine rests at after this decision
    pub fn resting(&self) -> ThermalLevel {
        match self {
            ThermalLevel::Otp => ThermalLevel::Max,
            other => *other,
        }
    }
}

impl fmt::Display for ThermalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThermalLevel::Init => "level_fan_init",
            ThermalLevel::Min => "level_fan_min",
            ThermalLevel::Mid => "level_fan_mid",
            ThermalLevel::Max => "level_fan_max",
            ThermalLevel::Otp => "level_fan_otp",
        };
        f.write_str(name)
    }
}

/// State of a single fan tray as reported by the fan control surface
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FanRecord {
    pub id: usize,
    pub name: String,
    pub present: bool,
    pub healthy: bool,
    /// Measured drive strength, 0-100
    pub duty_percent: u8,
}

impl FanRecord {
    /// A fan that is absent, faulted, or not spinning forces maximum cooling
    pub fn failed(&self) -> bool {
        !self.present || !self.healthy || self.duty_percent == 0
    }
}

/// Process-wide control state, owned by the orchestrator thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyState {
    pub level: ThermalLevel,
    pub last_duty: u8,
}

impl Default for PolicyState {
    fn default() -> Self {
        Self {
            level: ThermalLevel::Init,
            last_duty: duty::DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: SensorKind, slot: usize, millideg: i64, present: bool) -> TemperatureSample {
        TemperatureSample {
            kind,
            slot,
            name: format!("{:?}{}", kind, slot),
            millidegrees: millideg,
            present,
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(ThermalLevel::Min < ThermalLevel::Mid);
        assert!(ThermalLevel::Mid < ThermalLevel::Max);
        assert!(ThermalLevel::Max < ThermalLevel::Otp);
    }

    #[test]
    fn test_level_duty_mapping() {
        assert_eq!(ThermalLevel::Min.duty(), 30);
        assert_eq!(ThermalLevel::Mid.duty(), 60);
        assert_eq!(ThermalLevel::Max.duty(), 100);
        assert_eq!(ThermalLevel::Otp.duty(), 100);
    }

    #[test]
    fn test_otp_rests_at_max() {
        assert_eq!(ThermalLevel::Otp.resting(), ThermalLevel::Max);
        assert_eq!(ThermalLevel::Mid.resting(), ThermalLevel::Mid);
    }

    #[test]
    fn test_reading_sentinel() {
        assert_eq!(SensorReading::Value(42_000).or_sentinel(), 42_000);
        assert_eq!(SensorReading::Unavailable.or_sentinel(), 0);
        assert_eq!(SensorReading::Failed("nope".into()).or_sentinel(), 0);
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = Snapshot::new(vec![
            sample(SensorKind::Cpu, 0, 50_000, true),
            sample(SensorKind::Asic, 0, 55_000, true),
            sample(SensorKind::Transceiver, 0, 40_000, true),
            sample(SensorKind::Transceiver, 1, 0, false),
            sample(SensorKind::Transceiver, 2, 61_000, true),
        ]);
        assert_eq!(snapshot.fixed_sensor_count(), 2);
        assert_eq!(snapshot.present_transceivers(), 2);
        assert_eq!(snapshot.hottest_transceiver().unwrap().slot, 2);
    }

    #[test]
    fn test_hottest_ignores_absent_ports() {
        let snapshot = Snapshot::new(vec![
            sample(SensorKind::Cpu, 0, 50_000, true),
            sample(SensorKind::Transceiver, 0, 90_000, false),
            sample(SensorKind::Transceiver, 1, 30_000, true),
        ]);
        assert_eq!(snapshot.hottest_transceiver().unwrap().slot, 1);
    }

    #[test]
    fn test_fan_failure_conditions() {
        let ok = FanRecord {
            id: 1,
            name: "fan1".into(),
            present: true,
            healthy: true,
            duty_percent: 60,
        };
        assert!(!ok.failed());
        assert!(FanRecord { present: false, ..ok.clone() }.failed());
        assert!(FanRecord { healthy: false, ..ok.clone() }.failed());
        assert!(FanRecord { duty_percent: 0, ..ok }.failed());
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = Snapshot::new(vec![sample(SensorKind::Cpu, 0, 50_000, true)]);
        let json = snapshot.to_json().unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.samples, snapshot.samples);
    }
}
