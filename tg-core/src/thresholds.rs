//! Hysteresis threshold table
//!
//! Each of the four transition edges carries one threshold per fixed sensor
//! and a single value broadcast to every transceiver port. Escalation edges
//! fire on any one slot; de-escalation edges require all slots, which is what
//! keeps the level from oscillating near a boundary.

use serde::{Deserialize, Serialize};

use crate::constants::thresholds as defaults;
use crate::types::{SensorKind, TemperatureSample};

/// Named transition edge in the level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdEdge {
    MinToMid,
    MidToMax,
    MaxToOtp,
    MaxToMid,
}

/// Per-kind thresholds for one edge, millidegrees Celsius
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct EdgeThresholds {
    pub cpu: i64,
    pub asic: i64,
    /// Shared by all transceiver ports
    pub transceiver: i64,
}

impl EdgeThresholds {
    fn for_kind(&self, kind: SensorKind) -> i64 {
        match kind {
            SensorKind::Cpu => self.cpu,
            SensorKind::Asic => self.asic,
            SensorKind::Transceiver => self.transceiver,
        }
    }
}

/// Static threshold configuration for all four edges
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdTable {
    pub min_to_mid: EdgeThresholds,
    pub mid_to_max: EdgeThresholds,
    pub max_to_otp: EdgeThresholds,
    pub max_to_mid: EdgeThresholds,
}

impl ThresholdTable {
    /// Threshold applying to `sample` on the given edge
    pub fn threshold(&self, edge: ThresholdEdge, sample: &TemperatureSample) -> i64 {
        let edge_thresholds = match edge {
            ThresholdEdge::MinToMid => &self.min_to_mid,
            ThresholdEdge::MidToMax => &self.mid_to_max,
            ThresholdEdge::MaxToOtp => &self.max_to_otp,
            ThresholdEdge::MaxToMid => &self.max_to_mid,
        };
        edge_thresholds.for_kind(sample.kind)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            min_to_mid: EdgeThresholds {
                cpu: defaults::CPU_MIN_TO_MID,
                asic: defaults::ASIC_MIN_TO_MID,
                transceiver: defaults::XCVR_MIN_TO_MID,
            },
            mid_to_max: EdgeThresholds {
                cpu: defaults::CPU_MID_TO_MAX,
                asic: defaults::ASIC_MID_TO_MAX,
                transceiver: defaults::XCVR_MID_TO_MAX,
            },
            max_to_otp: EdgeThresholds {
                cpu: defaults::CPU_MAX_TO_OTP,
                asic: defaults::ASIC_MAX_TO_OTP,
                transceiver: defaults::XCVR_MAX_TO_OTP,
            },
            max_to_mid: EdgeThresholds {
                cpu: defaults::CPU_MAX_TO_MID,
                asic: defaults::ASIC_MAX_TO_MID,
                transceiver: defaults::XCVR_MAX_TO_MID,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: SensorKind, slot: usize) -> TemperatureSample {
        TemperatureSample {
            kind,
            slot,
            name: String::new(),
            millidegrees: 0,
            present: true,
        }
    }

    #[test]
    fn test_fixed_sensors_individually_tuned() {
        let table = ThresholdTable::default();
        let cpu = sample(SensorKind::Cpu, 0);
        let asic = sample(SensorKind::Asic, 0);
        assert_eq!(table.threshold(ThresholdEdge::MidToMax, &cpu), 85_000);
        assert_eq!(table.threshold(ThresholdEdge::MidToMax, &asic), 90_000);
        assert_eq!(table.threshold(ThresholdEdge::MaxToOtp, &cpu), 100_000);
        assert_eq!(table.threshold(ThresholdEdge::MaxToOtp, &asic), 105_000);
        assert_eq!(table.threshold(ThresholdEdge::MaxToMid, &cpu), 75_000);
        assert_eq!(table.threshold(ThresholdEdge::MaxToMid, &asic), 80_000);
    }

    #[test]
    fn test_transceiver_broadcast() {
        let table = ThresholdTable::default();
        for port in [0usize, 17, 63] {
            let xcvr = sample(SensorKind::Transceiver, port);
            assert_eq!(table.threshold(ThresholdEdge::MinToMid, &xcvr), 75_000);
            assert_eq!(table.threshold(ThresholdEdge::MaxToMid, &xcvr), 65_000);
        }
    }

    #[test]
    fn test_falling_edges_below_rising_edges() {
        // The hysteresis band only exists if every de-escalation threshold
        // sits below the corresponding escalation threshold.
        let table = ThresholdTable::default();
        assert!(table.max_to_mid.cpu < table.mid_to_max.cpu);
        assert!(table.max_to_mid.asic < table.mid_to_max.asic);
        assert!(table.max_to_mid.transceiver < table.mid_to_max.transceiver);
    }
}
