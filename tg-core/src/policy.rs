//! Thermal policy engine
//!
//! A hysteretic state machine over the cooling levels. Escalation is
//! disjunctive (any one hot slot raises the level); de-escalation is
//! conjunctive (every monitored slot must have cooled below its falling
//! threshold). Each decision is a pure function of the snapshot and the
//! previous level, so a cycle can be replayed deterministically.

use tracing::{debug, warn};

use crate::thresholds::{ThresholdEdge, ThresholdTable};
use crate::types::{SensorKind, Snapshot, TemperatureSample, ThermalLevel};

/// A fixed-sensor breach of the over-temperature-protection threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpBreach {
    pub name: String,
    pub millidegrees: i64,
    pub threshold: i64,
}

/// Outcome of one policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Next cooling level. `Otp` here is the critical-action marker; the
    /// stored level rests at `Max` (see [`ThermalLevel::resting`]).
    pub level: ThermalLevel,
    /// Set when the critical action must fire this cycle
    pub otp: Option<OtpBreach>,
}

impl Decision {
    fn steady(level: ThermalLevel) -> Self {
        Self { level, otp: None }
    }
}

/// The level state machine, parameterized by a threshold table
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    thresholds: ThresholdTable,
}

impl PolicyEngine {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Evaluate one snapshot against the previous level.
    ///
    /// Absent transceivers are skipped entirely. No side effects beyond
    /// logging; calling twice with the same inputs yields the same decision.
    pub fn decide(&self, level: ThermalLevel, snapshot: &Snapshot) -> Decision {
        match level {
            // Safe default before the first snapshot exists.
            ThermalLevel::Init => Decision::steady(ThermalLevel::Mid),
            ThermalLevel::Min => self.decide_from_min(snapshot),
            ThermalLevel::Mid => self.decide_from_mid(snapshot),
            // The engine never rests at Otp; evaluate as Max so the breach
            // re-fires every cycle it persists.
            ThermalLevel::Max | ThermalLevel::Otp => self.decide_from_max(snapshot),
        }
    }

    fn decide_from_min(&self, snapshot: &Snapshot) -> Decision {
        for sample in monitored(snapshot) {
            let threshold = self.thresholds.threshold(ThresholdEdge::MinToMid, sample);
            if sample.millidegrees >= threshold {
                debug!(
                    "{} at {}mC reached min_to_mid threshold {}mC",
                    sample.name, sample.millidegrees, threshold
                );
                return Decision::steady(ThermalLevel::Mid);
            }
        }
        Decision::steady(ThermalLevel::Min)
    }

    fn decide_from_mid(&self, snapshot: &Snapshot) -> Decision {
        let mut cooled_fixed = 0usize;
        for sample in monitored(snapshot) {
            let rising = self.thresholds.threshold(ThresholdEdge::MidToMax, sample);
            if sample.millidegrees >= rising {
                warn!(
                    "Monitor {}, temperature is {:.1}. Temperature is over {:.1}.",
                    sample.name,
                    sample.millidegrees as f64 / 1000.0,
                    rising as f64 / 1000.0
                );
                return Decision::steady(ThermalLevel::Max);
            }
            let falling = self.thresholds.threshold(ThresholdEdge::MinToMid, sample);
            if sample.kind != SensorKind::Transceiver && sample.millidegrees < falling {
                cooled_fixed += 1;
            }
        }

        // Dropping to Min additionally requires an empty front panel.
        if cooled_fixed == snapshot.fixed_sensor_count() && snapshot.present_transceivers() == 0 {
            debug!("all fixed sensors below min_to_mid and no transceivers present");
            return Decision::steady(ThermalLevel::Min);
        }
        Decision::steady(ThermalLevel::Mid)
    }

    fn decide_from_max(&self, snapshot: &Snapshot) -> Decision {
        let mut cooled = 0usize;
        for sample in monitored(snapshot) {
            let critical = self.thresholds.threshold(ThresholdEdge::MaxToOtp, sample);
            if sample.millidegrees >= critical {
                if sample.kind == SensorKind::Transceiver {
                    // Optics cannot take the platform down; they are parked
                    // in low-power mode only if a fixed sensor breaches.
                    warn!(
                        "Monitor {}, temperature is {:.1}. Temperature is over {:.1}.",
                        sample.name,
                        sample.millidegrees as f64 / 1000.0,
                        critical as f64 / 1000.0
                    );
                    continue;
                }
                // First fixed-sensor breach is sufficient; evaluation for
                // this cycle ends here.
                return Decision {
                    level: ThermalLevel::Otp,
                    otp: Some(OtpBreach {
                        name: sample.name.clone(),
                        millidegrees: sample.millidegrees,
                        threshold: critical,
                    }),
                };
            }
            let falling = self.thresholds.threshold(ThresholdEdge::MaxToMid, sample);
            if sample.millidegrees < falling {
                cooled += 1;
            }
        }

        let required = snapshot.fixed_sensor_count() + snapshot.present_transceivers();
        if cooled == required {
            debug!("all {} monitored slots below max_to_mid", required);
            return Decision::steady(ThermalLevel::Mid);
        }
        Decision::steady(ThermalLevel::Max)
    }
}

/// Slots that take part in policy evaluation: fixed sensors plus every
/// currently-present transceiver.
fn monitored(snapshot: &Snapshot) -> impl Iterator<Item = &TemperatureSample> {
    snapshot
        .samples
        .iter()
        .filter(|s| s.kind != SensorKind::Transceiver || s.present)
}
