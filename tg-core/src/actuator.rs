//! Fan actuation
//!
//! Maps the cooling level to a duty cycle, overriding to maximum whenever any
//! fan tray is absent, faulted, or not spinning. Duty writes are idempotent
//! against the last applied value; a failed write leaves the recorded duty
//! unchanged so the next cycle retries it.

use tracing::{debug, info, warn};

use crate::constants::duty;
use crate::platform::FanControl;
use crate::types::ThermalLevel;

pub struct FanActuator {
    control: Box<dyn FanControl>,
}

impl FanActuator {
    pub fn new(control: Box<dyn FanControl>) -> Self {
        Self { control }
    }

    /// Apply the startup default duty unconditionally, before the first
    /// policy decision exists. Returns the duty now in effect.
    pub fn initialize(&mut self) -> u8 {
        info!("Set FAN speed to {}", duty::DEFAULT);
        if let Err(e) = self.control.set_duty_cycle(duty::DEFAULT) {
            warn!("Failed to apply startup fan duty: {}", e);
        }
        duty::DEFAULT
    }

    /// Apply the duty implied by `level`, honoring the fan-failure override.
    /// Returns the duty in effect afterwards, for the orchestrator to record.
    pub fn apply(&mut self, level: ThermalLevel, last_duty: u8) -> u8 {
        let records = self.control.fan_records();
        let failed: Vec<String> = records
            .iter()
            .filter(|fan| fan.failed())
            .map(|fan| fan.name.clone())
            .collect();

        let target = if failed.is_empty() {
            level.duty()
        } else {
            for fan in &failed {
                warn!("{} has failed, so set the duty_cycle to 100%", fan);
            }
            duty::MAX
        };

        if target == last_duty {
            debug!("duty already at {}%, skipping write", target);
            return last_duty;
        }

        info!("Set FAN speed to {}", target);
        match self.control.set_duty_cycle(target) {
            Ok(()) => target,
            Err(e) => {
                warn!("Failed to write fan duty {}%: {}", target, e);
                last_duty
            }
        }
    }
}
