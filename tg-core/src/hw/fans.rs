//! Fan control surface (platform sysfs)
//!
//! Each fan tray exposes `fanN_present`, `fanN_fault`, and `fanN_pwm`
//! (percent) attributes under the platform FPGA directory. Attribute read
//! failures degrade to an unhealthy record, which the actuator treats as a
//! fan failure.

use std::path::PathBuf;

use tracing::{debug, warn};

use tg_error::{Result, ThermError};

use crate::constants::{platform, timing};
use crate::hw::read_trimmed;
use crate::platform::FanControl;
use crate::types::FanRecord;

pub struct SysfsFans {
    root: PathBuf,
    count: usize,
    /// Pause after a duty write while rotors settle
    settle: std::time::Duration,
}

impl SysfsFans {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            count: platform::FAN_COUNT,
            settle: timing::FAN_SETTLE,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_settle(mut self, settle: std::time::Duration) -> Self {
        self.settle = settle;
        self
    }

    fn read_attr(&self, fan: usize, attr: &str) -> Result<u8> {
        let path = self.root.join(format!("fan{}_{}", fan, attr));
        let raw = read_trimmed(&path).map_err(|e| ThermError::FanRead {
            fan: format!("fan{}", fan),
            reason: format!("{:?}: {}", path, e),
        })?;
        raw.parse::<u8>().map_err(|e| ThermError::FanRead {
            fan: format!("fan{}", fan),
            reason: format!("{:?}: {}", path, e),
        })
    }

    fn record(&self, fan: usize) -> FanRecord {
        let name = format!("FAN-{}", fan);
        let present = self.read_attr(fan, "present").map(|v| v == 1);
        let fault = self.read_attr(fan, "fault").map(|v| v != 0);
        let duty = self.read_attr(fan, "pwm");

        match (present, fault, duty) {
            (Ok(present), Ok(fault), Ok(duty_percent)) => FanRecord {
                id: fan,
                name,
                present,
                healthy: !fault,
                duty_percent,
            },
            (present, fault, duty) => {
                for err in [present.err(), fault.err(), duty.err()].into_iter().flatten() {
                    debug!("{}", err);
                }
                // An unreadable tray is reported as faulted so the actuator
                // pins the remaining fans at full duty.
                FanRecord {
                    id: fan,
                    name,
                    present: true,
                    healthy: false,
                    duty_percent: 0,
                }
            }
        }
    }
}

impl FanControl for SysfsFans {
    fn fan_records(&mut self) -> Vec<FanRecord> {
        (1..=self.count).map(|fan| self.record(fan)).collect()
    }

    fn set_duty_cycle(&mut self, percent: u8) -> Result<()> {
        if percent > 100 {
            warn!("Error: Wrong duty cycle value {}", percent);
            return Err(ThermError::InvalidDutyCycle { value: percent });
        }

        debug!("Set FAN speed to {}", percent);
        for fan in 1..=self.count {
            let path = self.root.join(format!("fan{}_pwm", fan));
            if let Err(e) = std::fs::write(&path, percent.to_string()) {
                return Err(ThermError::FanWrite {
                    fan: format!("fan{}", fan),
                    reason: format!("{:?}: {}", path, e),
                });
            }
        }
        std::thread::sleep(self.settle);
        Ok(())
    }
}
