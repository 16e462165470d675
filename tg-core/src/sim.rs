//! Synthetic sensor source and dry-run actuators for test mode
//!
//! Test mode substitutes a monotonically drifting temperature walk for live
//! sensor reads, so escalation and de-escalation can be exercised
//! deterministically on a bench. The drift source and the dry-run power hook
//! share one state handle: when the (suppressed) power-off fires, the walk
//! reverses and the platform "cools" back down. All of this is injected at
//! startup; production code paths carry no test-mode branches.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use tg_error::Result;

use crate::constants::{platform, sim};
use crate::platform::{EmergencyPower, SensorSource, Slot, TransceiverControl};
use crate::types::SensorReading;

#[derive(Debug, Default)]
struct DriftState {
    reverting: bool,
}

/// Shared toggle between the drift source and the dry-run power hook
#[derive(Clone, Debug, Default)]
pub struct DriftHandle(Arc<Mutex<DriftState>>);

impl DriftHandle {
    pub fn set_reverting(&self, on: bool) {
        self.0.lock().reverting = on;
    }

    pub fn reverting(&self) -> bool {
        self.0.lock().reverting
    }
}

/// Sensor source that drifts from three starting temperatures
pub struct DriftSource {
    cpu_base: i64,
    asic_base: i64,
    xcvr_base: i64,
    offset: i64,
    step: i64,
    /// Presence flag per port
    ports: Vec<bool>,
    handle: DriftHandle,
}

impl DriftSource {
    /// `bases` are the starting CPU/ASIC/transceiver temperatures in
    /// millidegrees (the CLI takes them in whole degrees).
    pub fn new(bases: [i64; 3], ports: Vec<bool>, handle: DriftHandle) -> Self {
        Self {
            cpu_base: bases[0],
            asic_base: bases[1],
            xcvr_base: bases[2],
            offset: 0,
            step: sim::DRIFT_STEP,
            ports,
            handle,
        }
    }

    pub fn current_offset(&self) -> i64 {
        self.offset
    }
}

impl SensorSource for DriftSource {
    fn begin_cycle(&mut self) {
        if self.handle.reverting() {
            self.offset -= self.step;
            if self.offset <= 0 {
                // Back at the starting temperatures; resume the upward walk.
                self.offset = 0;
                self.handle.set_reverting(false);
            }
        } else {
            self.offset += self.step;
        }
        debug!("drift offset now {}mC", self.offset);
    }

    fn read_temperature(&mut self, slot: Slot) -> SensorReading {
        let base = match slot {
            Slot::Cpu => self.cpu_base,
            Slot::Asic => self.asic_base,
            Slot::Transceiver(_) => self.xcvr_base,
        };
        SensorReading::Value(base + self.offset)
    }

    fn present(&mut self, slot: Slot) -> bool {
        match slot {
            Slot::Cpu | Slot::Asic => true,
            Slot::Transceiver(port) => self.ports.get(port).copied().unwrap_or(false),
        }
    }

    fn port_name(&self, port: usize) -> String {
        format!("Ethernet{}", port * platform::LANE_STRIDE)
    }
}

/// Power hook that logs instead of cutting power, and reverses the drift
pub struct DryRunPower {
    handle: DriftHandle,
}

impl DryRunPower {
    pub fn new(handle: DriftHandle) -> Self {
        Self { handle }
    }
}

impl EmergencyPower for DryRunPower {
    fn flush_storage(&mut self) -> Result<()> {
        debug!("Test Mode: storage flush skipped");
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        info!("Test Mode: Power Off Dut......");
        self.handle.set_reverting(true);
        Ok(())
    }
}

/// Transceiver control that only logs
pub struct DryRunTransceivers;

impl TransceiverControl for DryRunTransceivers {
    fn set_low_power_mode(&mut self, port: usize, enable: bool) -> Result<()> {
        debug!("Test Mode: port {} lpmode={}", port, enable);
        Ok(())
    }
}
