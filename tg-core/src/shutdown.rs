//! Emergency shutdown sequence
//!
//! One-way protective action for sustained over-temperature: park the optics
//! in low-power mode, flush storage, wait out a short grace period, then issue
//! the out-of-band power-off. Every step is best-effort: a failing step is
//! logged and the sequence continues.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::constants::timing;
use crate::platform::{EmergencyPower, TransceiverControl};
use crate::types::{SensorKind, Snapshot};

pub struct ShutdownController {
    transceivers: Box<dyn TransceiverControl>,
    power: Box<dyn EmergencyPower>,
    grace: Duration,
}

impl ShutdownController {
    pub fn new(transceivers: Box<dyn TransceiverControl>, power: Box<dyn EmergencyPower>) -> Self {
        Self {
            transceivers,
            power,
            grace: timing::SHUTDOWN_GRACE,
        }
    }

    /// Override the grace period between flush and power-off
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run the protective sequence. Returns whether the power-off command
    /// itself was accepted; on real hardware the process does not outlive it.
    pub fn engage(&mut self, snapshot: &Snapshot) -> bool {
        error!("Alarm-Critical for temperature high is detected, shutdown DUT");

        for sample in snapshot
            .samples
            .iter()
            .filter(|s| s.kind == SensorKind::Transceiver && s.present)
        {
            if let Err(e) = self.transceivers.set_low_power_mode(sample.slot, true) {
                warn!("Failed to set {} to low-power mode: {}", sample.name, e);
            }
        }

        if let Err(e) = self.power.flush_storage() {
            warn!("Storage flush failed: {}", e);
        }

        std::thread::sleep(self.grace);

        match self.power.power_off() {
            Ok(()) => {
                info!("Out-of-band power-off issued");
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemperatureSample;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Trace {
        steps: Rc<RefCell<Vec<String>>>,
    }

    impl Trace {
        fn push(&self, step: impl Into<String>) {
            self.steps.borrow_mut().push(step.into());
        }
    }

    struct FakeTransceivers {
        trace: Trace,
        fail_port: Option<usize>,
    }

    impl TransceiverControl for FakeTransceivers {
        fn set_low_power_mode(&mut self, port: usize, enable: bool) -> tg_error::Result<()> {
            if self.fail_port == Some(port) {
                return Err(tg_error::ThermError::Transceiver {
                    port,
                    reason: "stuck control line".into(),
                });
            }
            self.trace.push(format!("lpmode:{}:{}", port, enable));
            Ok(())
        }
    }

    struct FakePower {
        trace: Trace,
        fail_flush: bool,
    }

    impl EmergencyPower for FakePower {
        fn flush_storage(&mut self) -> tg_error::Result<()> {
            if self.fail_flush {
                return Err(tg_error::ThermError::generic("sync failed"));
            }
            self.trace.push("flush");
            Ok(())
        }

        fn power_off(&mut self) -> tg_error::Result<()> {
            self.trace.push("power_off");
            Ok(())
        }
    }

    fn snapshot_with_ports(ports: &[(usize, bool)]) -> Snapshot {
        let mut samples = vec![
            TemperatureSample {
                kind: SensorKind::Cpu,
                slot: 0,
                name: "CPU_Package_temp".into(),
                millidegrees: 101_000,
                present: true,
            },
            TemperatureSample {
                kind: SensorKind::Asic,
                slot: 0,
                name: "MAC".into(),
                millidegrees: 90_000,
                present: true,
            },
        ];
        samples.extend(ports.iter().map(|&(p, present)| TemperatureSample {
            kind: SensorKind::Transceiver,
            slot: p,
            name: format!("Ethernet{}", p * 8),
            millidegrees: 70_000,
            present,
        }));
        Snapshot::new(samples)
    }

    fn controller(trace: &Trace, fail_port: Option<usize>, fail_flush: bool) -> ShutdownController {
        ShutdownController::new(
            Box::new(FakeTransceivers {
                trace: trace.clone(),
                fail_port,
            }),
            Box::new(FakePower {
                trace: trace.clone(),
                fail_flush,
            }),
        )
        .with_grace(Duration::from_millis(0))
    }

    #[test]
    fn test_sequence_order() {
        let trace = Trace::default();
        let mut shutdown = controller(&trace, None, false);

        assert!(shutdown.engage(&snapshot_with_ports(&[(0, true), (1, false), (2, true)])));
        assert_eq!(
            *trace.steps.borrow(),
            vec!["lpmode:0:true", "lpmode:2:true", "flush", "power_off"]
        );
    }

    #[test]
    fn test_step_failures_do_not_stop_sequence() {
        let trace = Trace::default();
        let mut shutdown = controller(&trace, Some(0), true);

        assert!(shutdown.engage(&snapshot_with_ports(&[(0, true), (1, true)])));
        // Port 0 and the flush failed; port 1 and power-off still ran.
        assert_eq!(*trace.steps.borrow(), vec!["lpmode:1:true", "power_off"]);
    }

    #[test]
    fn test_no_ports_goes_straight_to_flush() {
        let trace = Trace::default();
        let mut shutdown = controller(&trace, None, false);
        assert!(shutdown.engage(&snapshot_with_ports(&[])));
        assert_eq!(*trace.steps.borrow(), vec!["flush", "power_off"]);
    }
}
