//! Thermal monitor loop
//!
//! The orchestrator owns the process-wide policy state and runs the
//! cooperative cycle: sample, decide, actuate, engage the shutdown sequence
//! when the critical action fires, then sleep out the fixed interval. The
//! stop flag is observed once per iteration boundary; in-flight I/O is never
//! preempted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use tg_core::constants::timing;
use tg_core::policy::PolicyEngine;
use tg_core::types::{PolicyState, SensorKind, ThermalLevel};
use tg_core::{FanActuator, SensorReader, ShutdownController, ThermalReport};

/// Outcome of one control cycle, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub level: ThermalLevel,
    pub duty: u8,
    pub otp_fired: bool,
}

pub struct Monitor {
    reader: SensorReader,
    engine: PolicyEngine,
    actuator: FanActuator,
    shutdown: ShutdownController,
    reporter: Option<Box<dyn ThermalReport>>,
    state: PolicyState,
    interval: Duration,
}

impl Monitor {
    pub fn new(
        reader: SensorReader,
        engine: PolicyEngine,
        actuator: FanActuator,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            reader,
            engine,
            actuator,
            shutdown,
            reporter: None,
            state: PolicyState::default(),
            interval: timing::MONITOR_INTERVAL,
        }
    }

    /// Attach a best-effort per-cycle thermal report
    pub fn with_reporter(mut self, reporter: Box<dyn ThermalReport>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// Apply the startup fan duty before the first cycle runs
    pub fn initialize(&mut self) {
        self.state.last_duty = self.actuator.initialize();
    }

    /// One full control cycle. The first call only advances the state
    /// machine out of Init; sampling starts on the next cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        if self.state.level == ThermalLevel::Init {
            self.state.level = ThermalLevel::Mid;
            debug!("fan_policy_state=level_fan_mid at default");
            return CycleReport {
                level: self.state.level,
                duty: self.state.last_duty,
                otp_fired: false,
            };
        }

        let snapshot = self.reader.sample();
        let decision = self.engine.decide(self.state.level, &snapshot);

        let next = decision.level.resting();
        if next != self.state.level {
            info!("fan_policy_state {} -> {}", self.state.level, next);
            if next == ThermalLevel::Max {
                warn!("Alarm for temperature high, set duty_cycle to 100%");
            }
        }

        let duty = self.actuator.apply(next, self.state.last_duty);
        self.state.level = next;
        self.state.last_duty = duty;

        let otp_fired = match &decision.otp {
            Some(breach) => {
                error!(
                    "{} at {:.1} exceeds the protection threshold {:.1}",
                    breach.name,
                    breach.millidegrees as f64 / 1000.0,
                    breach.threshold as f64 / 1000.0
                );
                self.shutdown.engage(&snapshot);
                true
            }
            None => false,
        };

        if let Some(reporter) = self.reporter.as_mut() {
            let asic = snapshot
                .fixed_sensor(SensorKind::Asic)
                .map(|s| s.millidegrees)
                .unwrap_or(0);
            let hottest = snapshot.hottest_transceiver().map(|s| (s.slot, s.millidegrees));
            if let Err(e) = reporter.send(asic, hottest) {
                warn!("Warning: Failed to send thermal report. [{}]", e);
            }
        }

        CycleReport {
            level: self.state.level,
            duty,
            otp_fired,
        }
    }

    /// Cooperative polling loop, terminated by the stop flag
    pub async fn run(&mut self, stop: Arc<AtomicBool>) {
        self.initialize();
        info!("Thermal monitor loop started ({}s interval)", self.interval.as_secs());

        loop {
            if stop.load(Ordering::SeqCst) {
                info!("Thermal monitor loop shutting down");
                break;
            }
            let report = self.run_cycle();
            debug!(
                "cycle complete: level={} duty={}% otp={}",
                report.level, report.duty, report.otp_fired
            );
            tokio::time::sleep(self.interval).await;
        }

        info!("Thermal monitor loop stopped");
    }
}
