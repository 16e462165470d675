/*
 * Scenario tests for the thermal policy and fan actuation path.
 *
 * These exercise the documented operating scenarios end to end across the
 * policy engine and the actuator, with fake fan hardware.
 */

use std::cell::RefCell;
use std::rc::Rc;

use tg_core::policy::PolicyEngine;
use tg_core::types::{FanRecord, SensorKind, Snapshot, TemperatureSample, ThermalLevel};
use tg_core::{FanActuator, FanControl};

#[derive(Default)]
struct FakeFans {
    records: Vec<FanRecord>,
    writes: Rc<RefCell<Vec<u8>>>,
}

impl FanControl for FakeFans {
    fn fan_records(&mut self) -> Vec<FanRecord> {
        self.records.clone()
    }

    fn set_duty_cycle(&mut self, percent: u8) -> tg_error::Result<()> {
        self.writes.borrow_mut().push(percent);
        Ok(())
    }
}

fn healthy_fans() -> Vec<FanRecord> {
    (1..=4)
        .map(|id| FanRecord {
            id,
            name: format!("FAN-{}", id),
            present: true,
            healthy: true,
            duty_percent: 60,
        })
        .collect()
}

fn snapshot(cpu: i64, asic: i64, ports: &[(usize, i64)]) -> Snapshot {
    let mut samples = vec![
        TemperatureSample {
            kind: SensorKind::Cpu,
            slot: 0,
            name: "CPU_Package_temp".into(),
            millidegrees: cpu,
            present: true,
        },
        TemperatureSample {
            kind: SensorKind::Asic,
            slot: 0,
            name: "MAC".into(),
            millidegrees: asic,
            present: true,
        },
    ];
    samples.extend(ports.iter().map(|&(port, t)| TemperatureSample {
        kind: SensorKind::Transceiver,
        slot: port,
        name: format!("Ethernet{}", port * 8),
        millidegrees: t,
        present: true,
    }));
    Snapshot::new(samples)
}

#[test]
fn scenario_cool_system_stays_min_at_30_percent() {
    // CPU=50C, ASIC=50C, empty front panel, level MIN.
    let engine = PolicyEngine::default();
    let decision = engine.decide(ThermalLevel::Min, &snapshot(50_000, 50_000, &[]));
    assert_eq!(decision.level, ThermalLevel::Min);

    let writes = Rc::new(RefCell::new(Vec::new()));
    let mut actuator = FanActuator::new(Box::new(FakeFans {
        records: healthy_fans(),
        writes: writes.clone(),
    }));
    // Coming from the 60% startup default, MIN writes 30.
    assert_eq!(actuator.apply(decision.level, 60), 30);
    assert_eq!(*writes.borrow(), vec![30]);
}

#[test]
fn scenario_hot_cpu_escalates_mid_to_max_at_full_duty() {
    // CPU=86C crosses the 85C rising edge.
    let engine = PolicyEngine::default();
    let decision = engine.decide(ThermalLevel::Mid, &snapshot(86_000, 70_000, &[]));
    assert_eq!(decision.level, ThermalLevel::Max);

    let writes = Rc::new(RefCell::new(Vec::new()));
    let mut actuator = FanActuator::new(Box::new(FakeFans {
        records: healthy_fans(),
        writes: writes.clone(),
    }));
    assert_eq!(actuator.apply(decision.level, 60), 100);
    assert_eq!(*writes.borrow(), vec![100]);
}

#[test]
fn scenario_critical_cpu_fires_otp_from_max() {
    // CPU=101C crosses the 100C critical edge.
    let engine = PolicyEngine::default();
    let decision = engine.decide(ThermalLevel::Max, &snapshot(101_000, 90_000, &[(0, 60_000)]));
    assert_eq!(decision.level, ThermalLevel::Otp);
    let breach = decision.otp.expect("shutdown must be requested");
    assert_eq!(breach.name, "CPU_Package_temp");
    // The stored level rests at Max while the action runs.
    assert_eq!(decision.level.resting(), ThermalLevel::Max);
}

#[test]
fn scenario_cooled_system_deescalates_max_to_mid() {
    // CPU=70C < 75C, ASIC=75C < 80C, empty front panel.
    let engine = PolicyEngine::default();
    let decision = engine.decide(ThermalLevel::Max, &snapshot(70_000, 75_000, &[]));
    assert_eq!(decision.level, ThermalLevel::Mid);

    let writes = Rc::new(RefCell::new(Vec::new()));
    let mut actuator = FanActuator::new(Box::new(FakeFans {
        records: healthy_fans(),
        writes: writes.clone(),
    }));
    assert_eq!(actuator.apply(decision.level, 100), 60);
    assert_eq!(*writes.borrow(), vec![60]);
}

#[test]
fn scenario_stalled_fan_forces_full_duty_at_min() {
    let engine = PolicyEngine::default();
    let decision = engine.decide(ThermalLevel::Min, &snapshot(50_000, 50_000, &[]));
    assert_eq!(decision.level, ThermalLevel::Min);

    let mut records = healthy_fans();
    records[2].duty_percent = 0; // stalled rotor
    let writes = Rc::new(RefCell::new(Vec::new()));
    let mut actuator = FanActuator::new(Box::new(FakeFans {
        records,
        writes: writes.clone(),
    }));
    // Policy says 30, the failed fan pins everything at 100.
    assert_eq!(actuator.apply(decision.level, 30), 100);
    assert_eq!(*writes.borrow(), vec![100]);
}

#[test]
fn hysteresis_band_holds_level_between_edges() {
    // 80C CPU sits between max_to_mid (75C) and mid_to_max (85C): Max holds
    // Max and Mid holds Mid, which is the band that prevents oscillation.
    let engine = PolicyEngine::default();
    let snap = snapshot(80_000, 70_000, &[]);
    assert_eq!(engine.decide(ThermalLevel::Max, &snap).level, ThermalLevel::Max);
    assert_eq!(engine.decide(ThermalLevel::Mid, &snap).level, ThermalLevel::Mid);
}

#[test]
fn one_hot_port_blocks_deescalation_from_max() {
    let engine = PolicyEngine::default();
    // Fixed sensors cooled; one port still at 66C (edge is 65C).
    let blocked = engine.decide(ThermalLevel::Max, &snapshot(70_000, 75_000, &[(8, 66_000)]));
    assert_eq!(blocked.level, ThermalLevel::Max);

    let cooled = engine.decide(ThermalLevel::Max, &snapshot(70_000, 75_000, &[(8, 64_000)]));
    assert_eq!(cooled.level, ThermalLevel::Mid);
}
