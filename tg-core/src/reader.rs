//! Snapshot assembly
//!
//! Collects one timestamped snapshot per poll cycle: the two fixed sensors
//! first, then the full transceiver port range. Every failure degrades to the
//! fail-safe low sentinel (0 millidegrees) with a warning; nothing here can
//! abort a cycle.

use tracing::{debug, warn};

use crate::constants::platform;
use crate::platform::{SensorSource, Slot};
use crate::types::{SensorKind, SensorReading, Snapshot, TemperatureSample};

pub struct SensorReader {
    source: Box<dyn SensorSource>,
    ports: usize,
}

impl SensorReader {
    pub fn new(source: Box<dyn SensorSource>, ports: usize) -> Self {
        Self { source, ports }
    }

    /// Gather a full snapshot. Never fails; unreadable slots carry the
    /// sentinel value instead.
    pub fn sample(&mut self) -> Snapshot {
        self.source.begin_cycle();

        let mut samples = Vec::with_capacity(platform::FIXED_SENSORS + self.ports);
        samples.push(self.fixed_sample(SensorKind::Cpu, Slot::Cpu, platform::CPU_SENSOR_NAME));
        samples.push(self.fixed_sample(SensorKind::Asic, Slot::Asic, platform::ASIC_SENSOR_NAME));

        for port in 0..self.ports {
            samples.push(self.transceiver_sample(port));
        }

        let snapshot = Snapshot::new(samples);
        debug!(
            "snapshot: {} slots, {} transceivers present",
            snapshot.samples.len(),
            snapshot.present_transceivers()
        );
        snapshot
    }

    fn fixed_sample(&mut self, kind: SensorKind, slot: Slot, name: &str) -> TemperatureSample {
        let reading = self.source.read_temperature(slot);
        match &reading {
            SensorReading::Value(v) => debug!("{} = {}mC", name, v),
            SensorReading::Unavailable => {
                warn!("Warning: Failed to read the {} temperature", name)
            }
            SensorReading::Failed(reason) => {
                warn!("Warning: Failed to read the {} temperature: {}", name, reason)
            }
        }
        TemperatureSample {
            kind,
            slot: 0,
            name: name.to_string(),
            millidegrees: reading.or_sentinel(),
            present: true,
        }
    }

    fn transceiver_sample(&mut self, port: usize) -> TemperatureSample {
        let name = self.source.port_name(port);
        let present = self.source.present(Slot::Transceiver(port));
        let millidegrees = if present {
            let reading = self.source.read_temperature(Slot::Transceiver(port));
            if let SensorReading::Failed(reason) = &reading {
                debug!("transceiver {} read failed: {}", name, reason);
            }
            reading.or_sentinel()
        } else {
            0
        };
        TemperatureSample {
            kind: SensorKind::Transceiver,
            slot: port,
            name,
            millidegrees,
            present,
        }
    }
}
