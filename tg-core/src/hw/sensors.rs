//! Production sensor source
//!
//! - CPU package temperature from the hwmon tree (label match, millidegrees).
//! - ASIC die temperature by invoking the vendor diagnostic and matching one
//!   line of its output (degrees, normalized to millidegrees).
//! - Transceiver temperatures by keyed lookup against the telemetry store,
//!   presence from the platform sysfs attribute.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use crate::constants::platform;
use crate::hw::transceivers::SysfsTransceivers;
use crate::hw::{read_trimmed, run_command, TelemetryStore};
use crate::platform::{SensorSource, Slot};
use crate::types::SensorReading;

pub struct PlatformSensors {
    hwmon_root: PathBuf,
    /// Resolved CPU tempN_input path, discovered on first use
    cpu_input: Option<PathBuf>,
    asic_pattern: Regex,
    telemetry: TelemetryStore,
    transceivers: SysfsTransceivers,
    lane_stride: usize,
}

impl PlatformSensors {
    pub fn new(telemetry: TelemetryStore, transceivers: SysfsTransceivers) -> Self {
        Self {
            hwmon_root: PathBuf::from(platform::HWMON_ROOT),
            cpu_input: None,
            // The pattern is a compile-time constant; an invalid one is a
            // programming error caught by the tests below.
            asic_pattern: Regex::new(platform::ASIC_TEMP_PATTERN).expect("valid pattern"),
            telemetry,
            transceivers,
            lane_stride: platform::LANE_STRIDE,
        }
    }

    /// Override the hwmon root (tests point this at a fixture tree)
    pub fn with_hwmon_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.hwmon_root = root.into();
        self.cpu_input = None;
        self
    }

    fn cpu_temperature(&mut self) -> SensorReading {
        if self.cpu_input.is_none() {
            self.cpu_input = find_cpu_input(&self.hwmon_root);
        }
        let Some(path) = self.cpu_input.clone() else {
            return SensorReading::Unavailable;
        };
        match read_trimmed(&path) {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(millideg) => SensorReading::Value(millideg),
                Err(e) => SensorReading::Failed(format!("{:?}: {}", path, e)),
            },
            Err(e) => {
                // The hwmon index may have moved; rediscover next cycle.
                self.cpu_input = None;
                SensorReading::Failed(format!("{:?}: {}", path, e))
            }
        }
    }

    fn asic_temperature(&mut self) -> SensorReading {
        let output = match run_command(platform::ASIC_TEMP_COMMAND) {
            Ok(out) => out,
            Err(e) => return SensorReading::Failed(e.to_string()),
        };
        match self
            .asic_pattern
            .captures(&output)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        {
            Some(degrees) => SensorReading::Value((degrees * 1000.0) as i64),
            None => SensorReading::Unavailable,
        }
    }

    fn transceiver_temperature(&mut self, port: usize) -> SensorReading {
        let name = self.port_name(port);
        match self.telemetry.transceiver_temperature(&name) {
            Ok(millideg) => SensorReading::Value(millideg),
            Err(tg_error::ThermError::TelemetryNotReady) => SensorReading::Unavailable,
            Err(e) => SensorReading::Failed(e.to_string()),
        }
    }
}

impl SensorSource for PlatformSensors {
    fn read_temperature(&mut self, slot: Slot) -> SensorReading {
        match slot {
            Slot::Cpu => self.cpu_temperature(),
            Slot::Asic => self.asic_temperature(),
            Slot::Transceiver(port) => self.transceiver_temperature(port),
        }
    }

    fn present(&mut self, slot: Slot) -> bool {
        match slot {
            Slot::Cpu | Slot::Asic => true,
            Slot::Transceiver(port) => self.transceivers.present(port),
        }
    }

    fn port_name(&self, port: usize) -> String {
        format!("Ethernet{}", port * self.lane_stride)
    }
}

/// Scan the hwmon tree for the CPU package temperature input
fn find_cpu_input(hwmon_root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(hwmon_root).ok()?;
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        trace!("scanning hwmon device {:?}", dir);
        let files = match fs::read_dir(&dir) {
            Ok(f) => f,
            Err(_) => continue,
        };
        for file in files.flatten() {
            let fname = file.file_name();
            let fname = fname.to_string_lossy();
            if !(fname.starts_with("temp") && fname.ends_with("_label")) {
                continue;
            }
            let label = match read_trimmed(&file.path()) {
                Ok(l) => l,
                Err(_) => continue,
            };
            if platform::CPU_TEMP_LABELS.iter().any(|want| label == *want) {
                let input = dir.join(fname.replace("_label", "_input"));
                if input.exists() {
                    debug!("CPU package sensor at {:?} (label {:?})", input, label);
                    return Some(input);
                }
            }
        }
    }
    None
}
