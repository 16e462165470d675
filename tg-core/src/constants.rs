//! Constants and configuration values for thermguard
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! This is the SINGLE SOURCE OF TRUTH for all configuration values.
//! Never use magic numbers in other files - add them here first.

use std::time::Duration;

/// Fan duty cycle policy (percent, 0-100)
pub mod duty {
    /// Duty applied while at the minimum cooling level
    pub const MIN: u8 = 30;

    /// Duty applied while at the medium cooling level
    pub const MID: u8 = 60;

    /// Duty applied while at the maximum cooling level
    pub const MAX: u8 = 100;

    /// Duty applied once at startup, before the first policy decision
    pub const DEFAULT: u8 = 60;
}

/// Timing parameters for the control loop
pub mod timing {
    use super::Duration;

    /// Fixed poll interval between control cycles
    pub const MONITOR_INTERVAL: Duration = Duration::from_secs(30);

    /// Pause after a fan duty write, letting rotor speed settle
    pub const FAN_SETTLE: Duration = Duration::from_secs(1);

    /// Grace period between storage flush and the power-off command
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

    /// Upper bound on any single external command invocation
    pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Platform identifiers and external interface surfaces
pub mod platform {
    /// Number of front-panel transceiver ports
    pub const TRANSCEIVER_PORTS: usize = 64;

    /// Number of fixed thermal sensors (CPU + ASIC)
    pub const FIXED_SENSORS: usize = 2;

    /// Number of fan trays exposed on the fan control surface
    pub const FAN_COUNT: usize = 4;

    /// Interface names advance by this many lanes per physical port
    pub const LANE_STRIDE: usize = 8;

    /// Display name for the CPU package sensor
    pub const CPU_SENSOR_NAME: &str = "CPU_Package_temp";

    /// Display name for the switch ASIC sensor
    pub const ASIC_SENSOR_NAME: &str = "MAC";

    /// hwmon labels accepted as the CPU package sensor
    pub const CPU_TEMP_LABELS: &[&str] = &["CPU_Package_temp", "Package id 0"];

    /// Base path for hwmon devices
    pub const HWMON_ROOT: &str = "/sys/class/hwmon";

    /// Base path of the platform FPGA attributes (fans, transceivers)
    pub const FPGA_SYSFS_ROOT: &str = "/sys/devices/platform/switch_fpga";

    /// Vendor diagnostic command reporting the ASIC die temperature
    pub const ASIC_TEMP_COMMAND: &[&str] = &["bcmcmd", "show temp"];

    /// Line pattern in the vendor diagnostic output carrying the reading
    pub const ASIC_TEMP_PATTERN: &str = r"Average current temperature is\s*(.+)";

    /// Telemetry database holding transceiver DOM readings
    pub const STATE_DB: &str = "STATE_DB";

    /// Telemetry table keyed by interface name
    pub const DOM_SENSOR_TABLE: &str = "TRANSCEIVER_DOM_SENSOR";

    /// Field within a DOM entry carrying degrees Celsius
    pub const TEMPERATURE_FIELD: &str = "temperature";

    /// Service unit that must be active before telemetry lookups
    pub const TELEMETRY_SERVICE: &str = "database.service";

    /// Out-of-band power-off command (BMC resets the ASIC, then cuts PSUs)
    pub const POWER_OFF_COMMAND: &[&str] = &["ipmitool", "raw", "0x34", "0x94", "3"];

    /// Out-of-band thermal report command prefix; temperatures and the
    /// hottest port number are appended as decimal arguments
    pub const THERMAL_REPORT_COMMAND: &[&str] = &["ipmitool", "raw", "0x34", "0x13"];
}

/// Default hysteresis thresholds, millidegrees Celsius
pub mod thresholds {
    pub const CPU_MIN_TO_MID: i64 = 60_000;
    pub const CPU_MID_TO_MAX: i64 = 85_000;
    pub const CPU_MAX_TO_OTP: i64 = 100_000;
    pub const CPU_MAX_TO_MID: i64 = 75_000;

    pub const ASIC_MIN_TO_MID: i64 = 60_000;
    pub const ASIC_MID_TO_MAX: i64 = 90_000;
    pub const ASIC_MAX_TO_OTP: i64 = 105_000;
    pub const ASIC_MAX_TO_MID: i64 = 80_000;

    /// One value per edge, broadcast to every transceiver port
    pub const XCVR_MIN_TO_MID: i64 = 75_000;
    pub const XCVR_MID_TO_MAX: i64 = 75_000;
    pub const XCVR_MAX_TO_OTP: i64 = 75_000;
    pub const XCVR_MAX_TO_MID: i64 = 65_000;
}

/// Synthetic test-mode sensor source
pub mod sim {
    /// Temperature drift per cycle in millidegrees (2 degrees)
    pub const DRIFT_STEP: i64 = 2_000;
}
