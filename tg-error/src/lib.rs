//! Unified error handling for thermguard
//!
//! This crate provides a single error type used across all thermguard
//! components. It uses thiserror for ergonomic error definitions with proper
//! Display and Error trait impls.

use std::io;

/// Result type alias using ThermError
pub type Result<T> = std::result::Result<T, ThermError>;

/// Unified error type for all thermguard operations
#[derive(thiserror::Error, Debug)]
pub enum ThermError {
    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ============================================================================
    // External Command Errors
    // ============================================================================
    #[error("Command `{command}` failed: {reason}")]
    CommandFailed {
        command: String,
        reason: String,
    },

    #[error("Command `{command}` produced unparseable output: {output}")]
    CommandOutput {
        command: String,
        output: String,
    },

    // ============================================================================
    // Sensor Errors
    // ============================================================================
    #[error("Failed to read sensor {sensor}: {reason}")]
    SensorRead {
        sensor: String,
        reason: String,
    },

    #[error("Telemetry store is not ready")]
    TelemetryNotReady,

    #[error("Telemetry lookup for {key} failed: {reason}")]
    TelemetryLookup {
        key: String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fan Errors
    // ============================================================================
    #[error("Failed to read fan {fan}: {reason}")]
    FanRead {
        fan: String,
        reason: String,
    },

    #[error("Failed to write duty cycle to fan {fan}: {reason}")]
    FanWrite {
        fan: String,
        reason: String,
    },

    #[error("Invalid duty cycle value: {value} (must be 0-100)")]
    InvalidDutyCycle {
        value: u8,
    },

    // ============================================================================
    // Transceiver and Power Errors
    // ============================================================================
    #[error("Transceiver port {port}: {reason}")]
    Transceiver {
        port: usize,
        reason: String,
    },

    #[error("Power-off command failed: {0}")]
    PowerOff(String),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Daemon must run as root (euid=0) for hardware access")]
    NotRoot,

    #[error("{0}")]
    Generic(String),
}

impl ThermError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a sensor read error
    pub fn sensor(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SensorRead {
            sensor: sensor.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failure error
    pub fn command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

// Allow converting from String to ThermError
impl From<String> for ThermError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to ThermError
impl From<&str> for ThermError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
