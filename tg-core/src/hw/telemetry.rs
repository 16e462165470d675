//! Transceiver DOM telemetry lookups
//!
//! Module temperatures are published by the platform telemetry stack into the
//! state database; this client reads them back one keyed field at a time. The
//! database service may come up well after this daemon, so lookups are gated
//! on a readiness probe and degrade quietly until it passes.

use tracing::debug;

use tg_error::{Result, ThermError};

use crate::constants::platform;
use crate::hw::run_command;

pub struct TelemetryStore {
    /// Readiness is sticky once observed; the service going away later just
    /// surfaces as per-lookup failures.
    ready: bool,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self { ready: false }
    }

    /// Probe whether the backing database service is active
    pub fn is_ready(&mut self) -> bool {
        if self.ready {
            return true;
        }
        match run_command(&["systemctl", "is-active", platform::TELEMETRY_SERVICE]) {
            Ok(state) if state == "active" => {
                debug!("{} is active", platform::TELEMETRY_SERVICE);
                self.ready = true;
                true
            }
            Ok(state) => {
                debug!("{} is {}", platform::TELEMETRY_SERVICE, state);
                false
            }
            Err(e) => {
                debug!("readiness probe failed: {}", e);
                false
            }
        }
    }

    /// Temperature of one interface in millidegrees Celsius.
    ///
    /// The store publishes degrees as a decimal string; a missing entry or an
    /// unparseable field is an error for the caller to degrade on.
    pub fn transceiver_temperature(&mut self, iface_name: &str) -> Result<i64> {
        if !self.is_ready() {
            return Err(ThermError::TelemetryNotReady);
        }

        let key = format!("{}|{}", platform::DOM_SENSOR_TABLE, iface_name);
        let value = run_command(&[
            "sonic-db-cli",
            platform::STATE_DB,
            "HGET",
            &key,
            platform::TEMPERATURE_FIELD,
        ])
        .map_err(|e| ThermError::TelemetryLookup {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        if value.is_empty() {
            return Err(ThermError::TelemetryLookup {
                key,
                reason: "no such field".into(),
            });
        }

        parse_degrees(&value).ok_or(ThermError::TelemetryLookup {
            key,
            reason: format!("unparseable temperature {:?}", value),
        })
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Degrees-as-string to millidegrees
fn parse_degrees(s: &str) -> Option<i64> {
    s.trim().parse::<f64>().ok().map(|deg| (deg * 1000.0) as i64)
}
