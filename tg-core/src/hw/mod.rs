//! Production platform adapters
//!
//! Implementations of the capability traits against the real surfaces: the
//! hwmon tree, the vendor ASIC diagnostic, the transceiver telemetry store,
//! the platform fan/transceiver sysfs attributes, and the out-of-band
//! management controller.

mod fans;
mod power;
mod sensors;
mod telemetry;
mod transceivers;

pub use fans::SysfsFans;
pub use power::{BmcReporter, IpmiPower};
pub use sensors::PlatformSensors;
pub use telemetry::TelemetryStore;
pub use transceivers::SysfsTransceivers;

use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

use tg_error::{Result, ThermError};

use crate::constants::timing;

/// Run an external command, returning trimmed stdout on success.
///
/// The wait is bounded: a collaborator that hangs past the deadline turns
/// into a command failure instead of stalling the control cycle. The worker
/// thread is left behind to reap the child if it ever exits.
pub(crate) fn run_command(argv: &[&str]) -> Result<String> {
    run_command_with_timeout(argv, timing::COMMAND_TIMEOUT)
}

pub(crate) fn run_command_with_timeout(argv: &[&str], timeout: Duration) -> Result<String> {
    let command_line = argv.join(" ");
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ThermError::generic("empty command"))?;

    let program = program.to_string();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(Command::new(program).args(args).output());
    });

    let output = match rx.recv_timeout(timeout) {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(ThermError::command(command_line, e.to_string())),
        Err(_) => {
            return Err(ThermError::command(
                command_line,
                format!("timed out after {}s", timeout.as_secs_f64()),
            ))
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ThermError::command(
            command_line,
            format!("exit status {:?}: {}", output.status.code(), stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Read a sysfs attribute as a trimmed string
pub(crate) fn read_trimmed(path: &std::path::Path) -> std::io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_captures_stdout() {
        let out = run_command(&["echo", "hello"]).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_run_command_maps_failure() {
        let err = run_command(&["false"]).unwrap_err();
        assert!(matches!(err, ThermError::CommandFailed { .. }));
    }

    #[test]
    fn test_run_command_missing_binary() {
        let err = run_command(&["definitely-not-a-real-binary-xyz"]).unwrap_err();
        assert!(matches!(err, ThermError::CommandFailed { .. }));
    }

    #[test]
    fn test_run_command_bounded_wait() {
        let err =
            run_command_with_timeout(&["sleep", "5"], Duration::from_millis(100)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("timed out"), "got: {}", message);
    }
}
