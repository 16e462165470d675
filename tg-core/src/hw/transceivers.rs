//! Transceiver presence and low-power-mode control (platform sysfs)
//!
//! Ports are numbered from 0 internally; the platform attributes are
//! 1-based (`module_present_1` .. `module_present_N`).

use std::path::PathBuf;

use tg_error::{Result, ThermError};

use crate::constants::platform;
use crate::hw::read_trimmed;
use crate::platform::TransceiverControl;

#[derive(Clone)]
pub struct SysfsTransceivers {
    root: PathBuf,
}

impl SysfsTransceivers {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_platform() -> Self {
        Self::new(platform::FPGA_SYSFS_ROOT)
    }

    /// Whether a module sits in the port. Read failures count as absent.
    pub fn present(&self, port: usize) -> bool {
        let path = self.root.join(format!("module_present_{}", port + 1));
        matches!(read_trimmed(&path).as_deref(), Ok("1"))
    }
}

impl TransceiverControl for SysfsTransceivers {
    fn set_low_power_mode(&mut self, port: usize, enable: bool) -> Result<()> {
        let path = self.root.join(format!("module_lpmode_{}", port + 1));
        std::fs::write(&path, if enable { "1" } else { "0" }).map_err(|e| {
            ThermError::Transceiver {
                port,
                reason: format!("{:?}: {}", path, e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_presence_is_one_based_on_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("module_present_1"), "1\n").unwrap();
        fs::write(dir.path().join("module_present_2"), "0\n").unwrap();

        let xcvrs = SysfsTransceivers::new(dir.path());
        assert!(xcvrs.present(0));
        assert!(!xcvrs.present(1));
        // No attribute at all reads as absent.
        assert!(!xcvrs.present(2));
    }

    #[test]
    fn test_lpmode_write() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("module_lpmode_5"), "0\n").unwrap();

        let mut xcvrs = SysfsTransceivers::new(dir.path());
        xcvrs.set_low_power_mode(4, true).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("module_lpmode_5")).unwrap(),
            "1"
        );
    }

    #[test]
    fn test_lpmode_write_failure_names_port() {
        let mut xcvrs = SysfsTransceivers::new("/nonexistent-root");
        let err = xcvrs.set_low_power_mode(7, true).unwrap_err();
        assert!(matches!(err, ThermError::Transceiver { port: 7, .. }));
    }
}
