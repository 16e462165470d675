//! Out-of-band power control and thermal reporting
//!
//! Both talk to the management controller through raw ipmitool commands. The
//! power-off is delegated: the BMC resets the ASIC first, then drops PSU
//! output, so the host side only has to flush its own storage beforehand.

use tracing::{debug, warn};

use tg_error::{Result, ThermError};

use crate::constants::platform;
use crate::hw::run_command;
use crate::platform::{EmergencyPower, ThermalReport};

/// Production power-off path
pub struct IpmiPower;

impl EmergencyPower for IpmiPower {
    fn flush_storage(&mut self) -> Result<()> {
        run_command(&["sync"])?;
        // Trim is opportunistic; not every deployment has a trimmable disk.
        if let Err(e) = run_command(&["/sbin/fstrim", "-av"]) {
            warn!("fstrim failed: {}", e);
        }
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        run_command(platform::POWER_OFF_COMMAND)
            .map(|_| ())
            .map_err(|e| ThermError::PowerOff(e.to_string()))
    }
}

/// Per-cycle thermal report towards the BMC
pub struct BmcReporter;

impl ThermalReport for BmcReporter {
    fn send(&mut self, asic_millideg: i64, hottest: Option<(usize, i64)>) -> Result<()> {
        let (port, sfp_millideg) = hottest.unwrap_or((0, 0));
        let asic_deg = (asic_millideg / 1000).to_string();
        let sfp_deg = (sfp_millideg / 1000).to_string();
        // The report carries 1-based port numbering, 0 meaning "no module".
        let port_arg = if hottest.is_some() { port + 1 } else { 0 }.to_string();

        let mut argv: Vec<&str> = platform::THERMAL_REPORT_COMMAND.to_vec();
        argv.push(&asic_deg);
        argv.push(&sfp_deg);
        argv.push(&port_arg);

        debug!("thermal report: asic={} sfp={} port={}", asic_deg, sfp_deg, port_arg);
        run_command(&argv).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_argument_shape() {
        // The command prefix is fixed; the three appended arguments are
        // whole degrees and a 1-based port.
        assert_eq!(
            platform::THERMAL_REPORT_COMMAND,
            &["ipmitool", "raw", "0x34", "0x13"]
        );
        let asic = 67_800i64;
        let hottest = Some((11usize, 54_200i64));
        let (port, sfp) = hottest.unwrap();
        assert_eq!((asic / 1000).to_string(), "67");
        assert_eq!((sfp / 1000).to_string(), "54");
        assert_eq!((port + 1).to_string(), "12");
    }
}
