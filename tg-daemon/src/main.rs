//! Thermguard Daemon (thermguardd)
//!
//! Privileged thermal-protection service for switch platforms. Samples the
//! CPU, switch ASIC, and transceiver temperatures on a fixed interval, drives
//! fan duty through a hysteretic level state machine, and executes an
//! emergency power-off on sustained over-temperature.
//!
//! # Operation
//! - **Privilege**: runs as root for sysfs and ipmitool access
//! - **Logging**: systemd journal when available, stdout otherwise
//! - **Signals**: SIGTERM/SIGINT set a stop flag observed at the next
//!   iteration boundary
//! - **Test mode**: `-t CPU ASIC SFP` substitutes synthetic drifting
//!   temperatures and a dry-run power hook for the live platform

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use tg_core::constants::platform;
use tg_core::hw::{BmcReporter, IpmiPower, PlatformSensors, SysfsFans, SysfsTransceivers, TelemetryStore};
use tg_core::policy::PolicyEngine;
use tg_core::sim::{DriftHandle, DriftSource, DryRunPower, DryRunTransceivers};
use tg_core::thresholds::ThresholdTable;
use tg_core::{FanActuator, SensorReader, ShutdownController};

use tg_daemon::monitor::Monitor;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transceiver ports reported as present in test mode
const TEST_MODE_PORTS: usize = 2;

struct Options {
    debug: bool,
    log_file: Option<String>,
    interval: Option<u64>,
    /// Starting CPU/ASIC/transceiver temperatures, millidegrees
    test_temps: Option<[i64; 3]>,
}

fn print_help() {
    eprintln!("thermguardd {} - switch thermal protection daemon", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    thermguardd [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -d, --debug           Verbose logging");
    eprintln!("    -l, --lfile PATH      Accepted for compatibility; logs go to the journal");
    eprintln!("    -i, --interval SECS   Override the poll interval");
    eprintln!("    -t CPU ASIC SFP       Test mode: three starting temperatures in degrees,");
    eprintln!("                          drifting 2 degrees per cycle, dry-run power-off");
    eprintln!("    -v, --version         Print version");
    eprintln!("    -h, --help            Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    THERMGUARD_LOG        Log level (trace, debug, info, warn, error)");
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        debug: false,
        log_file: None,
        interval: None,
        test_temps: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-v" | "--version" => {
                println!("thermguardd {}", VERSION);
                return Ok(None);
            }
            "-d" | "--debug" => {
                options.debug = true;
            }
            "-l" | "--lfile" => {
                i += 1;
                let path = args.get(i).ok_or("--lfile requires a path argument")?;
                options.log_file = Some(path.clone());
            }
            "-i" | "--interval" => {
                i += 1;
                let secs = args.get(i).ok_or("--interval requires a seconds argument")?;
                let secs: u64 = secs
                    .parse()
                    .map_err(|_| format!("invalid interval: {}", secs))?;
                options.interval = Some(secs);
            }
            "-t" => {
                let mut temps = [0i64; 3];
                for temp in temps.iter_mut() {
                    i += 1;
                    let raw = args.get(i).ok_or("temp test, need input 3 temp")?;
                    let degrees: i64 = raw
                        .parse()
                        .map_err(|_| format!("invalid temperature: {}", raw))?;
                    *temp = degrees * 1000;
                }
                options.test_temps = Some(temps);
                // Test mode always runs verbose.
                options.debug = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(Some(options))
}

/// Initialize logging to the systemd journal, falling back to stdout
fn init_logging(debug: bool) -> bool {
    let default_level = if debug { "debug" } else { "info" };
    let log_level =
        std::env::var("THERMGUARD_LOG").unwrap_or_else(|_| default_level.to_string());

    let mut use_journald = Path::new("/run/systemd/journal/socket").exists();

    if use_journald {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(tracing_subscriber::EnvFilter::new(&log_level))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
                use_journald = false;
                tracing_subscriber::fmt()
                    .with_target(false)
                    .with_level(true)
                    .with_env_filter(&log_level)
                    .init();
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .with_env_filter(&log_level)
            .init();
    }

    use_journald
}

/// Verify we're running as root
fn verify_privileges() -> Result<(), &'static str> {
    // SAFETY: geteuid is always safe - it just returns the process's
    // effective user ID.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        return Err("Error: Root privileges are required");
    }
    Ok(())
}

/// Wire the monitor against the live platform
fn build_platform_monitor() -> Monitor {
    let transceivers = SysfsTransceivers::default_platform();
    let sensors = PlatformSensors::new(TelemetryStore::new(), transceivers.clone());
    let reader = SensorReader::new(Box::new(sensors), platform::TRANSCEIVER_PORTS);
    let actuator = FanActuator::new(Box::new(SysfsFans::new(platform::FPGA_SYSFS_ROOT)));
    let shutdown = ShutdownController::new(Box::new(transceivers), Box::new(IpmiPower));

    Monitor::new(reader, PolicyEngine::new(ThresholdTable::default()), actuator, shutdown)
        .with_reporter(Box::new(BmcReporter))
}

/// Wire the monitor against the synthetic drift source and dry-run actuators
fn build_test_monitor(bases: [i64; 3]) -> Monitor {
    info!("Test mode: starting temperatures {:?} (millidegrees)", bases);

    let handle = DriftHandle::default();
    let mut ports = vec![false; platform::TRANSCEIVER_PORTS];
    for present in ports.iter_mut().take(TEST_MODE_PORTS) {
        *present = true;
    }
    let source = DriftSource::new(bases, ports, handle.clone());
    let reader = SensorReader::new(Box::new(source), platform::TRANSCEIVER_PORTS);
    // Fans still come from the real surface in test mode; duty writes are
    // the observable output of the exercise.
    let actuator = FanActuator::new(Box::new(SysfsFans::new(platform::FPGA_SYSFS_ROOT)));
    let shutdown = ShutdownController::new(
        Box::new(DryRunTransceivers),
        Box::new(DryRunPower::new(handle)),
    );

    Monitor::new(reader, PolicyEngine::new(ThresholdTable::default()), actuator, shutdown)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return Ok(()),
        Err(msg) => {
            eprintln!("{}", msg);
            print_help();
            std::process::exit(1);
        }
    };

    let use_journald = init_logging(options.debug);

    info!("STARTUP: thermguardd {} starting", VERSION);
    info!(
        "STARTUP: Logging to {}",
        if use_journald { "systemd journal" } else { "stdout" }
    );
    if let Some(path) = &options.log_file {
        info!("STARTUP: -l {} accepted; file logging is handled by the journal", path);
    }

    if let Err(e) = verify_privileges() {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // Stop flag, set by SIGTERM/SIGINT and observed at iteration boundaries.
    let stop = Arc::new(AtomicBool::new(false));
    let stop_signal = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Caught SIGTERM - exiting...");
        stop_signal.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to set signal handler: {}. Shutdown via signals may not work cleanly.", e);
    }

    let mut monitor = match options.test_temps {
        Some(bases) => build_test_monitor(bases),
        None => build_platform_monitor(),
    };
    if let Some(secs) = options.interval {
        monitor = monitor.with_interval(Duration::from_secs(secs));
    }

    info!("STARTUP: PID: {}", std::process::id());
    monitor.run(stop).await;

    info!("SHUTDOWN: Daemon terminated gracefully");
    Ok(())
}
