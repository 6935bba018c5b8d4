// src/boot.rs
//! Phoenix boot sequence
//!
//! Eight phases in fixed order, run once per process:
//!
//! 1. bootstrap       fatal
//! 2. global init     fatal
//! 3. splash          warning on failure
//! 4. serial          warning on failure
//! 5. filesystem      error + operator pause on failure, boot continues
//! 6. interrupts      fatal
//! 7. network         DHCP, then static fallback; first failure stops the scan
//! 8. guest runtime   absence is recorded, not raised
//!
//! A fatal phase comes back as `KernelError::Boot`; the caller routes it to
//! the fatal handler.

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{HalError, KernelError};
use crate::hal::storage::{DiskView, Partition};
use crate::hal::Machine;
use crate::loader::discover_runtime;
use crate::logging::{LogType, Logger};
use crate::net::{configure_interface, AddressSource, NetworkInterfaceConfig};
use crate::shell::ShellState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    Bootstrap,
    GlobalInit,
    Splash,
    Serial,
    Filesystem,
    Interrupts,
    Network,
    GuestRuntime,
}

impl BootPhase {
    pub const ALL: [BootPhase; 8] = [
        BootPhase::Bootstrap,
        BootPhase::GlobalInit,
        BootPhase::Splash,
        BootPhase::Serial,
        BootPhase::Filesystem,
        BootPhase::Interrupts,
        BootPhase::Network,
        BootPhase::GuestRuntime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BootPhase::Bootstrap => "bootstrap",
            BootPhase::GlobalInit => "global-init",
            BootPhase::Splash => "splash",
            BootPhase::Serial => "serial",
            BootPhase::Filesystem => "filesystem",
            BootPhase::Interrupts => "interrupts",
            BootPhase::Network => "network",
            BootPhase::GuestRuntime => "guest-runtime",
        }
    }

    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            BootPhase::Bootstrap | BootPhase::GlobalInit | BootPhase::Interrupts
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Success,
    Warning(String),
    FatalAbort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPhaseResult {
    pub phase: BootPhase,
    pub outcome: PhaseOutcome,
}

#[derive(Debug, Clone)]
pub struct BootReport {
    pub phases: Vec<BootPhaseResult>,
    pub working_dir: String,
    pub runtime_path: Option<String>,
    pub interfaces: Vec<NetworkInterfaceConfig>,
    pub started_at: DateTime<Local>,
    pub total_ram_kb: u64,
}

impl BootReport {
    pub fn outcome(&self, phase: BootPhase) -> Option<&PhaseOutcome> {
        self.phases
            .iter()
            .find(|r| r.phase == phase)
            .map(|r| &r.outcome)
    }

    pub fn shell_state(&self) -> ShellState {
        let mut state = ShellState::new(self.started_at);
        state.working_dir = self.working_dir.clone();
        state.runtime_path = self.runtime_path.clone();
        state.total_ram_kb = self.total_ram_kb;
        state
    }
}

pub struct BootSequencer<'a> {
    config: &'a Config,
    logger: Logger,
    ran: bool,
    phases: Vec<BootPhaseResult>,
}

impl<'a> BootSequencer<'a> {
    pub fn new(config: &'a Config, logger: Logger) -> Self {
        Self {
            config,
            logger,
            ran: false,
            phases: Vec::with_capacity(BootPhase::ALL.len()),
        }
    }

    /// Phase results so far, including the phase that aborted a failed boot.
    pub fn phases(&self) -> &[BootPhaseResult] {
        &self.phases
    }

    fn record(&mut self, phase: BootPhase, outcome: PhaseOutcome) {
        debug!(phase = phase.name(), outcome = ?outcome, "boot phase");
        self.phases.push(BootPhaseResult { phase, outcome });
    }

    /// Record a fatal phase's result; failure becomes `KernelError::Boot`.
    fn fatal(&mut self, phase: BootPhase, result: Result<(), HalError>) -> Result<(), KernelError> {
        match result {
            Ok(()) => {
                self.record(phase, PhaseOutcome::Success);
                Ok(())
            }
            Err(source) => {
                tracing::error!(phase = phase.name(), error = %source, "fatal boot phase");
                self.record(phase, PhaseOutcome::FatalAbort(source.to_string()));
                Err(KernelError::Boot {
                    phase: phase.name(),
                    source,
                })
            }
        }
    }

    pub fn run(&mut self, m: &mut Machine) -> Result<BootReport, KernelError> {
        if self.ran {
            return Err(KernelError::AlreadyStarted);
        }
        self.ran = true;

        let mut report = BootReport {
            phases: Vec::new(),
            working_dir: String::new(),
            runtime_path: None,
            interfaces: Vec::new(),
            started_at: m.platform.now(),
            total_ram_kb: 0,
        };

        // Stage 1-2: nothing to fall back on
        let result = m.platform.bootstrap();
        self.fatal(BootPhase::Bootstrap, result)?;
        let result = m.platform.global_init();
        self.fatal(BootPhase::GlobalInit, result)?;

        m.console.write_line(&format!("\n\n\n{}", self.config.banner()))?;
        self.logger.info(m, "Kernel loaded and console initialized.")?;
        report.total_ram_kb = m.platform.total_ram_kb();

        // Stage 3-5: degrade
        let splash = self.init_splash(m)?;
        self.record(BootPhase::Splash, splash);
        let serial = self.init_serial(m)?;
        self.record(BootPhase::Serial, serial);
        let fs = self.init_filesystem(m, &mut report)?;
        self.record(BootPhase::Filesystem, fs);

        // Stage 6
        self.logger.info(m, "Enabling global interrupts...")?;
        let result = m.platform.enable_interrupts();
        self.fatal(BootPhase::Interrupts, result)?;

        // Stage 7-8
        let net = self.init_network(m, &mut report)?;
        self.record(BootPhase::Network, net);
        let runtime = self.init_runtime(m, &mut report)?;
        self.record(BootPhase::GuestRuntime, runtime);

        self.logger.info(m, "Init done.")?;
        report.phases = self.phases.clone();
        Ok(report)
    }

    fn init_splash(&self, m: &mut Machine) -> Result<PhaseOutcome, KernelError> {
        if !self.config.system.splash {
            debug!("splash disabled");
            return Ok(PhaseOutcome::Success);
        }
        let banner = self.config.banner();
        Ok(match m.platform.render_splash(&banner) {
            Ok(()) => PhaseOutcome::Success,
            Err(e) => {
                self.logger.warn(m, &format!("Boot graphics skipped: {e}"))?;
                PhaseOutcome::Warning(e.to_string())
            }
        })
    }

    fn init_serial(&self, m: &mut Machine) -> Result<PhaseOutcome, KernelError> {
        if !self.config.serial.enabled {
            debug!("serial disabled");
            return Ok(PhaseOutcome::Success);
        }
        let baud = self.config.serial.baud;
        self.logger.info(m, &format!("Initializing serial port at {baud} baud..."))?;
        Ok(match m.platform.enable_serial(baud) {
            Ok(()) => PhaseOutcome::Success,
            Err(e) => {
                self.logger.warn(m, &format!("Serial port unavailable: {e}"))?;
                PhaseOutcome::Warning(e.to_string())
            }
        })
    }

    fn init_filesystem(
        &self,
        m: &mut Machine,
        report: &mut BootReport,
    ) -> Result<PhaseOutcome, KernelError> {
        self.logger.info(m, "Initializing filesystem...")?;
        match self.mount_working_dir(m) {
            Ok(Some(root)) => {
                report.working_dir = root;
                Ok(PhaseOutcome::Success)
            }
            Ok(None) => Ok(PhaseOutcome::Warning("no working directory".into())),
            Err(e) => {
                self.logger.error(
                    m,
                    &format!("Disk init error: {e}\n\nPress any key to continue."),
                )?;
                m.console.read_key()?;
                Ok(PhaseOutcome::Warning(e.to_string()))
            }
        }
    }

    /// Register the VFS and settle on the first formatted root, disk order.
    fn mount_working_dir(&self, m: &mut Machine) -> Result<Option<String>, HalError> {
        if m.storage.block_device_count() == 0 {
            self.logger.warn(
                m,
                "No supported IDE FAT32/UDF formatted disks are installed.",
            )?;
            return Ok(None);
        }

        m.storage.register_vfs()?;
        self.logger.info(m, "Setting the current working directory...")?;

        let view = DiskView::read(m.storage.as_ref())?;
        for (index, disk) in view.disks().iter().enumerate() {
            let Some(root) = disk.partitions.iter().find_map(Partition::mounted_root) else {
                self.logger.warn(
                    m,
                    &format!("Drive #{index} doesn't have a filesystem or a root path."),
                )?;
                continue;
            };
            m.storage.set_current_dir(root)?;
            let root = m.storage.current_dir().unwrap_or_else(|| root.to_string());
            self.logger.info(m, &format!("Working directory is: \"{root}\""))?;
            return Ok(Some(root));
        }
        Ok(None)
    }

    fn init_network(
        &self,
        m: &mut Machine,
        report: &mut BootReport,
    ) -> Result<PhaseOutcome, KernelError> {
        self.logger.info(m, "Initializing NICs...")?;
        let devices = m.net.devices();
        if devices.is_empty() {
            self.logger.warn(m, "There are no supported NICs installed.")?;
            return Ok(PhaseOutcome::Warning("no network devices".into()));
        }

        for (index, device) in devices.iter().enumerate() {
            let configured =
                configure_interface(m.net.as_mut(), index, device, &self.config.network);
            let iface = match configured {
                Ok(Some(iface)) => iface,
                other => {
                    if let Err(e) = other {
                        debug!(index, error = %e, "static fallback rejected");
                    }
                    self.logger.error(m, "Network configuration failed!")?;
                    let reason = format!("{} could not be configured", device.name);
                    return Ok(PhaseOutcome::Warning(reason));
                }
            };
            if iface.source == AddressSource::Static {
                self.logger.warn(m, "DHCP autoconfig failed, falling back to defaults.")?;
            }
            self.logger.print(m, &format!("{iface}\n"), LogType::None)?;
            report.interfaces.push(iface);
        }
        Ok(PhaseOutcome::Success)
    }

    fn init_runtime(
        &self,
        m: &mut Machine,
        report: &mut BootReport,
    ) -> Result<PhaseOutcome, KernelError> {
        let name = &self.config.storage.runtime_dir;
        match discover_runtime(m.storage.as_ref(), name) {
            Ok(Some(path)) => {
                info!(path = %path, "guest runtime found");
                self.logger.debug(m, &format!("Guest runtime found at \"{path}\""))?;
                report.runtime_path = Some(path);
                Ok(PhaseOutcome::Success)
            }
            Ok(None) => {
                self.logger.warn(
                    m,
                    &format!("No \"{name}\" runtime directory found, external programs are unavailable."),
                )?;
                Ok(PhaseOutcome::Warning("guest runtime not found".into()))
            }
            Err(e) => {
                self.logger.warn(m, &format!("Guest runtime scan failed: {e}"))?;
                Ok(PhaseOutcome::Warning(e.to_string()))
            }
        }
    }
}
