// src/kernel.rs
//! Top-level driver: boot once, run the shell, route anything fatal to containment.

use tracing::info;

use crate::boot::{BootReport, BootSequencer};
use crate::config::Config;
use crate::error::KernelError;
use crate::fatal::FatalErrorHandler;
use crate::hal::Machine;
use crate::logging::Logger;
use crate::shell::CommandShell;

pub struct Kernel {
    machine: Machine,
    config: Config,
    logger: Logger,
    started: bool,
}

impl Kernel {
    pub fn new(machine: Machine, config: Config) -> Self {
        let logger = Logger::new(config.system.debug);
        Self {
            machine,
            config,
            logger,
            started: false,
        }
    }

    pub fn machine(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn boot(&mut self) -> Result<BootReport, KernelError> {
        if self.started {
            return Err(KernelError::AlreadyStarted);
        }
        self.started = true;
        BootSequencer::new(&self.config, self.logger).run(&mut self.machine)
    }

    /// Boot, then prompt until `halt` or end of input.
    pub fn run(&mut self) -> Result<(), KernelError> {
        let report = self.boot()?;
        info!(
            working_dir = %report.working_dir,
            interfaces = report.interfaces.len(),
            runtime = report.runtime_path.is_some(),
            "boot complete"
        );
        let mut shell = CommandShell::new(&self.config, self.logger, report.shell_state());
        shell.run(&mut self.machine)
    }

    /// `run`, with every fatal error contained. Returns only after a clean halt.
    pub fn start(&mut self) {
        if let Err(err) = self.run() {
            FatalErrorHandler::new(self.config.fatal.clone()).critical_error(
                &mut self.machine,
                &err.to_string(),
                err.code(),
            );
        }
    }
}
