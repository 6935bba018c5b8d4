// src/shell/mod.rs
//
// Phoenix command shell
// - Prompting -> Dispatching -> Prompting, until `halt`, end of input, or a fatal error
// - one line = one CommandInvocation, split on whitespace; quoting is per command (`cd`)
// - first token looked up in the static registry; unknown tokens naming a file go to the loader
// - tier-1 errors are printed here and never leave; `CommandError::Fatal` does
// - every dispatch, even an empty line, ends with a reclaim pass on the platform

pub mod files;
pub mod format;
pub mod network;
pub mod registry;
pub mod state;
pub mod system;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CommandError, KernelError};
use crate::hal::console::Color;
use crate::hal::Machine;
use crate::loader::ExternalProgramLoader;
use crate::logging::Logger;

pub use format::DiskFormatWizard;
pub use registry::{Command, Registry};
pub use state::ShellState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let command = tokens.next()?;
        Some(Self {
            command,
            args: tokens.collect(),
        })
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// What a handler gets to work with.
pub struct Ctx<'a> {
    pub m: &'a mut Machine,
    pub state: &'a mut ShellState,
    pub config: &'a Config,
    pub logger: Logger,
}

pub struct CommandShell<'a> {
    config: &'a Config,
    logger: Logger,
    registry: Registry,
    state: ShellState,
}

impl<'a> CommandShell<'a> {
    pub fn new(config: &'a Config, logger: Logger, state: ShellState) -> Self {
        Self {
            config,
            logger,
            registry: Registry::new(),
            state,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// `(<working dir>) <prompt>` with the directory in green.
    fn prompt(&mut self, m: &mut Machine) -> Result<(), KernelError> {
        self.state.used_ram_kb = m.platform.used_ram_kb();
        m.console.write("(")?;
        m.console.set_foreground(Color::Green)?;
        m.console.write(&self.state.working_dir)?;
        m.console.reset_colors()?;
        m.console.write(&format!(") {}", self.config.system.prompt))?;
        Ok(())
    }

    /// Prompt and dispatch until `halt` or end of input.
    pub fn run(&mut self, m: &mut Machine) -> Result<(), KernelError> {
        loop {
            self.prompt(m)?;
            let Some(line) = m.console.read_line()? else {
                m.console.write_line("")?;
                self.logger.info(m, "Console input closed, halting.")?;
                return Ok(());
            };
            if self.execute(m, &line)? == Flow::Halt {
                return Ok(());
            }
        }
    }

    /// Dispatch one input line. Only fatal errors come back as `Err`.
    pub fn execute(&mut self, m: &mut Machine, line: &str) -> Result<Flow, KernelError> {
        let outcome = match CommandInvocation::parse(line) {
            Some(invocation) => self.dispatch(m, &invocation),
            None => Ok(Flow::Continue),
        };
        m.platform.collect_garbage();

        match outcome {
            Ok(flow) => Ok(flow),
            Err(CommandError::Fatal(fatal)) => Err(fatal),
            Err(err) => {
                debug!(error = ?err, "command failed");
                self.logger.error(m, &err.to_string())?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, m: &mut Machine, inv: &CommandInvocation) -> Result<Flow, CommandError> {
        if let Some(command) = self.registry.find(&inv.command) {
            debug!(command = command.names[0], args = inv.args.len(), "dispatch");
            let mut ctx = Ctx {
                m,
                state: &mut self.state,
                config: self.config,
                logger: self.logger,
            };
            return (command.run)(&mut ctx, inv);
        }

        if !m.storage.file_exists(&inv.command) {
            return Err(CommandError::InvalidCommand(inv.command.clone()));
        }
        info!(program = %inv.command, "handing off to loader");
        ExternalProgramLoader::new(&self.config.storage.runtime_dir).run(
            m,
            &mut self.state.runtime_path,
            &inv.command,
        )?;
        Ok(Flow::Continue)
    }
}
