// src/lib.rs
//! Phoenix: the control plane of a small single-user operating environment.
//!
//! Boot brings the machine's collaborators up in a fixed order, the shell
//! dispatches operator commands over them, and anything unrecoverable lands
//! in a containment loop that never hands control back.
//!
//! Every collaborator sits behind a trait in [`hal`]; [`hal::hosted`] backs
//! them with the host OS.

pub mod boot;
pub mod config;
pub mod error;
pub mod fatal;
pub mod hal;
pub mod kernel;
pub mod loader;
pub mod logging;
pub mod net;
pub mod shell;

pub use boot::{BootPhase, BootPhaseResult, BootReport, BootSequencer, PhaseOutcome};
pub use config::Config;
pub use error::{CommandError, ConfigError, GuestError, HalError, KernelError};
pub use fatal::{AlarmTimer, CriticalErrorRecord, FatalErrorHandler};
pub use hal::Machine;
pub use kernel::Kernel;
pub use loader::ExternalProgramLoader;
pub use logging::{LogType, Logger};
pub use shell::{CommandInvocation, CommandShell, DiskFormatWizard, Flow, ShellState};
