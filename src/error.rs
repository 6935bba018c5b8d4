// src/error.rs
//
// Phoenix error tiers
// - HalError: a collaborator refused or failed an operation
// - GuestError: the guest program could not be loaded, or crashed
// - CommandError: tier 1, caught at the command boundary and printed
// - KernelError: tier 3, routed to the fatal handler, never recovered
// - ConfigError: raised before a machine exists

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Sentinel code shown when a shutdown request returned control.
pub const SHUTDOWN_FAILED_CODE: i32 = -256;
/// Sentinel code shown when a reboot request returned control.
pub const REBOOT_FAILED_CODE: i32 = -255;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("'{0}' is not on a mounted filesystem")]
    NotMounted(String),

    #[error("'{0}' does not exist")]
    NotFound(String),

    #[error("{what} index {index} is out of range (0-{max})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        max: usize,
    },

    #[error("the path is empty")]
    EmptyPath,

    #[error("{0} is not supported on this machine")]
    Unsupported(&'static str),

    #[error("device error: {0}")]
    Device(String),
}

#[derive(Debug, Error)]
pub enum GuestError {
    #[error("'{0}' is not a loadable program image")]
    InvalidImage(String),

    #[error("failed to launch guest: {0}")]
    Launch(#[source] io::Error),

    #[error("guest crashed (exit code {})", exit_code(.code))]
    Crashed { code: Option<i32> },

    #[error("guest called unknown host hook '{0}'")]
    UnknownHook(String),

    #[error("host hook '{name}' failed: {source}")]
    Hook {
        name: String,
        #[source]
        source: HalError,
    },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("The kernel has already been started. A kernel cannot be started twice.")]
    AlreadyStarted,

    #[error("boot phase '{phase}' failed: {source}")]
    Boot {
        phase: &'static str,
        #[source]
        source: HalError,
    },

    #[error("console failure: {0}")]
    Console(#[from] HalError),

    #[error("Shutdown failed!")]
    ShutdownFailed,

    #[error("Reboot failed!")]
    RebootFailed,
}

impl KernelError {
    /// Numeric code printed on the fatal screen.
    pub fn code(&self) -> i32 {
        match self {
            KernelError::AlreadyStarted => 1,
            KernelError::Boot { phase, .. } => match *phase {
                "bootstrap" => 16,
                "global-init" => 17,
                "interrupts" => 18,
                _ => 19,
            },
            KernelError::Console(_) => 32,
            KernelError::ShutdownFailed => SHUTDOWN_FAILED_CODE,
            KernelError::RebootFailed => REBOOT_FAILED_CODE,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    MissingArgument(&'static str),

    #[error("Invalid command: \"{0}\"")]
    InvalidCommand(String),

    #[error("The directory \"{0}\" does not exist.")]
    DirectoryNotFound(String),

    #[error("Invalid IP address: \"{0}\"")]
    InvalidAddress(String),

    #[error("no working directory, no filesystem is mounted")]
    NoWorkingDirectory,

    #[error("There are no disks to format.")]
    NoDisks,

    #[error("\"{0}\" is not a valid number")]
    InvalidSelection(String),

    #[error("input ended before the command completed")]
    InputClosed,

    #[error("guest runtime not found: no '{0}' directory on any mounted partition")]
    RuntimeNotFound(String),

    #[error(transparent)]
    Hal(#[from] HalError),

    #[error(transparent)]
    Guest(#[from] GuestError),

    #[error(transparent)]
    Fatal(#[from] KernelError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
