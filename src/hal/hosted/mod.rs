// src/hal/hosted/mod.rs
//! Host-OS implementations of every collaborator, used by the `phoenix` binary.

pub mod console;
pub mod editor;
pub mod guest;
pub mod net;
pub mod platform;
pub mod storage;

pub use console::HostConsole;
pub use editor::ExternalEditor;
pub use guest::ProcessRuntime;
pub use net::HostNetwork;
pub use platform::HostPlatform;
pub use storage::HostStorage;

use crate::config::Config;
use crate::hal::Machine;

impl Machine {
    /// Wire the host implementations according to `config`.
    pub fn hosted(config: &Config) -> Self {
        Machine::new(
            Box::new(HostConsole::new()),
            Box::new(HostStorage::new(config.storage.disks.clone())),
            Box::new(HostNetwork::discover()),
            Box::new(HostPlatform::new(config.serial.path.clone())),
            Box::new(ProcessRuntime::new(config.runtime.launcher.clone())),
            Box::new(ExternalEditor::new(config.editor.program.clone())),
        )
    }
}
