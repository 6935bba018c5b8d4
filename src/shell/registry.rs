// src/shell/registry.rs
//
// Command table
// - one entry per handler; every alias is a key pointing at the same entry
// - `usage` doubles as the `help` line and the text of CommandError::Usage

use std::collections::HashMap;

use crate::error::CommandError;
use crate::shell::{files, format, network, system, CommandInvocation, Ctx, Flow};

pub type Handler = fn(&mut Ctx<'_>, &CommandInvocation) -> Result<Flow, CommandError>;

pub struct Command {
    /// Primary name first, then aliases.
    pub names: &'static [&'static str],
    pub usage: &'static str,
    pub about: &'static str,
    pub run: Handler,
}

// ───────────────────────────── table ─────────────────────────────

#[rustfmt::skip]
pub static COMMANDS: &[Command] = &[
    // power
    Command { names: &["shutdown", "turnoff", "poweroff"], usage: "shutdown", about: "power the machine off", run: system::shutdown },
    Command { names: &["reboot", "restart", "reset"], usage: "reboot", about: "restart the machine", run: system::reboot },
    // filesystem
    Command { names: &["cat", "read"], usage: files::CAT_USAGE, about: "print a file", run: files::cat },
    Command { names: &["ed", "edit", "change"], usage: "ed [path]", about: "open the editor", run: files::edit },
    Command { names: &["rm", "del"], usage: files::RM_USAGE, about: "delete a file, or a directory with -rf", run: files::remove },
    Command { names: &["cp", "copy", "duplicate"], usage: files::CP_USAGE, about: "copy a file", run: files::copy },
    Command { names: &["mv", "move", "transfer"], usage: files::MV_USAGE, about: "move a file (copy, then delete)", run: files::move_file },
    Command { names: &["mkf"], usage: files::MKF_USAGE, about: "create an empty file", run: files::make_file },
    Command { names: &["mkdir"], usage: files::MKDIR_USAGE, about: "create a directory", run: files::make_dir },
    Command { names: &["ls", "dir"], usage: "ls", about: "list the working directory", run: files::list },
    Command { names: &["cd"], usage: "cd <path> | cd \"<path with spaces>\"", about: "change the working directory", run: files::change_dir },
    Command { names: &["format"], usage: "format", about: "partition and format a disk", run: format::run },
    // console
    Command { names: &["clear", "cls"], usage: "clear", about: "clear the screen", run: system::clear },
    // system
    Command { names: &["sysinfo", "systeminfo", "sysinformation", "systeminformation"], usage: "sysinfo", about: "system report", run: system::sysinfo },
    Command { names: &["ping"], usage: network::PING_USAGE, about: "ICMP echo a host", run: network::ping },
    Command { names: &["help"], usage: "help [command]", about: "list commands", run: system::help },
    // misc
    Command { names: &["halt", "hlt"], usage: "halt", about: "stop the shell", run: system::halt },
];

pub struct Registry {
    by_name: HashMap<&'static str, &'static Command>,
}

impl Registry {
    pub fn new() -> Self {
        let by_name = COMMANDS
            .iter()
            .flat_map(|cmd| cmd.names.iter().map(move |name| (*name, cmd)))
            .collect();
        Self { by_name }
    }

    pub fn find(&self, name: &str) -> Option<&'static Command> {
        self.by_name.get(name).copied()
    }

    pub fn list(&self) -> &'static [Command] {
        COMMANDS
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
