// src/hal/hosted/guest.rs
//
// Guest programs as child processes
// - runs `<runtime>/<launcher> <program>` when the runtime ships a launcher, else the program itself
// - `PHOENIX_RUNTIME_DIR` tells the guest where its runtime image lives
// - stdout lines `@phoenix <hook> [args...]` call back into the host; others are echoed

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::error::GuestError;
use crate::hal::console::Console;
use crate::hal::guest::{ExecutionContext, GuestProgram, GuestRuntime, HostHook};

pub const RUNTIME_ENV: &str = "PHOENIX_RUNTIME_DIR";
pub const HOOK_PREFIX: &str = "@phoenix";

pub struct ProcessRuntime {
    launcher: String,
}

impl ProcessRuntime {
    pub fn new(launcher: impl Into<String>) -> Self {
        Self {
            launcher: launcher.into(),
        }
    }
}

impl GuestRuntime for ProcessRuntime {
    fn instantiate(
        &mut self,
        program: GuestProgram,
        runtime_dir: &str,
    ) -> Result<Box<dyn ExecutionContext>, GuestError> {
        let launcher = Path::new(runtime_dir).join(&self.launcher);
        let mut command = if launcher.is_file() {
            let mut c = Command::new(&launcher);
            c.arg(&program.path);
            c
        } else {
            Command::new(&program.path)
        };
        command
            .env(RUNTIME_ENV, runtime_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        debug!(
            program = %program.path,
            format = ?program.format,
            runtime_dir,
            "guest instantiated"
        );

        Ok(Box::new(ProcessContext {
            command,
            hooks: HashMap::new(),
        }))
    }
}

pub struct ProcessContext {
    command: Command,
    hooks: HashMap<String, HostHook>,
}

impl ProcessContext {
    fn dispatch(&mut self, line: &str, console: &mut dyn Console) -> Result<(), GuestError> {
        let mut parts = line.split_whitespace().skip(1);
        let Some(name) = parts.next() else {
            return Err(GuestError::UnknownHook(String::new()));
        };
        let args: Vec<String> = parts.map(str::to_string).collect();
        let hook = self
            .hooks
            .get_mut(name)
            .ok_or_else(|| GuestError::UnknownHook(name.to_string()))?;
        hook(args.as_slice(), console).map_err(|source| GuestError::Hook {
            name: name.to_string(),
            source,
        })
    }

    fn pump(&mut self, child: &mut Child, console: &mut dyn Console) -> Result<(), GuestError> {
        let Some(stdout) = child.stdout.take() else {
            return Ok(());
        };
        let mut reader = BufReader::new(stdout);
        let mut bytes = Vec::new();
        loop {
            bytes.clear();
            if reader
                .read_until(b'\n', &mut bytes)
                .map_err(GuestError::Launch)?
                == 0
            {
                break;
            }
            while matches!(bytes.last(), Some(b'\n' | b'\r')) {
                bytes.pop();
            }
            let line = String::from_utf8_lossy(&bytes);
            if line == HOOK_PREFIX || line.starts_with(&format!("{HOOK_PREFIX} ")) {
                self.dispatch(&line, console)?;
            } else {
                console
                    .write_line(&line)
                    .map_err(|source| GuestError::Hook {
                        name: "console".into(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

impl ExecutionContext for ProcessContext {
    fn register_hook(&mut self, name: &str, hook: HostHook) {
        self.hooks.insert(name.to_string(), hook);
    }

    fn run(&mut self, console: &mut dyn Console) -> Result<(), GuestError> {
        let mut child = self.command.spawn().map_err(GuestError::Launch)?;
        if let Err(e) = self.pump(&mut child, console) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
        let status = child.wait().map_err(GuestError::Launch)?;
        if !status.success() {
            return Err(GuestError::Crashed {
                code: status.code(),
            });
        }
        info!("guest exited cleanly");
        Ok(())
    }
}
