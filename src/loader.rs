// src/loader.rs
//
// External program loader
// - the runtime image directory is a fixed-name directory on any mounted partition
// - boot records the first match; the loader rediscovers on demand when boot found none
// - guest faults come back as CommandError::Guest and never reach the fatal handler

use tracing::{debug, info};

use crate::error::{CommandError, HalError};
use crate::hal::console::Console;
use crate::hal::guest::GuestProgram;
use crate::hal::storage::{DiskView, Storage};
use crate::hal::Machine;

pub const HOOK_TEST_SUCCESS: &str = "TestSuccess";
pub const HOOK_TESTS_COMPLETE: &str = "TestsComplete";

/// First `<root>/<name>` directory across every mounted partition, in disk order.
pub fn discover_runtime(storage: &dyn Storage, name: &str) -> Result<Option<String>, HalError> {
    let view = DiskView::read(storage)?;
    let found = view
        .mounted_roots()
        .map(|root| format!("{}/{name}", root.trim_end_matches('/')))
        .find(|candidate| storage.dir_exists(candidate));
    debug!(name, found = ?found, "runtime scan");
    Ok(found)
}

pub struct ExternalProgramLoader<'a> {
    runtime_dir_name: &'a str,
}

impl<'a> ExternalProgramLoader<'a> {
    pub fn new(runtime_dir_name: &'a str) -> Self {
        Self { runtime_dir_name }
    }

    /// Runtime path from boot, or a fresh scan. Caches a fresh hit and
    /// drops a cached path whose directory has since disappeared.
    fn runtime(&self, m: &Machine, cached: &mut Option<String>) -> Result<String, CommandError> {
        match cached.as_ref() {
            Some(path) if m.storage.dir_exists(path) => return Ok(path.clone()),
            Some(_) => *cached = None,
            None => {}
        }
        match discover_runtime(m.storage.as_ref(), self.runtime_dir_name)? {
            Some(path) => {
                *cached = Some(path.clone());
                Ok(path)
            }
            None => Err(CommandError::RuntimeNotFound(self.runtime_dir_name.to_string())),
        }
    }

    /// Load `path` as a guest program and run it to completion.
    pub fn run(
        &self,
        m: &mut Machine,
        runtime_path: &mut Option<String>,
        path: &str,
    ) -> Result<(), CommandError> {
        let runtime = self.runtime(m, runtime_path)?;
        let full = m.storage.full_path(path)?;
        let image = m.storage.read(&full)?;
        let program = GuestProgram::from_image(full, image)?;
        info!(program = %program.path, runtime = %runtime, "starting guest");

        let mut context = m.runtime.instantiate(program, &runtime)?;
        context.register_hook(
            HOOK_TEST_SUCCESS,
            Box::new(|args: &[String], console: &mut dyn Console| {
                let name = args.first().map(String::as_str).unwrap_or("unnamed");
                console.write_line(&format!("{name} test succeeded"))
            }),
        );
        context.register_hook(
            HOOK_TESTS_COMPLETE,
            Box::new(|_: &[String], console: &mut dyn Console| {
                console.write_line("All Tests Completed.")
            }),
        );
        context.run(m.console.as_mut())?;
        Ok(())
    }
}
