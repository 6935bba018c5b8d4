// src/hal/hosted/platform.rs
//! Host process as the machine: sysinfo telemetry, chrono clock, file-backed serial.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use sysinfo::System;
use tracing::{debug, warn};

use crate::error::HalError;
use crate::hal::platform::Platform;

pub struct HostPlatform {
    sys: System,
    serial_path: Option<PathBuf>,
    serial: Option<File>,
}

impl HostPlatform {
    pub fn new(serial_path: Option<PathBuf>) -> Self {
        Self {
            sys: System::new_all(),
            serial_path,
            serial: None,
        }
    }
}

impl Platform for HostPlatform {
    fn bootstrap(&mut self) -> Result<(), HalError> {
        debug!("hosted bootstrap: nothing to set up");
        Ok(())
    }

    fn global_init(&mut self) -> Result<(), HalError> {
        self.sys.refresh_all();
        Ok(())
    }

    fn render_splash(&mut self, _banner: &str) -> Result<(), HalError> {
        Err(HalError::Unsupported("graphical splash"))
    }

    fn enable_serial(&mut self, baud: u32) -> Result<(), HalError> {
        let Some(path) = &self.serial_path else {
            return Err(HalError::Unsupported("serial port without a sink path"));
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), baud, "serial sink opened");
        self.serial = Some(file);
        Ok(())
    }

    fn serial_send(&mut self, text: &str) {
        if let Some(serial) = self.serial.as_mut() {
            if let Err(e) = writeln!(serial, "{text}") {
                warn!(error = %e, "serial write dropped");
            }
        }
    }

    fn enable_interrupts(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn cpu_brand(&self) -> String {
        self.sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_else(|| "unknown".into())
    }

    fn cpu_vendor(&self) -> String {
        self.sys
            .cpus()
            .first()
            .map(|cpu| cpu.vendor_id().to_string())
            .unwrap_or_else(|| "unknown".into())
    }

    fn cpu_uptime(&self) -> u64 {
        System::uptime()
    }

    fn total_ram_kb(&self) -> u64 {
        self.sys.total_memory() / 1024
    }

    fn used_ram_kb(&mut self) -> u64 {
        self.sys.refresh_memory();
        self.sys.used_memory() / 1024
    }

    fn collect_garbage(&mut self) {
        if let Some(serial) = self.serial.as_mut() {
            let _ = serial.flush();
        }
    }

    fn beep(&mut self, frequency_hz: u32, duration: Duration) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
        debug!(frequency_hz, ms = duration.as_millis() as u64, "beep");
        thread::sleep(duration);
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        self.collect_garbage();
        std::process::exit(0)
    }

    #[cfg(unix)]
    fn reboot(&mut self) -> Result<(), HalError> {
        use std::os::unix::process::CommandExt;

        self.collect_garbage();
        let exe = std::env::current_exe()?;
        // exec only returns on failure
        let err = std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .exec();
        Err(HalError::Io(err))
    }

    #[cfg(not(unix))]
    fn reboot(&mut self) -> Result<(), HalError> {
        Err(HalError::Unsupported("reboot"))
    }
}
