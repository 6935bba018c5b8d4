// src/hal/platform.rs
//
// Machine-level services
// - bring-up hooks: bootstrap, global init, splash, serial, interrupts
// - clock and telemetry: wall clock, CPU identity, RAM counters
// - heap reclaim, PC speaker, power

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::HalError;

pub trait Platform {
    /// Low-level bootstrap and interrupt-table setup.
    fn bootstrap(&mut self) -> Result<(), HalError>;

    /// Console and global subsystem initialization.
    fn global_init(&mut self) -> Result<(), HalError>;

    fn render_splash(&mut self, banner: &str) -> Result<(), HalError>;

    fn enable_serial(&mut self, baud: u32) -> Result<(), HalError>;

    /// Best effort; silently dropped when serial is not enabled.
    fn serial_send(&mut self, text: &str);

    fn enable_interrupts(&mut self) -> Result<(), HalError>;

    fn now(&self) -> DateTime<Local>;

    fn sleep(&mut self, duration: Duration);

    fn cpu_brand(&self) -> String;

    fn cpu_vendor(&self) -> String;

    /// Seconds the CPU has been running.
    fn cpu_uptime(&self) -> u64;

    fn total_ram_kb(&self) -> u64;

    fn used_ram_kb(&mut self) -> u64;

    fn collect_garbage(&mut self);

    fn beep(&mut self, frequency_hz: u32, duration: Duration);

    /// Returns only if the machine is still running afterwards.
    fn shutdown(&mut self) -> Result<(), HalError>;

    /// Returns only if the machine is still running afterwards.
    fn reboot(&mut self) -> Result<(), HalError>;
}
