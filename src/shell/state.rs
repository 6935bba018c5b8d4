// src/shell/state.rs
//! Everything the shell carries between commands.

use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct ShellState {
    /// Empty when no filesystem is mounted. Only `cd` and boot assign it,
    /// always to a directory that existed at that moment.
    pub working_dir: String,
    pub runtime_path: Option<String>,
    pub started_at: DateTime<Local>,
    pub total_ram_kb: u64,
    /// Refreshed before every prompt.
    pub used_ram_kb: u64,
}

impl ShellState {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            working_dir: String::new(),
            runtime_path: None,
            started_at,
            total_ram_kb: 0,
            used_ram_kb: 0,
        }
    }

    pub fn has_working_dir(&self) -> bool {
        !self.working_dir.is_empty()
    }

    /// Used RAM as a whole percentage of total; 0 when total is unknown.
    pub fn ram_percent(&self) -> u64 {
        if self.total_ram_kb == 0 {
            0
        } else {
            self.used_ram_kb * 100 / self.total_ram_kb
        }
    }
}
