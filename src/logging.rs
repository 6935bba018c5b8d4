// src/logging.rs
//
// Operator log lines
// - `[INFO@h:m:s] >> message` on the console, tag coloured by level
// - the same line mirrored to the serial transport (no-op when serial is off)
// - every line also becomes a tracing event for the stderr subscriber

use chrono::Timelike;
use tracing_subscriber::EnvFilter;

use crate::error::HalError;
use crate::hal::console::Color;
use crate::hal::Machine;

/// Environment variable holding a tracing filter, e.g. `phoenix=debug`.
pub const LOG_ENV: &str = "PHOENIX_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    /// Plain line, no tag.
    None,
    Error,
    Warning,
    Information,
    Debug,
}

impl LogType {
    fn tag(self) -> Option<(&'static str, Color)> {
        match self {
            LogType::None => None,
            LogType::Error => Some(("ERROR", Color::Red)),
            LogType::Warning => Some(("WARN", Color::Yellow)),
            LogType::Information => Some(("INFO", Color::Cyan)),
            LogType::Debug => Some(("DEBUG", Color::Magenta)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    debug: bool,
}

impl Logger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn print(&self, m: &mut Machine, message: &str, kind: LogType) -> Result<(), HalError> {
        match kind {
            LogType::None => tracing::info!("{message}"),
            LogType::Error => tracing::error!("{message}"),
            LogType::Warning => tracing::warn!("{message}"),
            LogType::Information => tracing::info!("{message}"),
            LogType::Debug => tracing::debug!("{message}"),
        }
        if kind == LogType::Debug && !self.debug {
            return Ok(());
        }

        let Some((tag, color)) = kind.tag() else {
            m.platform.serial_send(message);
            return m.console.write_line(message);
        };
        let now = m.platform.now();
        let stamp = format!("{tag}@{}:{}:{}", now.hour(), now.minute(), now.second());

        m.console.write("[")?;
        m.console.set_foreground(color)?;
        m.console.write(&stamp)?;
        m.console.reset_colors()?;
        m.console.write_line(&format!("] >> {message}"))?;
        m.platform.serial_send(&format!("[{stamp}] >> {message}"));
        Ok(())
    }

    pub fn info(&self, m: &mut Machine, message: &str) -> Result<(), HalError> {
        self.print(m, message, LogType::Information)
    }

    pub fn warn(&self, m: &mut Machine, message: &str) -> Result<(), HalError> {
        self.print(m, message, LogType::Warning)
    }

    pub fn error(&self, m: &mut Machine, message: &str) -> Result<(), HalError> {
        self.print(m, message, LogType::Error)
    }

    pub fn debug(&self, m: &mut Machine, message: &str) -> Result<(), HalError> {
        self.print(m, message, LogType::Debug)
    }
}

/// Install the stderr subscriber. `PHOENIX_LOG` wins over `fallback`.
/// A second call is a no-op.
pub fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
