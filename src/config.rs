// src/config.rs
//
// Phoenix configuration
// - One TOML file, every key optional; missing keys take the built-in defaults
// - Command line flags are applied on top by main

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::hal::storage::BlockDeviceType;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemConfig,
    pub serial: SerialConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
    pub fatal: FatalConfig,
    pub runtime: RuntimeConfig,
    pub editor: EditorConfig,
}

impl Config {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// `[===== Phoenix 0.3.0 (...) =====]`
    pub fn banner(&self) -> String {
        format!(
            "[===== {} {} ({}) =====]",
            self.system.name, self.system.version, self.system.copyright
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub name: String,
    pub version: String,
    pub copyright: String,
    pub prompt: String,
    /// Show `DEBUG` log lines on the console.
    pub debug: bool,
    /// tracing filter used when `PHOENIX_LOG` is unset.
    pub log_level: String,
    /// Attempt the cosmetic splash phase.
    pub splash: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "Phoenix".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            copyright: "Copyright (c) the Phoenix developers".into(),
            prompt: "> ".into(),
            debug: false,
            log_level: "off".into(),
            splash: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub enabled: bool,
    pub baud: u32,
    /// Hosted builds write the serial stream to this file.
    pub path: Option<PathBuf>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            baud: 115_200,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub disks: Vec<DiskConfig>,
    /// Name of the guest-runtime image directory looked up on every partition.
    pub runtime_dir: String,
    /// Filesystem type written by `format`.
    pub filesystem: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            disks: Vec::new(),
            runtime_dir: "framework".into(),
            filesystem: "FAT32".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiskConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub kind: BlockDeviceType,
    #[serde(default = "default_disk_size_mb")]
    pub size_mb: u64,
}

impl DiskConfig {
    pub fn hard_drive(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: BlockDeviceType::HardDrive,
            size_mb: default_disk_size_mb(),
        }
    }
}

fn default_disk_size_mb() -> u64 {
    512
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// First three octets of the static fallback address.
    pub fallback_prefix: [u8; 3],
    /// Host octet for interface 0; interface `n` gets `base + n`.
    pub fallback_host_base: u8,
    pub subnet_mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub ping_count: u32,
    pub ping_timeout_ms: u64,
    pub ping_pacing_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            fallback_prefix: [192, 168, 1],
            fallback_host_base: 69,
            subnet_mask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(192, 168, 1, 254),
            ping_count: 4,
            ping_timeout_ms: 5_000,
            ping_pacing_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FatalConfig {
    /// Alerts fire once more than this many seconds have passed.
    pub alert_interval_secs: u32,
    pub alert_pulses: u32,
    pub tone_hz: u32,
}

impl Default for FatalConfig {
    fn default() -> Self {
        Self {
            alert_interval_secs: 5,
            alert_pulses: 3,
            tone_hz: 750,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Executable inside the runtime directory that hosts guest programs.
    pub launcher: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            launcher: "launcher".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub program: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            program: std::env::var("EDITOR").unwrap_or_else(|_| "vi".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.storage.runtime_dir, "framework");
        assert_eq!(cfg.network.fallback_host_base, 69);
        assert_eq!(cfg.network.gateway, Ipv4Addr::new(192, 168, 1, 254));
        assert_eq!(cfg.serial.baud, 115_200);
        assert_eq!(cfg.fatal.alert_interval_secs, 5);
    }

    #[test]
    fn disks_and_overrides_parse() {
        let cfg = Config::from_toml(
            r#"
            [system]
            prompt = "$ "
            debug = true

            [[storage.disks]]
            path = "/srv/disk0"
            kind = "cd"

            [[storage.disks]]
            path = "/srv/disk1"
            size_mb = 64

            [network]
            ping_count = 2
            "#,
        )
        .unwrap();

        assert_eq!(cfg.system.prompt, "$ ");
        assert!(cfg.system.debug);
        assert_eq!(cfg.storage.disks.len(), 2);
        assert_eq!(cfg.storage.disks[0].kind, BlockDeviceType::RemovableCD);
        assert_eq!(cfg.storage.disks[1].kind, BlockDeviceType::HardDrive);
        assert_eq!(cfg.storage.disks[1].size_mb, 64);
        assert_eq!(cfg.network.ping_count, 2);
        assert_eq!(cfg.network.ping_pacing_ms, 250);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Some(Path::new("/nonexistent/phoenix.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/phoenix.toml"));
    }

    #[test]
    fn banner_format() {
        let mut cfg = Config::default();
        cfg.system.version = "1.2".into();
        cfg.system.copyright = "(c) test".into();
        assert_eq!(cfg.banner(), "[===== Phoenix 1.2 ((c) test) =====]");
    }
}
