// src/hal/hosted/storage.rs
//
// Host-directory block devices
// - each configured disk is a host directory; partitions are `part<N>` subdirectories
// - a partition is formatted when it holds a `.phoenixfs` marker naming its filesystem
// - every file operation is confined to a mounted partition root

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DiskConfig;
use crate::error::HalError;
use crate::hal::storage::{Disk, Partition, Storage};

pub const FS_MARKER: &str = ".phoenixfs";
const PARTITION_PREFIX: &str = "part";
const RAW_KIND: &str = "RAW";

pub struct HostStorage {
    devices: Vec<DiskConfig>,
    registered: bool,
    cwd: Option<String>,
}

impl HostStorage {
    /// Relative disk paths are anchored to the process working directory.
    pub fn new(devices: Vec<DiskConfig>) -> Self {
        let devices = devices
            .into_iter()
            .map(|mut device| {
                device.path = absolute(device.path);
                device
            })
            .collect();
        Self {
            devices,
            registered: false,
            cwd: None,
        }
    }

    fn device(&self, disk: usize) -> Result<&DiskConfig, HalError> {
        self.devices.get(disk).ok_or(HalError::OutOfRange {
            what: "disk",
            index: disk,
            max: self.devices.len().saturating_sub(1),
        })
    }

    /// `part<N>` directories ordered by N. Partition indexes address this list,
    /// so numbering gaps on disk do not shift them.
    fn partition_dirs(device: &DiskConfig) -> Result<Vec<(usize, PathBuf)>, HalError> {
        let mut indexed = Vec::new();
        if device.path.is_dir() {
            for entry in fs::read_dir(&device.path)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Some(n) = partition_number(&name) {
                    indexed.push((n, entry.path()));
                }
            }
        }
        indexed.sort_by_key(|(n, _)| *n);
        Ok(indexed)
    }

    fn scan_disk(device: &DiskConfig) -> Result<Disk, HalError> {
        let partitions = Self::partition_dirs(device)?
            .into_iter()
            .map(|(_, dir)| {
                let marker = dir.join(FS_MARKER);
                match fs::read_to_string(&marker) {
                    Ok(tag) => Partition {
                        has_filesystem: true,
                        root_path: Some(normalize_path(&dir.to_string_lossy())),
                        kind: tag.trim().to_string(),
                    },
                    Err(_) => Partition {
                        has_filesystem: false,
                        root_path: None,
                        kind: RAW_KIND.into(),
                    },
                }
            })
            .collect();

        Ok(Disk {
            kind: device.kind,
            size_bytes: device.size_mb * 1024 * 1024,
            partitions,
        })
    }

    fn partition_dir(&self, disk: usize, partition: usize) -> Result<String, HalError> {
        let dirs = Self::partition_dirs(self.device(disk)?)?;
        match dirs.get(partition) {
            Some((_, dir)) => Ok(normalize_path(&dir.to_string_lossy())),
            None => Err(HalError::OutOfRange {
                what: "partition",
                index: partition,
                max: dirs.len().saturating_sub(1),
            }),
        }
    }

    fn mounted_roots(&self) -> Vec<String> {
        self.disks()
            .unwrap_or_default()
            .into_iter()
            .flat_map(|disk| disk.partitions)
            .filter_map(|p| p.mounted_root().map(str::to_string))
            .collect()
    }

    /// Resolve and require the result to sit on a mounted partition.
    fn mounted(&self, path: &str) -> Result<String, HalError> {
        let full = self.full_path(path)?;
        if self.mounted_roots().iter().any(|root| is_within(&full, root)) {
            Ok(full)
        } else {
            Err(HalError::NotMounted(full))
        }
    }

    fn list(&self, dir: &str, want_dirs: bool) -> Result<Vec<String>, HalError> {
        let dir = self.mounted(dir)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == FS_MARKER {
                continue;
            }
            if entry.file_type()?.is_dir() == want_dirs {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn partition_number(name: &str) -> Option<usize> {
    name.strip_prefix(PARTITION_PREFIX)?.parse().ok()
}

fn is_within(path: &str, root: &str) -> bool {
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Resolve `input` against `cwd`, lexically.
pub fn resolve_path(cwd: &str, input: &str) -> String {
    if input.starts_with('/') {
        return normalize_path(input);
    }
    normalize_path(&format!("{cwd}/{input}"))
}

/// Collapse `.`, `..` and repeated separators in an absolute path.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

impl Storage for HostStorage {
    fn block_device_count(&self) -> usize {
        self.devices.len()
    }

    fn register_vfs(&mut self) -> Result<(), HalError> {
        for device in &self.devices {
            if !device.path.exists() {
                fs::create_dir_all(&device.path)?;
            }
        }
        self.registered = true;
        info!(disks = self.devices.len(), "vfs registered");
        Ok(())
    }

    fn disks(&self) -> Result<Vec<Disk>, HalError> {
        if !self.registered {
            return Ok(Vec::new());
        }
        self.devices.iter().map(Self::scan_disk).collect()
    }

    fn describe_disk(&self, disk: usize) -> Result<String, HalError> {
        let device = self.device(disk)?;
        let info = Self::scan_disk(device)?;
        let mut out = format!(
            "Disk #{disk} ({:?}, {} MB) at {}\n",
            info.kind,
            device.size_mb,
            device.path.display()
        );
        if info.partitions.is_empty() {
            out.push_str("  no partitions\n");
        }
        for (i, part) in info.partitions.iter().enumerate() {
            out.push_str(&format!(
                "  Partition #{i}: {} {}\n",
                part.kind,
                part.root_path.as_deref().unwrap_or("(not mounted)")
            ));
        }
        Ok(out)
    }

    fn create_partition(&mut self, disk: usize, size_bytes: u64) -> Result<(), HalError> {
        let device = self.device(disk)?;
        let next = Self::partition_dirs(device)?
            .last()
            .map_or(0, |(n, _)| n + 1);
        let dir = device.path.join(format!("{PARTITION_PREFIX}{next}"));
        fs::create_dir_all(&dir)?;
        debug!(disk, partition = next, size_bytes, "partition created");
        Ok(())
    }

    fn format_partition(
        &mut self,
        disk: usize,
        partition: usize,
        filesystem: &str,
        quick: bool,
    ) -> Result<(), HalError> {
        let dir = self.partition_dir(disk, partition)?;
        if quick {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
        } else {
            fs::remove_dir_all(&dir)?;
            fs::create_dir(&dir)?;
        }
        fs::write(Path::new(&dir).join(FS_MARKER), filesystem)?;

        if self
            .cwd
            .as_deref()
            .is_some_and(|cwd| is_within(cwd, &dir) && !Path::new(cwd).is_dir())
        {
            self.cwd = Some(dir.clone());
        }
        info!(disk, partition, filesystem, quick, "partition formatted");
        Ok(())
    }

    fn full_path(&self, path: &str) -> Result<String, HalError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(HalError::EmptyPath);
        }
        if path.starts_with('/') {
            return Ok(normalize_path(path));
        }
        match &self.cwd {
            Some(cwd) => Ok(resolve_path(cwd, path)),
            None => Err(HalError::NotMounted(path.to_string())),
        }
    }

    fn current_dir(&self) -> Option<String> {
        self.cwd.clone()
    }

    fn set_current_dir(&mut self, path: &str) -> Result<(), HalError> {
        let full = self.mounted(path)?;
        if !Path::new(&full).is_dir() {
            return Err(HalError::NotFound(full));
        }
        self.cwd = Some(full);
        Ok(())
    }

    fn file_exists(&self, path: &str) -> bool {
        self.mounted(path)
            .map(|p| Path::new(&p).is_file())
            .unwrap_or(false)
    }

    fn dir_exists(&self, path: &str) -> bool {
        self.mounted(path)
            .map(|p| Path::new(&p).is_dir())
            .unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, HalError> {
        let full = self.mounted(path)?;
        Ok(fs::read(full)?)
    }

    fn read_to_string(&self, path: &str) -> Result<String, HalError> {
        let bytes = self.read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn create_file(&mut self, path: &str) -> Result<(), HalError> {
        let full = self.mounted(path)?;
        fs::File::create(full)?;
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> Result<(), HalError> {
        let full = self.mounted(path)?;
        fs::create_dir_all(full)?;
        Ok(())
    }

    fn copy_file(&mut self, from: &str, to: &str) -> Result<(), HalError> {
        let from = self.mounted(from)?;
        let to = self.mounted(to)?;
        if !Path::new(&from).is_file() {
            return Err(HalError::NotFound(from));
        }
        fs::copy(from, to)?;
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<(), HalError> {
        let full = self.mounted(path)?;
        if !Path::new(&full).is_file() {
            return Err(HalError::NotFound(full));
        }
        fs::remove_file(full)?;
        Ok(())
    }

    fn delete_dir_all(&mut self, path: &str) -> Result<(), HalError> {
        let full = self.mounted(path)?;
        if !Path::new(&full).is_dir() {
            return Err(HalError::NotFound(full));
        }
        fs::remove_dir_all(full)?;
        Ok(())
    }

    fn files(&self, dir: &str) -> Result<Vec<String>, HalError> {
        self.list(dir, false)
    }

    fn directories(&self, dir: &str) -> Result<Vec<String>, HalError> {
        self.list(dir, true)
    }
}
