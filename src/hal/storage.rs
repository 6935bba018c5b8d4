// src/hal/storage.rs
//
// Block devices, partitions and the mounted filesystem
// - `Storage` is the collaborator; it owns disk topology and the current directory
// - `DiskView` is the read-only snapshot the shell and boot reason over
// - the shell never edits topology itself, it asks `Storage` to partition/format and re-reads

use serde::Deserialize;

use crate::error::HalError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BlockDeviceType {
    #[default]
    #[serde(rename = "hdd", alias = "hard-drive")]
    HardDrive,
    #[serde(rename = "cd", alias = "removable-cd")]
    RemovableCD,
    #[serde(rename = "removable")]
    Removable,
    #[serde(rename = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub has_filesystem: bool,
    pub root_path: Option<String>,
    /// Filesystem type tag, e.g. `FAT32`; `RAW` when unformatted.
    pub kind: String,
}

impl Partition {
    /// Root path of a formatted partition, if it has a usable one.
    pub fn mounted_root(&self) -> Option<&str> {
        if !self.has_filesystem {
            return None;
        }
        self.root_path.as_deref().filter(|root| !root.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    pub kind: BlockDeviceType,
    pub size_bytes: u64,
    pub partitions: Vec<Partition>,
}

/// Drive counts per class, printed by the `sysinfo` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveClasses {
    pub hard_drives: usize,
    pub cds: usize,
    pub removable: usize,
    pub other: usize,
}

/// Ordered disks, each with ordered partitions, as last read from `Storage`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskView {
    disks: Vec<Disk>,
}

impl DiskView {
    pub fn new(disks: Vec<Disk>) -> Self {
        Self { disks }
    }

    pub fn read(storage: &dyn Storage) -> Result<Self, HalError> {
        storage.disks().map(Self::new)
    }

    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Disk, HalError> {
        self.disks.get(index).ok_or(HalError::OutOfRange {
            what: "disk",
            index,
            max: self.disks.len().saturating_sub(1),
        })
    }

    /// Every formatted partition root, disk order then partition order.
    pub fn mounted_roots(&self) -> impl Iterator<Item = &str> + '_ {
        self.disks
            .iter()
            .flat_map(|disk| disk.partitions.iter())
            .filter_map(Partition::mounted_root)
    }

    pub fn first_root(&self) -> Option<&str> {
        self.mounted_roots().next()
    }

    pub fn classes(&self) -> DriveClasses {
        let mut counts = DriveClasses::default();
        for disk in &self.disks {
            match disk.kind {
                BlockDeviceType::HardDrive => counts.hard_drives += 1,
                BlockDeviceType::RemovableCD => counts.cds += 1,
                BlockDeviceType::Removable => counts.removable += 1,
                BlockDeviceType::Other => counts.other += 1,
            }
        }
        counts
    }
}

pub trait Storage {
    /// Number of block devices the machine enumerated.
    fn block_device_count(&self) -> usize;

    /// Register the virtual filesystem over every block device.
    fn register_vfs(&mut self) -> Result<(), HalError>;

    /// Current topology. Empty until the VFS is registered.
    fn disks(&self) -> Result<Vec<Disk>, HalError>;

    /// Multi-line, human-readable description of one disk.
    fn describe_disk(&self, disk: usize) -> Result<String, HalError>;

    fn create_partition(&mut self, disk: usize, size_bytes: u64) -> Result<(), HalError>;

    fn format_partition(
        &mut self,
        disk: usize,
        partition: usize,
        filesystem: &str,
        quick: bool,
    ) -> Result<(), HalError>;

    /// Resolve `path` against the current directory into an absolute path.
    fn full_path(&self, path: &str) -> Result<String, HalError>;

    fn current_dir(&self) -> Option<String>;

    fn set_current_dir(&mut self, path: &str) -> Result<(), HalError>;

    fn file_exists(&self, path: &str) -> bool;

    fn dir_exists(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> Result<Vec<u8>, HalError>;

    fn read_to_string(&self, path: &str) -> Result<String, HalError>;

    fn create_file(&mut self, path: &str) -> Result<(), HalError>;

    fn create_dir(&mut self, path: &str) -> Result<(), HalError>;

    fn copy_file(&mut self, from: &str, to: &str) -> Result<(), HalError>;

    fn delete_file(&mut self, path: &str) -> Result<(), HalError>;

    /// Delete a directory and everything under it.
    fn delete_dir_all(&mut self, path: &str) -> Result<(), HalError>;

    /// Names of the plain files directly under `dir`, sorted.
    fn files(&self, dir: &str) -> Result<Vec<String>, HalError>;

    /// Names of the directories directly under `dir`, sorted.
    fn directories(&self, dir: &str) -> Result<Vec<String>, HalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(fs: bool, root: Option<&str>) -> Partition {
        Partition {
            has_filesystem: fs,
            root_path: root.map(str::to_string),
            kind: "FAT32".into(),
        }
    }

    fn disk(kind: BlockDeviceType, partitions: Vec<Partition>) -> Disk {
        Disk {
            kind,
            size_bytes: 1024,
            partitions,
        }
    }

    #[test]
    fn first_root_skips_unformatted_and_empty_roots() {
        let view = DiskView::new(vec![
            disk(BlockDeviceType::HardDrive, vec![]),
            disk(
                BlockDeviceType::HardDrive,
                vec![part(false, Some("/d1/p0")), part(true, Some(""))],
            ),
            disk(
                BlockDeviceType::Removable,
                vec![part(true, Some("/d2/p0")), part(true, Some("/d2/p1"))],
            ),
        ]);
        assert_eq!(view.first_root(), Some("/d2/p0"));
        assert_eq!(view.mounted_roots().count(), 2);
    }

    #[test]
    fn classes_count_every_kind() {
        let view = DiskView::new(vec![
            disk(BlockDeviceType::HardDrive, vec![]),
            disk(BlockDeviceType::HardDrive, vec![]),
            disk(BlockDeviceType::RemovableCD, vec![]),
            disk(BlockDeviceType::Other, vec![]),
        ]);
        assert_eq!(
            view.classes(),
            DriveClasses {
                hard_drives: 2,
                cds: 1,
                removable: 0,
                other: 1
            }
        );
    }

    #[test]
    fn get_out_of_range() {
        let view = DiskView::new(vec![disk(BlockDeviceType::HardDrive, vec![])]);
        assert!(view.get(0).is_ok());
        assert!(matches!(
            view.get(3),
            Err(HalError::OutOfRange { index: 3, max: 0, .. })
        ));
    }
}
