// src/hal/guest.rs
//
// Guest runtime bridge
// - GuestProgram: the target file's bytes plus a sniffed image format
// - GuestRuntime::instantiate binds a program to a runtime image directory
// - ExecutionContext carries the host hooks and runs the guest to completion

use crate::error::{GuestError, HalError};
use crate::hal::console::Console;

/// Host callback a guest may invoke by name. Receives the guest's arguments.
pub type HostHook = Box<dyn FnMut(&[String], &mut dyn Console) -> Result<(), HalError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    PortableExecutable,
    Elf,
    Wasm,
    Script,
    Unknown,
}

impl ImageFormat {
    pub fn sniff(image: &[u8]) -> Self {
        if image.starts_with(b"MZ") {
            ImageFormat::PortableExecutable
        } else if image.starts_with(b"\x7fELF") {
            ImageFormat::Elf
        } else if image.starts_with(b"\0asm") {
            ImageFormat::Wasm
        } else if image.starts_with(b"#!") {
            ImageFormat::Script
        } else {
            ImageFormat::Unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuestProgram {
    pub path: String,
    pub image: Vec<u8>,
    pub format: ImageFormat,
}

impl GuestProgram {
    pub fn from_image(path: impl Into<String>, image: Vec<u8>) -> Result<Self, GuestError> {
        let path = path.into();
        if image.is_empty() {
            return Err(GuestError::InvalidImage(path));
        }
        let format = ImageFormat::sniff(&image);
        Ok(Self {
            path,
            image,
            format,
        })
    }
}

pub trait ExecutionContext {
    fn register_hook(&mut self, name: &str, hook: HostHook);

    /// Run synchronously until the guest returns or crashes.
    fn run(&mut self, console: &mut dyn Console) -> Result<(), GuestError>;
}

pub trait GuestRuntime {
    fn instantiate(
        &mut self,
        program: GuestProgram,
        runtime_dir: &str,
    ) -> Result<Box<dyn ExecutionContext>, GuestError>;
}
