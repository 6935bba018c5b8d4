// src/hal/hosted/editor.rs
//! `ed` hands the terminal to an external editor program.

use std::process::Command;

use crate::error::HalError;
use crate::hal::editor::Editor;

pub struct ExternalEditor {
    program: String,
}

impl ExternalEditor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Editor for ExternalEditor {
    fn open(&mut self, path: Option<&str>) -> Result<(), HalError> {
        let mut command = Command::new(&self.program);
        if let Some(path) = path {
            command.arg(path);
        }
        let status = command.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(HalError::Device(format!("{} exited with {status}", self.program)))
        }
    }
}
