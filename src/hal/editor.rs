// src/hal/editor.rs
//! Full-screen editor sub-mode used by `ed`.

use crate::error::HalError;

pub trait Editor {
    /// Run the editor until the operator leaves it. `None` opens an empty buffer.
    fn open(&mut self, path: Option<&str>) -> Result<(), HalError>;
}
