//! Command handlers for the CLI application.
//!
//! - `list`: no argument, list USB-attached HID devices
//! - `toggle`: one instance id, enable or disable that device node
//!
//! Handlers report every failure as text and never signal it through the exit
//! status.

pub mod list;
pub mod toggle;
