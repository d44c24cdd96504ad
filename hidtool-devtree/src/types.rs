//! Common types for the device directory

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a device instance id, in text units (including NUL)
pub const MAX_DEVICE_ID_LEN: usize = 200;

/// Capacity of the buffer used for string properties, in text units
pub const PROPERTY_CAPACITY: usize = 256;

/// Device interface class, identified by its GUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceClass {
    pub guid: u128,
}

impl InterfaceClass {
    /// GUID_DEVINTERFACE_HID {4D1E55B2-F16F-11CF-88CB-001111000030}
    pub const HID: InterfaceClass = InterfaceClass {
        guid: 0x4D1E55B2_F16F_11CF_88CB_001111000030,
    };
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.guid;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
            (g >> 96) as u32,
            (g >> 80) as u16,
            (g >> 64) as u16,
            (g >> 48) as u16,
            g & 0xFFFF_FFFF_FFFF
        )
    }
}

/// String properties read from a device node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Manufacturer,
    Description,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Manufacturer => f.write_str("manufacturer name"),
            PropertyKind::Description => f.write_str("device description"),
        }
    }
}

/// Run state of a device node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Started,
    Disabled,
}

/// Status flags of a device node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatus {
    pub run_state: RunState,
    /// Node supports programmatic enable/disable
    pub disableable: bool,
    /// Problem number reported alongside the status (0 if none)
    pub problem: u32,
}

/// State transition requested on a device node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enable,
    Disable,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Enable => f.write_str("enable"),
            Transition::Disable => f.write_str("disable"),
        }
    }
}

/// Result of a successful buffer-filling query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetched<T = ()> {
    /// Number of buffer units written
    pub len: usize,
    /// Extra value produced by the query
    pub value: T,
}

impl Fetched {
    pub fn units(len: usize) -> Self {
        Self { len, value: () }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hid_class_display() {
        assert_eq!(
            InterfaceClass::HID.to_string(),
            "{4D1E55B2-F16F-11CF-88CB-001111000030}"
        );
    }
}
