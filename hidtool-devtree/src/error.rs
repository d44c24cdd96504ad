//! Device directory error types

use thiserror::Error;

use crate::types::{PropertyKind, Transition};

/// Failure of a buffer-filling query (interface detail, device id, string property)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// The buffer was too small; `required` is in buffer units
    #[error("buffer too small ({required} units required)")]
    BufferTooSmall { required: usize },

    /// A size query completed without reporting a usable size
    #[error("no record size reported")]
    NoSizeReported,

    /// The directory rejected the query
    #[error("error code {0}")]
    Failed(u32),
}

/// Errors from device directory operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    // Listing
    #[error("Device enumeration unavailable (error code: {0})")]
    EnumerationUnavailable(u32),

    #[error("Failed to get device interface detail for interface {index}: {source}")]
    InterfaceDetailUnavailable { index: u32, source: FetchError },

    // Node resolution
    #[error("Could not locate device node: {0}")]
    NodeNotFound(String),

    #[error("Could not retrieve parent device")]
    NoParent,

    #[error("Could not get parent device ID: {0}")]
    ParentIdUnavailable(FetchError),

    #[error("Could not get {kind}: {source}")]
    PropertyUnavailable {
        kind: PropertyKind,
        source: FetchError,
    },

    // Toggle
    #[error("Could not get device node status")]
    StatusUnavailable,

    #[error("Device cannot be disabled/enabled programmatically")]
    NotToggleable,

    #[error("Could not {transition} device (error code: {code})")]
    ToggleFailed { transition: Transition, code: u32 },
}

impl DeviceError {
    /// True for errors that must abort a whole listing rather than skip one item
    pub fn aborts_listing(&self) -> bool {
        matches!(self, DeviceError::EnumerationUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_enumeration_failure_aborts_listing() {
        assert!(DeviceError::EnumerationUnavailable(5).aborts_listing());
        assert!(!DeviceError::NoParent.aborts_listing());
        assert!(!DeviceError::NodeNotFound("HID\\X".into()).aborts_listing());
        assert!(!DeviceError::PropertyUnavailable {
            kind: PropertyKind::Manufacturer,
            source: FetchError::Failed(37),
        }
        .aborts_listing());
    }

    #[test]
    fn test_toggle_failure_message_names_transition() {
        let err = DeviceError::ToggleFailed {
            transition: Transition::Disable,
            code: 23,
        };
        assert_eq!(err.to_string(), "Could not disable device (error code: 23)");
    }
}
