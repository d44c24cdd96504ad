//! One-hop parent classification
//!
//! A HID node counts as USB attached when its *immediate* device-tree parent
//! has an instance id starting with `USB`. Devices behind an intermediate node
//! (composite function, vendor bus) do not match; no further ancestors are
//! looked at.

use hidtool_devtree::{DeviceDirectory, DeviceError};

use crate::property::read_instance_id;

/// Instance id prefix of USB hub and controller nodes (case-sensitive)
pub const USB_PREFIX: &str = "USB";

/// Parent node of a resolved device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentNode {
    pub instance_id: String,
}

impl ParentNode {
    pub fn is_usb(&self) -> bool {
        is_usb_instance_id(&self.instance_id)
    }
}

/// Prefix test on an instance id
pub fn is_usb_instance_id(instance_id: &str) -> bool {
    instance_id.starts_with(USB_PREFIX)
}

/// Locate `instance_id` and fetch its parent's instance id
pub fn resolve_parent<D: DeviceDirectory>(
    directory: &D,
    instance_id: &str,
) -> Result<ParentNode, DeviceError> {
    let node = directory.locate_node(instance_id)?;
    let parent = directory.parent(node)?;
    let parent_id =
        read_instance_id(directory, parent).map_err(DeviceError::ParentIdUnavailable)?;
    Ok(ParentNode {
        instance_id: parent_id,
    })
}

/// Whether `instance_id`'s immediate parent is a USB node; any lookup failure is
/// a non-match
pub fn has_usb_parent<D: DeviceDirectory>(directory: &D, instance_id: &str) -> bool {
    resolve_parent(directory, instance_id).is_ok_and(|parent| parent.is_usb())
}
