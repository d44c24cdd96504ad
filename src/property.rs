//! Device node string reads

use hidtool_devtree::fetch::{self, utf16_to_string};
use hidtool_devtree::{
    DeviceDirectory, DeviceError, FetchError, PropertyKind, MAX_DEVICE_ID_LEN, PROPERTY_CAPACITY,
};

/// Read the instance id of `node`
pub fn read_instance_id<D: DeviceDirectory>(
    directory: &D,
    node: D::Node,
) -> Result<String, FetchError> {
    let (units, ()) = fetch::bounded(MAX_DEVICE_ID_LEN, |buf: &mut [u16]| {
        directory.device_id(node, buf)
    })?;
    Ok(utf16_to_string(&units))
}

/// Read a string property of `node` into a [`PROPERTY_CAPACITY`] unit buffer
pub fn read_property<D: DeviceDirectory>(
    directory: &D,
    node: D::Node,
    kind: PropertyKind,
) -> Result<String, DeviceError> {
    let (units, ()) = fetch::bounded(PROPERTY_CAPACITY, |buf: &mut [u16]| {
        directory.string_property(node, kind, buf)
    })
    .map_err(|source| DeviceError::PropertyUnavailable { kind, source })?;
    Ok(utf16_to_string(&units))
}
