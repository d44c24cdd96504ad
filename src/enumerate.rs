//! HID interface enumeration
//!
//! A [`Snapshot`] owns one enumeration snapshot of the directory and releases
//! it when dropped, so every exit path (completion, `?`, panic unwinding)
//! releases it exactly once. Interfaces are walked lazily by index.

use hidtool_devtree::fetch::{self, utf16le_bytes_to_string};
use hidtool_devtree::{DeviceDirectory, DeviceError, InterfaceClass};
use tracing::debug;

use crate::property::read_instance_id;

/// Enumeration snapshot guard
pub struct Snapshot<'d, D: DeviceDirectory> {
    directory: &'d D,
    handle: D::Snapshot,
}

impl<'d, D: DeviceDirectory> Snapshot<'d, D> {
    /// Acquire a snapshot of the present interfaces of `class`
    pub fn acquire(directory: &'d D, class: &InterfaceClass) -> Result<Self, DeviceError> {
        let handle = directory.acquire_snapshot(class)?;
        debug!("Acquired interface snapshot for class {}", class);
        Ok(Self { directory, handle })
    }

    /// Lazily iterate the interfaces in this snapshot, in directory order
    pub fn interfaces(&self) -> Interfaces<'_, 'd, D> {
        Interfaces {
            snapshot: self,
            index: 0,
        }
    }

    /// Resolve the interface at `index` to its path, node and instance id
    pub fn resolve(
        &self,
        index: u32,
        interface: &D::Interface,
    ) -> Result<ResolvedInterface<D::Node>, DeviceError> {
        let detail_unavailable = |source| DeviceError::InterfaceDetailUnavailable { index, source };

        let (record, node) = fetch::two_phase(|buf: &mut [u8]| {
            self.directory.interface_detail(&self.handle, interface, buf)
        })
        .map_err(detail_unavailable)?;
        let path = utf16le_bytes_to_string(&record);

        let instance_id = read_instance_id(self.directory, node).map_err(detail_unavailable)?;
        debug!("Interface {}: {} ({})", index, instance_id, path);

        Ok(ResolvedInterface {
            path,
            node,
            instance_id,
        })
    }
}

impl<D: DeviceDirectory> Drop for Snapshot<'_, D> {
    fn drop(&mut self) {
        self.directory.release_snapshot(&self.handle);
        debug!("Released interface snapshot");
    }
}

/// Interface handles of a [`Snapshot`], with their enumeration index
pub struct Interfaces<'s, 'd, D: DeviceDirectory> {
    snapshot: &'s Snapshot<'d, D>,
    index: u32,
}

impl<D: DeviceDirectory> Iterator for Interfaces<'_, '_, D> {
    type Item = (u32, D::Interface);

    fn next(&mut self) -> Option<Self::Item> {
        let snapshot = self.snapshot;
        let interface = snapshot
            .directory
            .enumerate_interface(&snapshot.handle, self.index)?;
        let index = self.index;
        self.index += 1;
        Some((index, interface))
    }
}

/// Interface resolved to its owning device node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterface<N> {
    /// Interface path (`\\?\HID#...`)
    pub path: String,
    pub node: N,
    pub instance_id: String,
}

/// Snapshot of the HID interfaces currently present
pub fn list_hid_interfaces<D: DeviceDirectory>(
    directory: &D,
) -> Result<Snapshot<'_, D>, DeviceError> {
    Snapshot::acquire(directory, &InterfaceClass::HID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidtool_devtree::{FetchError, NodeSpec, SimulatedDirectory};

    fn directory() -> SimulatedDirectory {
        SimulatedDirectory::new(vec![
            NodeSpec::new("USB\\ROOT_HUB"),
            NodeSpec::hid("HID\\A").parent("USB\\ROOT_HUB"),
            NodeSpec {
                zero_detail_size: true,
                ..NodeSpec::hid("HID\\B").parent("USB\\ROOT_HUB")
            },
            NodeSpec::hid("HID\\C").parent("USB\\ROOT_HUB"),
        ])
        .unwrap()
    }

    #[test]
    fn test_interfaces_in_directory_order() {
        let dir = directory();
        let snapshot = list_hid_interfaces(&dir).unwrap();
        let indices: Vec<u32> = snapshot.interfaces().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_snapshot_restartable() {
        let dir = directory();
        for _ in 0..2 {
            let snapshot = list_hid_interfaces(&dir).unwrap();
            assert_eq!(snapshot.interfaces().count(), 3);
        }
        assert_eq!(dir.counters().snapshots_acquired, 2);
        assert_eq!(dir.counters().snapshots_released, 2);
    }

    #[test]
    fn test_resolve_interface() {
        let dir = directory();
        let snapshot = list_hid_interfaces(&dir).unwrap();
        let (index, iface) = snapshot.interfaces().next().unwrap();
        let resolved = snapshot.resolve(index, &iface).unwrap();
        assert_eq!(resolved.instance_id, "HID\\A");
        assert!(resolved.path.starts_with("\\\\?\\hid#a#"));
    }

    #[test]
    fn test_zero_detail_size_is_detail_unavailable() {
        let dir = directory();
        let snapshot = list_hid_interfaces(&dir).unwrap();
        let (index, iface) = snapshot.interfaces().nth(1).unwrap();
        assert_eq!(
            snapshot.resolve(index, &iface),
            Err(DeviceError::InterfaceDetailUnavailable {
                index: 1,
                source: FetchError::NoSizeReported
            })
        );
    }

    #[test]
    fn test_acquire_failure_releases_nothing() {
        let dir = directory().with_snapshot_failure(5);
        assert!(matches!(
            list_hid_interfaces(&dir),
            Err(DeviceError::EnumerationUnavailable(5))
        ));
        assert_eq!(dir.counters().snapshots_released, 0);
    }
}
