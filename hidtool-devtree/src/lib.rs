//! Device directory abstraction for hidtool
//!
//! The host's device-information and device-tree services are consumed through
//! the [`DeviceDirectory`] trait. Two backends are provided:
//!
//! - `WindowsDirectory` (SetupAPI + CfgMgr32, Windows only)
//! - [`SimulatedDirectory`] (in-memory device tree, any platform)

pub mod error;
pub mod fetch;
pub mod simulated;
pub mod types;

#[cfg(windows)]
pub mod windows;

pub use error::{DeviceError, FetchError};
pub use simulated::{CallCounters, NodeSpec, SimulatedDirectory, SimulationError};
pub use types::{
    Fetched, InterfaceClass, NodeStatus, PropertyKind, RunState, Transition, MAX_DEVICE_ID_LEN,
    PROPERTY_CAPACITY,
};

#[cfg(windows)]
pub use windows::WindowsDirectory;

/// Capability interface onto the host's device directory
///
/// All calls are blocking. Interface handles are only meaningful together with
/// the snapshot they were enumerated from, and nothing obtained from a snapshot
/// may be used after [`release_snapshot`](Self::release_snapshot).
pub trait DeviceDirectory {
    /// Enumeration snapshot of present device interfaces
    type Snapshot;
    /// One interface registration within a snapshot
    type Interface;
    /// Device tree node reference
    type Node: Copy + std::fmt::Debug;

    /// Create a snapshot of the present interfaces of `class`
    fn acquire_snapshot(&self, class: &InterfaceClass) -> Result<Self::Snapshot, DeviceError>;

    /// Get the interface at `index`, or `None` past the end
    fn enumerate_interface(&self, snapshot: &Self::Snapshot, index: u32) -> Option<Self::Interface>;

    /// Fill `buf` with the interface detail record.
    ///
    /// The record holds the interface path as UTF-16LE. With a buffer that is too
    /// small this fails with [`FetchError::BufferTooSmall`] carrying the size in
    /// bytes. On success the owning device node is returned alongside.
    fn interface_detail(
        &self,
        snapshot: &Self::Snapshot,
        interface: &Self::Interface,
        buf: &mut [u8],
    ) -> Result<Fetched<Self::Node>, FetchError>;

    /// Look up a node by instance id
    fn locate_node(&self, instance_id: &str) -> Result<Self::Node, DeviceError>;

    /// Get the single parent of `node`
    fn parent(&self, node: Self::Node) -> Result<Self::Node, DeviceError>;

    /// Fill `buf` with the instance id of `node`
    fn device_id(&self, node: Self::Node, buf: &mut [u16]) -> Result<Fetched, FetchError>;

    /// Fill `buf` with a string property of `node`
    fn string_property(
        &self,
        node: Self::Node,
        kind: PropertyKind,
        buf: &mut [u16],
    ) -> Result<Fetched, FetchError>;

    /// Read run state and capability flags
    fn status(&self, node: Self::Node) -> Result<NodeStatus, DeviceError>;

    /// Start a disabled node
    fn enable(&self, node: Self::Node) -> Result<(), DeviceError>;

    /// Disable a started node
    fn disable(&self, node: Self::Node) -> Result<(), DeviceError>;

    /// Release a snapshot obtained from [`acquire_snapshot`](Self::acquire_snapshot)
    fn release_snapshot(&self, snapshot: &Self::Snapshot);
}
