// hidtool - USB-attached HID device listing and device node toggling
// Enumeration, one-hop parent classification, property reads and the
// enable/disable toggle, over any DeviceDirectory backend.

pub mod config;
pub mod enumerate;
pub mod listing;
pub mod parent;
pub mod property;
pub mod report;
pub mod toggle;

pub use config::{ConfigError, HidtoolConfig};
pub use enumerate::{list_hid_interfaces, ResolvedInterface, Snapshot};
pub use listing::{
    collect_usb_hid_devices, list_usb_hid_devices, ListEvent, Listing, ListingSummary,
};
pub use parent::{has_usb_parent, is_usb_instance_id, resolve_parent, ParentNode, USB_PREFIX};
pub use property::{read_instance_id, read_property};
pub use report::{format_record, MatchRecord, OutputFormat, ReportOptions, SEPARATOR};
pub use toggle::{toggle_device, Outcome};

pub use hidtool_devtree as devtree;
