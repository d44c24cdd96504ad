//! USB-attached HID device listing
//!
//! Walks every HID interface, keeps those whose node sits directly under a USB
//! node and reads their descriptive strings. Per-interface failures are handed
//! to the caller and the walk continues; only a failed snapshot aborts.

use hidtool_devtree::{DeviceDirectory, DeviceError, PropertyKind};
use tracing::{debug, info};

use crate::enumerate::list_hid_interfaces;
use crate::parent::resolve_parent;
use crate::property::read_property;
use crate::report::MatchRecord;

/// Something produced while listing
#[derive(Debug)]
pub enum ListEvent<'a> {
    Match(&'a MatchRecord),
    /// Non-fatal, item-level failure
    Error(&'a DeviceError),
}

/// Counts for one completed listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingSummary {
    pub interfaces: usize,
    pub matched: usize,
    pub errors: usize,
}

/// Collected result of a listing
#[derive(Debug, Default)]
pub struct Listing {
    pub records: Vec<MatchRecord>,
    pub errors: Vec<DeviceError>,
    pub summary: ListingSummary,
}

/// List USB-attached HID devices, handing each match and item failure to `sink`
/// as it happens
pub fn list_usb_hid_devices<D, F>(
    directory: &D,
    mut sink: F,
) -> Result<ListingSummary, DeviceError>
where
    D: DeviceDirectory,
    F: FnMut(ListEvent<'_>),
{
    let snapshot = list_hid_interfaces(directory)?;
    let mut summary = ListingSummary::default();

    for (index, interface) in snapshot.interfaces() {
        summary.interfaces += 1;

        let resolved = match snapshot.resolve(index, &interface) {
            Ok(resolved) => resolved,
            Err(err) => {
                report_error(&mut sink, &mut summary, err);
                continue;
            }
        };

        let parent = match resolve_parent(directory, &resolved.instance_id) {
            Ok(parent) => parent,
            Err(err) => {
                report_error(&mut sink, &mut summary, err);
                continue;
            }
        };
        if !parent.is_usb() {
            debug!(
                "Skipping {}: parent {} is not USB",
                resolved.instance_id, parent.instance_id
            );
            continue;
        }

        // Property failures follow the record they belong to
        let mut property_errors = Vec::new();
        let mut property = |kind| {
            read_property(directory, resolved.node, kind).unwrap_or_else(|err| {
                property_errors.push(err);
                String::new()
            })
        };
        let manufacturer = property(PropertyKind::Manufacturer);
        let description = property(PropertyKind::Description);

        let record = MatchRecord {
            instance_id: resolved.instance_id,
            manufacturer,
            description,
            parent_id: parent.instance_id,
            interface_path: resolved.path,
        };
        summary.matched += 1;
        sink(ListEvent::Match(&record));
        for err in property_errors {
            report_error(&mut sink, &mut summary, err);
        }
    }

    info!(
        "Listed {} HID interfaces: {} USB matches, {} errors",
        summary.interfaces, summary.matched, summary.errors
    );
    Ok(summary)
}

fn report_error<F>(sink: &mut F, summary: &mut ListingSummary, err: DeviceError)
where
    F: FnMut(ListEvent<'_>),
{
    debug!("{}", err);
    summary.errors += 1;
    sink(ListEvent::Error(&err));
}

/// Run a listing and collect everything it produced
pub fn collect_usb_hid_devices<D: DeviceDirectory>(directory: &D) -> Result<Listing, DeviceError> {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let summary = list_usb_hid_devices(directory, |event| match event {
        ListEvent::Match(record) => records.push(record.clone()),
        ListEvent::Error(err) => errors.push(err.clone()),
    })?;
    Ok(Listing {
        records,
        errors,
        summary,
    })
}
