//! Listing command handler.

use hidtool::devtree::DeviceDirectory;
use hidtool::{format_record, list_usb_hid_devices, ListEvent, ReportOptions};
use std::io::Write;

/// Print every USB-attached HID device.
///
/// Item failures are printed as `[Error]` lines on stdout and the listing goes
/// on; a failed enumeration prints `Error:` on stderr and stops.
pub fn run<D: DeviceDirectory>(directory: &D, options: &ReportOptions) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = list_usb_hid_devices(directory, |event| {
        let written = match event {
            ListEvent::Match(record) => out.write_all(format_record(record, options).as_bytes()),
            ListEvent::Error(err) => writeln!(out, "  [Error] {err}"),
        };
        if let Err(e) = written {
            tracing::debug!("stdout write failed: {}", e);
        }
    });

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }
}
