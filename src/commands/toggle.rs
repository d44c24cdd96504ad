//! Toggle command handler.

use hidtool::devtree::DeviceDirectory;
use hidtool::{toggle_device, Outcome};

/// Enable or disable the device node named `instance_id`
pub fn run<D: DeviceDirectory>(directory: &D, instance_id: &str) {
    match toggle_device(directory, instance_id) {
        Ok(Outcome::Disabled) => println!("  Device disabled successfully: {instance_id}"),
        Ok(Outcome::Enabled) => println!("  Device enabled successfully: {instance_id}"),
        Err(err) => println!("  [Error] {err}"),
    }
}
