//! Integration tests for the device node toggle.

use hidtool::devtree::{DeviceError, NodeSpec, RunState, SimulatedDirectory, Transition};
use hidtool::{collect_usb_hid_devices, toggle_device, Outcome};
use std::path::Path;

const KEYBOARD: &str = "HID\\VID_3151&PID_5030&MI_00\\7&9F8E7D6&0&0000";
const RECEIVER: &str = "HID\\VID_046D&PID_C52B&MI_00\\7&3A1E2B4&0&0000";
const TOUCHPAD: &str = "HID\\VEN_ELAN&DEV_0732&COL01\\5&6A7B8C9&0&0000";

fn sample_tree() -> SimulatedDirectory {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sample_tree.toml");
    SimulatedDirectory::load(&path).unwrap()
}

#[test]
fn started_device_is_disabled_and_stays_disabled() {
    let dir = sample_tree();
    assert_eq!(toggle_device(&dir, RECEIVER), Ok(Outcome::Disabled));
    assert_eq!(dir.run_state(RECEIVER), Some(RunState::Disabled));
}

#[test]
fn toggle_twice_restores_state() {
    let dir = sample_tree();
    assert_eq!(toggle_device(&dir, KEYBOARD), Ok(Outcome::Enabled));
    assert_eq!(toggle_device(&dir, KEYBOARD), Ok(Outcome::Disabled));
    assert_eq!(dir.run_state(KEYBOARD), Some(RunState::Disabled));
    assert_eq!(dir.counters().enable_calls, 1);
    assert_eq!(dir.counters().disable_calls, 1);
}

#[test]
fn non_disableable_device_is_refused() {
    let dir = sample_tree();
    assert_eq!(toggle_device(&dir, TOUCHPAD), Err(DeviceError::NotToggleable));
    assert_eq!(dir.counters().enable_calls + dir.counters().disable_calls, 0);
}

#[test]
fn unknown_instance_id() {
    let dir = sample_tree();
    assert_eq!(
        toggle_device(&dir, "HID\\NOT_THERE"),
        Err(DeviceError::NodeNotFound("HID\\NOT_THERE".into()))
    );
}

#[test]
fn failed_disable_keeps_node_started() {
    let dir = SimulatedDirectory::new(vec![NodeSpec {
        fail_toggle: Some(0x17),
        ..NodeSpec::hid("HID\\A").disableable()
    }])
    .unwrap();
    assert_eq!(
        toggle_device(&dir, "HID\\A"),
        Err(DeviceError::ToggleFailed {
            transition: Transition::Disable,
            code: 0x17
        })
    );
    assert_eq!(dir.run_state("HID\\A"), Some(RunState::Started));
}

#[test]
fn listing_after_toggle_still_reports_device() {
    let dir = sample_tree();
    toggle_device(&dir, RECEIVER).unwrap();
    let listing = collect_usb_hid_devices(&dir).unwrap();
    let ids: Vec<&str> = listing
        .records
        .iter()
        .map(|r| r.instance_id.as_str())
        .collect();
    assert_eq!(ids, vec![RECEIVER, KEYBOARD]);
}
