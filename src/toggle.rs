//! Enable/disable toggle for a single device node
//!
//! The node's current run state decides the transition: a started node is
//! disabled, anything else is enabled. Calling this twice flips the node twice.
//! Nodes without the disableable capability are never touched.

use std::fmt;

use hidtool_devtree::{DeviceDirectory, DeviceError, RunState};
use serde::Serialize;
use tracing::{debug, info};

/// New state of a toggled node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Enabled,
    Disabled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Enabled => f.write_str("enabled"),
            Outcome::Disabled => f.write_str("disabled"),
        }
    }
}

/// Toggle the node named `instance_id` between started and disabled
pub fn toggle_device<D: DeviceDirectory>(
    directory: &D,
    instance_id: &str,
) -> Result<Outcome, DeviceError> {
    let node = directory.locate_node(instance_id)?;
    let status = directory.status(node)?;
    debug!(
        "{}: state={:?} disableable={} problem={}",
        instance_id, status.run_state, status.disableable, status.problem
    );

    if !status.disableable {
        return Err(DeviceError::NotToggleable);
    }

    let outcome = match status.run_state {
        RunState::Started => {
            directory.disable(node)?;
            Outcome::Disabled
        }
        RunState::Disabled => {
            directory.enable(node)?;
            Outcome::Enabled
        }
    };
    info!("{} {}", instance_id, outcome);
    Ok(outcome)
}
