//! In-memory device tree
//!
//! Stands in for the host directory in tests and in `--simulate` runs. Nodes
//! are declared with [`NodeSpec`] (in code or TOML) and can carry injected
//! faults for every query the directory answers. Run states are mutable so a
//! toggle is observable afterwards, and every state-changing call is counted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::error::{DeviceError, FetchError};
use crate::fetch::write_utf16;
use crate::types::{Fetched, InterfaceClass, NodeStatus, PropertyKind, RunState, Transition};
use crate::DeviceDirectory;

/// Status codes reported for injected faults
mod code {
    /// CR_FAILURE
    pub const FAILURE: u32 = 0x13;
    /// CR_NO_SUCH_VALUE
    pub const NO_SUCH_VALUE: u32 = 0x25;
    /// ERROR_INVALID_DATA
    pub const INVALID_DATA: u32 = 13;
    /// CM_PROB_DISABLED
    pub const PROBLEM_DISABLED: u32 = 22;
}

/// Declaration of one simulated device node
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: String,
    pub parent: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    /// Node registers a HID device interface
    #[serde(default)]
    pub hid_interface: bool,
    #[serde(default)]
    pub disableable: bool,
    #[serde(default)]
    pub state: RunState,

    // Fault injection
    #[serde(default)]
    pub fail_detail: bool,
    #[serde(default)]
    pub zero_detail_size: bool,
    #[serde(default)]
    pub fail_device_id: bool,
    #[serde(default)]
    pub fail_manufacturer: bool,
    #[serde(default)]
    pub fail_description: bool,
    #[serde(default)]
    pub fail_status: bool,
    /// Error code returned by enable/disable
    pub fail_toggle: Option<u32>,
}

impl NodeSpec {
    /// Plain node (hub, controller, composite parent)
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Node exposing a HID interface
    pub fn hid(id: impl Into<String>) -> Self {
        Self {
            hid_interface: true,
            ..Self::new(id)
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn disableable(mut self) -> Self {
        self.disableable = true;
        self
    }

    pub fn state(mut self, state: RunState) -> Self {
        self.state = state;
        self
    }
}

/// Errors building a simulated tree
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Failed to read device tree {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid device tree: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate device node: {0}")]
    DuplicateNode(String),

    #[error("Device node {node} names unknown parent {parent}")]
    UnknownParent { node: String, parent: String },
}

/// Counters of calls made against the simulated directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounters {
    pub snapshots_acquired: usize,
    pub snapshots_released: usize,
    pub detail_queries: usize,
    pub enable_calls: usize,
    pub disable_calls: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeFile {
    /// Error code returned when acquiring a snapshot
    fail_snapshot: Option<u32>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeSpec>,
}

struct SimState {
    run_states: Vec<RunState>,
    counters: CallCounters,
}

/// Node handle into a [`SimulatedDirectory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimNode(usize);

/// Snapshot of the nodes exposing a HID interface
#[derive(Debug)]
pub struct SimSnapshot {
    interfaces: Vec<usize>,
}

/// Interface handle within a [`SimSnapshot`]
#[derive(Debug, Clone, Copy)]
pub struct SimInterface {
    node: usize,
}

/// In-memory device tree implementing [`DeviceDirectory`]
pub struct SimulatedDirectory {
    nodes: Vec<NodeSpec>,
    parents: Vec<Option<usize>>,
    by_id: HashMap<String, usize>,
    fail_snapshot: Option<u32>,
    state: Mutex<SimState>,
}

impl SimulatedDirectory {
    /// Build a tree from node declarations, in declaration order
    pub fn new(nodes: Vec<NodeSpec>) -> Result<Self, SimulationError> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if by_id.insert(node.id.clone(), i).is_some() {
                return Err(SimulationError::DuplicateNode(node.id.clone()));
            }
        }

        let parents = nodes
            .iter()
            .map(|node| match &node.parent {
                None => Ok(None),
                Some(parent) => by_id.get(parent).copied().map(Some).ok_or_else(|| {
                    SimulationError::UnknownParent {
                        node: node.id.clone(),
                        parent: parent.clone(),
                    }
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let run_states = nodes.iter().map(|n| n.state).collect();
        Ok(Self {
            nodes,
            parents,
            by_id,
            fail_snapshot: None,
            state: Mutex::new(SimState {
                run_states,
                counters: CallCounters::default(),
            }),
        })
    }

    /// Make snapshot acquisition fail with `code`
    pub fn with_snapshot_failure(mut self, code: u32) -> Self {
        self.fail_snapshot = Some(code);
        self
    }

    /// Parse a tree from TOML (`[[node]]` tables)
    pub fn from_toml(content: &str) -> Result<Self, SimulationError> {
        let file: TreeFile = toml::from_str(content)?;
        let directory = Self::new(file.nodes)?;
        Ok(match file.fail_snapshot {
            Some(code) => directory.with_snapshot_failure(code),
            None => directory,
        })
    }

    /// Load a tree from a TOML file
    pub fn load(path: &Path) -> Result<Self, SimulationError> {
        let content = std::fs::read_to_string(path).map_err(|source| SimulationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Current run state of the node named `instance_id`
    pub fn run_state(&self, instance_id: &str) -> Option<RunState> {
        let index = *self.by_id.get(instance_id)?;
        Some(self.state.lock().run_states[index])
    }

    /// Calls made so far
    pub fn counters(&self) -> CallCounters {
        self.state.lock().counters
    }

    fn spec(&self, node: SimNode) -> &NodeSpec {
        &self.nodes[node.0]
    }

    fn transition(&self, node: SimNode, transition: Transition) -> Result<(), DeviceError> {
        let spec = self.spec(node);
        let mut state = self.state.lock();
        match transition {
            Transition::Enable => state.counters.enable_calls += 1,
            Transition::Disable => state.counters.disable_calls += 1,
        }
        if let Some(code) = spec.fail_toggle {
            return Err(DeviceError::ToggleFailed { transition, code });
        }
        state.run_states[node.0] = match transition {
            Transition::Enable => RunState::Started,
            Transition::Disable => RunState::Disabled,
        };
        debug!("Simulated {} of {}", transition, spec.id);
        Ok(())
    }
}

/// Interface path in the `\\?\` form the host reports
fn interface_path(instance_id: &str) -> String {
    format!(
        "\\\\?\\{}#{}",
        instance_id.replace('\\', "#").to_lowercase(),
        InterfaceClass::HID.to_string().to_lowercase()
    )
}

impl DeviceDirectory for SimulatedDirectory {
    type Snapshot = SimSnapshot;
    type Interface = SimInterface;
    type Node = SimNode;

    fn acquire_snapshot(&self, class: &InterfaceClass) -> Result<SimSnapshot, DeviceError> {
        if let Some(code) = self.fail_snapshot {
            return Err(DeviceError::EnumerationUnavailable(code));
        }
        // Only HID interfaces are registered in the simulated tree
        let interfaces = if *class == InterfaceClass::HID {
            (0..self.nodes.len())
                .filter(|&i| self.nodes[i].hid_interface)
                .collect()
        } else {
            Vec::new()
        };
        self.state.lock().counters.snapshots_acquired += 1;
        Ok(SimSnapshot { interfaces })
    }

    fn enumerate_interface(&self, snapshot: &SimSnapshot, index: u32) -> Option<SimInterface> {
        let node = *snapshot.interfaces.get(index as usize)?;
        Some(SimInterface { node })
    }

    fn interface_detail(
        &self,
        _snapshot: &SimSnapshot,
        interface: &SimInterface,
        buf: &mut [u8],
    ) -> Result<Fetched<SimNode>, FetchError> {
        self.state.lock().counters.detail_queries += 1;
        let spec = &self.nodes[interface.node];
        if spec.fail_detail {
            return Err(FetchError::Failed(code::INVALID_DATA));
        }
        if spec.zero_detail_size {
            return Err(FetchError::BufferTooSmall { required: 0 });
        }

        let path: Vec<u8> = interface_path(&spec.id)
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        // Record includes the NUL terminator
        let required = path.len() + 2;
        if buf.len() < required {
            return Err(FetchError::BufferTooSmall { required });
        }
        buf[..path.len()].copy_from_slice(&path);
        buf[path.len()..required].fill(0);
        Ok(Fetched {
            len: path.len(),
            value: SimNode(interface.node),
        })
    }

    fn locate_node(&self, instance_id: &str) -> Result<SimNode, DeviceError> {
        self.by_id
            .get(instance_id)
            .map(|&i| SimNode(i))
            .ok_or_else(|| DeviceError::NodeNotFound(instance_id.to_string()))
    }

    fn parent(&self, node: SimNode) -> Result<SimNode, DeviceError> {
        self.parents[node.0].map(SimNode).ok_or(DeviceError::NoParent)
    }

    fn device_id(&self, node: SimNode, buf: &mut [u16]) -> Result<Fetched, FetchError> {
        let spec = self.spec(node);
        if spec.fail_device_id {
            return Err(FetchError::Failed(code::FAILURE));
        }
        let required = spec.id.encode_utf16().count() + 1;
        if buf.len() < required {
            return Err(FetchError::BufferTooSmall { required });
        }
        Ok(Fetched::units(write_utf16(&spec.id, buf)))
    }

    fn string_property(
        &self,
        node: SimNode,
        kind: PropertyKind,
        buf: &mut [u16],
    ) -> Result<Fetched, FetchError> {
        let spec = self.spec(node);
        let (value, fail) = match kind {
            PropertyKind::Manufacturer => (&spec.manufacturer, spec.fail_manufacturer),
            PropertyKind::Description => (&spec.description, spec.fail_description),
        };
        if fail {
            return Err(FetchError::Failed(code::FAILURE));
        }
        let value = value
            .as_deref()
            .ok_or(FetchError::Failed(code::NO_SUCH_VALUE))?;
        Ok(Fetched::units(write_utf16(value, buf)))
    }

    fn status(&self, node: SimNode) -> Result<NodeStatus, DeviceError> {
        let spec = self.spec(node);
        if spec.fail_status {
            return Err(DeviceError::StatusUnavailable);
        }
        let run_state = self.state.lock().run_states[node.0];
        Ok(NodeStatus {
            run_state,
            disableable: spec.disableable,
            problem: match run_state {
                RunState::Started => 0,
                RunState::Disabled => code::PROBLEM_DISABLED,
            },
        })
    }

    fn enable(&self, node: SimNode) -> Result<(), DeviceError> {
        self.transition(node, Transition::Enable)
    }

    fn disable(&self, node: SimNode) -> Result<(), DeviceError> {
        self.transition(node, Transition::Disable)
    }

    fn release_snapshot(&self, _snapshot: &SimSnapshot) {
        self.state.lock().counters.snapshots_released += 1;
    }
}
