//! Baseline topology mapping and solved network state handed over by the
//! import collaborator.
//!
//! The mapping follows the exchange model: every topological node lists the
//! terminals attached to it, and a terminal may resolve to a connectable bus
//! in the bus-breaker view. Nothing here interprets the mapping; the
//! comparison crate's `TopologyIndex` decides which nodes qualify.

use crate::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineTopology {
    #[serde(default)]
    pub nodes: Vec<TopologicalNode>,
}

impl BaselineTopology {
    pub fn new(nodes: Vec<TopologicalNode>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologicalNode {
    pub id: NodeId,
    #[serde(default)]
    pub terminals: Vec<TerminalRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalRef {
    /// Connectable equipment owning the terminal
    #[serde(default)]
    pub equipment_id: String,
    /// Voltage level of the terminal
    #[serde(default)]
    pub voltage_level_id: String,
    /// Connectable bus in the bus-breaker view, if the terminal resolves to one
    #[serde(default)]
    pub bus: Option<ConnectableBus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectableBus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub voltage_level_id: String,
    /// Electrically connected component number, when computed
    #[serde(default)]
    pub connected_component: Option<u32>,
}

/// Voltage state of one topological node as held by an imported or solved
/// network. Only nodes with a connectable bus are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub node: NodeId,
    pub v: f64,
    pub angle: f64,
}

/// Model identifiers needed to write a state-variables header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelHeader {
    /// `md:FullModel` id of the case's own SV model
    #[serde(default)]
    pub sv_model_id: Option<String>,
    #[serde(default)]
    pub eq_model_id: Option<String>,
    #[serde(default)]
    pub tp_model_id: Option<String>,
    #[serde(default)]
    pub ssh_model_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_deserializes_with_defaults() {
        let json = r#"{
            "nodes": [
                {"id": "TN1", "terminals": [
                    {"equipment_id": "LOAD_1", "voltage_level_id": "VL1",
                     "bus": {"id": "VL1_0", "voltage_level_id": "VL1", "connected_component": 0}}
                ]},
                {"id": "TN2"}
            ]
        }"#;
        let topology: BaselineTopology = serde_json::from_str(json).unwrap();
        assert_eq!(topology.len(), 2);
        assert!(topology.nodes[1].terminals.is_empty());
        let bus = topology.nodes[0].terminals[0].bus.as_ref().unwrap();
        assert_eq!(bus.connected_component, Some(0));
    }
}
