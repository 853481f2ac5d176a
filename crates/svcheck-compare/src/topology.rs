use std::collections::HashMap;

use svcheck_core::{BaselineTopology, NodeId, NodeMetadata, TerminalRef};

/// Static node metadata keyed by topological node, built once from the
/// baseline network and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct TopologyIndex {
    entries: HashMap<NodeId, NodeMetadata>,
}

impl TopologyIndex {
    /// Index every node that has a terminal resolving to a connectable bus
    /// with non-empty bus and voltage-level ids.
    ///
    /// Traversal follows the mapping's own order; the first qualifying
    /// terminal of the first occurrence of a node id supplies its metadata.
    /// Nodes without such a terminal are left out without error.
    pub fn build(topology: &BaselineTopology) -> Self {
        let mut entries = HashMap::with_capacity(topology.nodes.len());
        for node in &topology.nodes {
            if entries.contains_key(&node.id) {
                continue;
            }
            if let Some(metadata) = node.terminals.iter().find_map(metadata_from_terminal) {
                entries.insert(node.id.clone(), metadata);
            }
        }
        Self { entries }
    }

    pub fn get(&self, node: &NodeId) -> Option<&NodeMetadata> {
        self.entries.get(node)
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.entries.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeMetadata)> {
        self.entries.iter()
    }
}

impl FromIterator<(NodeId, NodeMetadata)> for TopologyIndex {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn metadata_from_terminal(terminal: &TerminalRef) -> Option<NodeMetadata> {
    let bus = terminal.bus.as_ref()?;
    if bus.id.is_empty() || bus.voltage_level_id.is_empty() {
        return None;
    }
    let voltage_level_id = if terminal.voltage_level_id.is_empty() {
        bus.voltage_level_id.clone()
    } else {
        terminal.voltage_level_id.clone()
    };
    Some(NodeMetadata {
        voltage_level_id,
        bus_id: bus.id.clone(),
        equipment_id: terminal.equipment_id.clone(),
        connected_component: bus.connected_component.unwrap_or(0),
    })
}
