//! Baseline topology mapping stored as JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use svcheck_core::BaselineTopology;

pub fn load_topology(path: &Path) -> Result<BaselineTopology> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading topology '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing topology '{}'", path.display()))
}

pub fn write_topology(path: &Path, topology: &BaselineTopology) -> Result<()> {
    if let Some(parent) = path.parent() {
        if parent != Path::new("") {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory '{}'", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(topology)?;
    fs::write(path, json).with_context(|| format!("writing topology '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcheck_core::{ConnectableBus, TerminalRef, TopologicalNode};
    use tempfile::tempdir;

    #[test]
    fn topology_survives_a_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/topology.json");
        let topology = BaselineTopology::new(vec![TopologicalNode {
            id: "TN1".into(),
            terminals: vec![TerminalRef {
                equipment_id: "GEN_1".into(),
                voltage_level_id: "VL1".into(),
                bus: Some(ConnectableBus {
                    id: "VL1_0".into(),
                    voltage_level_id: "VL1".into(),
                    connected_component: Some(0),
                }),
            }],
        }]);
        write_topology(&path, &topology).unwrap();
        let loaded = load_topology(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.nodes[0].terminals[0].equipment_id, "GEN_1");
    }

    #[test]
    fn missing_topology_names_the_file() {
        let err = load_topology(Path::new("/nonexistent/topology.json")).unwrap_err();
        assert!(format!("{err:#}").contains("topology.json"));
    }
}
