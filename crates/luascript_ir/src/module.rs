//! The top-level IR module tuple.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfg::{CfgId, ControlFlowGraph};
use crate::node::{Node, NodeId};

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub path: String,
    pub hash: String,
}

/// `module.toolchain` — free-form provenance (emitter version, options
/// used), analogous to `Toolchain` stamp on compiled output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolchain {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: NodeId,
    pub body: Vec<NodeId>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub source: SourceRef,
    #[serde(default)]
    pub directives: Vec<String>,
    #[serde(default)]
    pub toolchain: Toolchain,
}

/// `{ schemaVersion, module, nodes, controlFlowGraphs }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IrModule {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    pub module: ModuleInfo,
    pub nodes: FxHashMap<NodeId, Node>,
    #[serde(rename = "controlFlowGraphs")]
    pub control_flow_graphs: FxHashMap<CfgId, ControlFlowGraph>,
}

impl IrModule {
    pub fn new(module_id: NodeId) -> Self {
        IrModule {
            schema_version: SCHEMA_VERSION.to_string(),
            module: ModuleInfo {
                id: module_id,
                ..ModuleInfo::default()
            },
            nodes: FxHashMap::default(),
            control_flow_graphs: FxHashMap::default(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn cfg(&self, id: &str) -> Option<&ControlFlowGraph> {
        self.control_flow_graphs.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn new_module_has_empty_tables() {
        let m = IrModule::new("node_0".into());
        assert_eq!(m.schema_version, SCHEMA_VERSION);
        assert!(m.nodes.is_empty());
        assert!(m.control_flow_graphs.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_nodes() {
        let mut m = IrModule::new("node_0".into());
        m.nodes.insert(
            "node_1".into(),
            Node {
                id: "node_1".into(),
                kind: NodeKind::Identifier { name: "x".into() },
                span: None,
                flags: Default::default(),
                doc: Default::default(),
                meta: Default::default(),
            },
        );
        m.module.body.push("node_1".into());
        let json = serde_json::to_string(&m).unwrap();
        let back: IrModule = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
