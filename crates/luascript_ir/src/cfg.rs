//! Per-function control-flow graphs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

pub type BlockId = String;
pub type CfgId = String;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Entry,
    Exit,
    Body,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    pub statements: Vec<NodeId>,
}

/// `{ blocks, successors, predecessors }`.
///
/// Edges are a separate adjacency map keyed by block id rather than being
/// embedded in `BasicBlock`, following an arena-plus-adjacency-list shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub id: CfgId,
    pub entry: BlockId,
    pub exit: BlockId,
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub successors: BTreeMap<BlockId, Vec<BlockId>>,
    #[serde(default)]
    pub predecessors: BTreeMap<BlockId, Vec<BlockId>>,
}

impl ControlFlowGraph {
    pub fn block(&self, id: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.iter().map(|b| &b.id)
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.successors.entry(from.clone()).or_default().push(to.clone());
        self.predecessors.entry(to).or_default().push(from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_updates_both_directions() {
        let mut cfg = ControlFlowGraph {
            id: "cfg_0".into(),
            entry: "bb_0".into(),
            exit: "bb_1".into(),
            blocks: vec![
                BasicBlock {
                    id: "bb_0".into(),
                    kind: BlockKind::Entry,
                    statements: vec![],
                },
                BasicBlock {
                    id: "bb_1".into(),
                    kind: BlockKind::Exit,
                    statements: vec![],
                },
            ],
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        };
        cfg.add_edge("bb_0".into(), "bb_1".into());
        assert_eq!(cfg.successors["bb_0"], vec!["bb_1".to_string()]);
        assert_eq!(cfg.predecessors["bb_1"], vec!["bb_0".to_string()]);
    }

    #[test]
    fn block_lookup_by_id() {
        let cfg = ControlFlowGraph {
            id: "cfg_0".into(),
            entry: "bb_0".into(),
            exit: "bb_0".into(),
            blocks: vec![BasicBlock {
                id: "bb_0".into(),
                kind: BlockKind::Entry,
                statements: vec![],
            }],
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        };
        assert!(cfg.block("bb_0").is_some());
        assert!(cfg.block("bb_missing").is_none());
    }
}
