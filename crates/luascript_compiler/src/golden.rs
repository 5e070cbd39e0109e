//! Structural regression signal for IR modules: a node-kind histogram,
//! CFG block/edge counts, and max traversal depth, compared structurally
//! rather than diffing emitted Lua text byte-for-byte (temp-variable
//! numbering and similar non-semantic details aren't guaranteed stable
//! across changes, so a text diff would be noisy).

use std::collections::BTreeMap;

use luascript_ir::IrModule;

/// A structural digest of one [`IrModule`], suitable for persisting to
/// disk as a `.summary.json` golden fixture.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShapeSummary {
    pub node_count: usize,
    #[serde(rename = "kindHistogram")]
    pub kind_histogram: BTreeMap<String, usize>,
    #[serde(rename = "cfgCount")]
    pub cfg_count: usize,
    #[serde(rename = "totalBlockCount")]
    pub total_block_count: usize,
    #[serde(rename = "totalEdgeCount")]
    pub total_edge_count: usize,
    #[serde(rename = "maxDepth")]
    pub max_depth: usize,
}

/// Computes the shape summary of `module`: a node-kind histogram plus
/// aggregate CFG statistics and the maximum depth reachable by walking
/// `child_ids()` from every module-body root.
pub fn summarize(module: &IrModule) -> ShapeSummary {
    let mut kind_histogram = BTreeMap::new();
    for node in module.nodes.values() {
        *kind_histogram.entry(node.kind.tag().to_string()).or_insert(0) += 1;
    }

    let total_block_count = module.control_flow_graphs.values().map(|cfg| cfg.blocks.len()).sum();
    let total_edge_count = module
        .control_flow_graphs
        .values()
        .map(|cfg| cfg.successors.values().map(Vec::len).sum::<usize>())
        .sum();

    let max_depth = module.module.body.iter().map(|id| depth_from(module, id, 0)).max().unwrap_or(0);

    ShapeSummary {
        node_count: module.nodes.len(),
        kind_histogram,
        cfg_count: module.control_flow_graphs.len(),
        total_block_count,
        total_edge_count,
        max_depth,
    }
}

fn depth_from(module: &IrModule, id: &str, depth: usize) -> usize {
    let Some(node) = module.node(id) else {
        return depth;
    };
    node.kind
        .child_ids()
        .into_iter()
        .map(|child| depth_from(module, child, depth + 1))
        .max()
        .unwrap_or(depth)
}

/// A single structural mismatch between two summaries, named by the field
/// that disagrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeDiff {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// Compares `actual` against `expected`, returning every field that
/// disagrees. An empty result means the two summaries match structurally.
pub fn diff(expected: &ShapeSummary, actual: &ShapeSummary) -> Vec<ShapeDiff> {
    let mut diffs = Vec::new();

    let mut push = |field: &str, e: String, a: String| {
        if e != a {
            diffs.push(ShapeDiff { field: field.to_string(), expected: e, actual: a });
        }
    };

    push("node_count", expected.node_count.to_string(), actual.node_count.to_string());
    push("cfg_count", expected.cfg_count.to_string(), actual.cfg_count.to_string());
    push("total_block_count", expected.total_block_count.to_string(), actual.total_block_count.to_string());
    push("total_edge_count", expected.total_edge_count.to_string(), actual.total_edge_count.to_string());
    push("max_depth", expected.max_depth.to_string(), actual.max_depth.to_string());

    if expected.kind_histogram != actual.kind_histogram {
        diffs.push(ShapeDiff {
            field: "kind_histogram".to_string(),
            expected: format!("{:?}", expected.kind_histogram),
            actual: format!("{:?}", actual.kind_histogram),
        });
    }

    diffs
}
