//! Constructs IR nodes with auto-assigned ids and interns them into the
//! content-addressed node table.
//!
//! Nodes are never mutated structurally after creation — the IR is
//! effectively single-assignment. A `Builder` owns the
//! `IdGenerator` and the growing node table for exactly one compilation;
//! the pipeline entry point owns a fresh `Builder` per compile.

use luascript_diagnostic::Span;

use crate::cfg::{CfgId, ControlFlowGraph};
use crate::doc::Doc;
use crate::id::{IdGenerator, PREFIX_CFG, PREFIX_NODE};
use crate::module::IrModule;
use crate::node::{Meta, Node, NodeFlags, NodeId, NodeKind};

pub struct Builder {
    ids: IdGenerator,
    module: IrModule,
}

impl Builder {
    pub fn new() -> Self {
        let mut ids = IdGenerator::new();
        let module_id = ids.next(PREFIX_NODE);
        Builder {
            ids,
            module: IrModule::new(module_id),
        }
    }

    /// Allocates the next id for the given namespace prefix without
    /// creating a node (used for CFG/block ids, which live in the CFG map
    /// rather than the node table).
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.ids.next(prefix)
    }

    /// Creates a node with an auto-assigned id, interns it, and returns the
    /// id. This is the only way nodes enter the table — there is no public
    /// mutation path afterward.
    pub fn make_node(&mut self, kind: NodeKind) -> NodeId {
        self.make_node_with(kind, None)
    }

    pub fn make_node_with(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        let id = self.ids.next(PREFIX_NODE);
        let node = Node {
            id: id.clone(),
            kind,
            span,
            flags: NodeFlags::empty(),
            doc: Doc::default(),
            meta: Meta::default(),
        };
        self.module.nodes.insert(id.clone(), node);
        id
    }

    /// Same as [`Self::make_node_with`] but marks the node
    /// [`NodeFlags::SYNTHETIC`] — used by the lowerer for destructuring
    /// temporaries and other constructs with no direct source counterpart.
    pub fn make_synthetic_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.make_node(kind);
        if let Some(n) = self.module.nodes.get_mut(&id) {
            n.flags |= NodeFlags::SYNTHETIC;
        }
        id
    }

    pub fn set_doc(&mut self, id: &str, doc: Doc) {
        if let Some(n) = self.module.nodes.get_mut(id) {
            n.doc = doc;
        }
    }

    pub fn set_meta(&mut self, id: &str, meta: Meta) {
        if let Some(n) = self.module.nodes.get_mut(id) {
            n.meta = meta;
        }
    }

    pub fn new_cfg_id(&mut self) -> CfgId {
        self.ids.next(PREFIX_CFG)
    }

    pub fn insert_cfg(&mut self, cfg: ControlFlowGraph) {
        self.module
            .control_flow_graphs
            .insert(cfg.id.clone(), cfg);
    }

    pub fn set_module_body(&mut self, body: Vec<NodeId>) {
        self.module.module.body = body;
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.module.nodes.get(id)
    }

    /// Overwrites the payload of an already-interned node in place, keeping
    /// its id, span, flags, and doc untouched. Used by the Extension
    /// Registry: a transform's output replaces what a node *means* without
    /// forcing every other node that references its id to be rewritten too.
    pub fn replace_kind(&mut self, id: &str, kind: NodeKind) {
        if let Some(n) = self.module.nodes.get_mut(id) {
            n.kind = kind;
        }
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    /// Resumes building on top of an already-lowered module, continuing id
    /// generation past the highest counter value used by any existing node,
    /// CFG, or basic-block id so newly-synthesized nodes can't collide with
    /// ones the lowerer already created. Used by the Extension Registry,
    /// which runs between lowering and emission and may need to synthesize
    /// helper nodes for a transform.
    pub fn from_module(module: IrModule) -> Self {
        let mut max_counter: u64 = 0;
        for id in module.nodes.keys() {
            max_counter = max_counter.max(counter_of(id));
        }
        for cfg in module.control_flow_graphs.values() {
            max_counter = max_counter.max(counter_of(&cfg.id));
            for block in &cfg.blocks {
                max_counter = max_counter.max(counter_of(&block.id));
            }
        }
        let mut ids = IdGenerator::new();
        // `reset` takes the *next* value to hand out, so resume one past
        // the highest counter seen rather than reusing it.
        let _ = ids.reset(max_counter as i64 + 1);
        Builder { ids, module }
    }

    /// Consumes the builder, yielding the finished module.
    pub fn finish(self) -> IrModule {
        self.module
    }
}

/// Decodes the counter portion of an id of the form `PREFIX_DIGITS`,
/// returning 0 for anything that doesn't match the expected shape (ids from
/// outside this crate's control shouldn't be able to desynchronize id
/// generation).
fn counter_of(id: &str) -> u64 {
    match id.split_once('_') {
        Some((_, digits)) if crate::id::is_valid_id_shape(id) => crate::id::decode(digits),
        _ => 0,
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_node_interns_and_returns_id() {
        let mut b = Builder::new();
        let id = b.make_node(NodeKind::Identifier { name: "x".into() });
        assert!(b.node(&id).is_some());
    }

    #[test]
    fn ids_are_unique_per_builder() {
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::ThisExpression {});
        let c = b.make_node(NodeKind::Super {});
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_nodes_are_flagged() {
        let mut b = Builder::new();
        let id = b.make_synthetic_node(NodeKind::Identifier { name: "__tmp0".into() });
        assert!(b.node(&id).unwrap().flags.contains(NodeFlags::SYNTHETIC));
    }

    #[test]
    fn finish_yields_populated_module() {
        let mut b = Builder::new();
        let id = b.make_node(NodeKind::ThisExpression {});
        b.set_module_body(vec![id.clone()]);
        let module = b.finish();
        assert_eq!(module.module.body, vec![id]);
    }

    #[test]
    fn replace_kind_preserves_id() {
        let mut b = Builder::new();
        let id = b.make_node(NodeKind::Identifier { name: "x".into() });
        b.replace_kind(&id, NodeKind::Identifier { name: "y".into() });
        let NodeKind::Identifier { name } = &b.node(&id).unwrap().kind else {
            unreachable!()
        };
        assert_eq!(name, "y");
    }

    #[test]
    fn from_module_continues_past_existing_ids() {
        let mut b = Builder::new();
        let first = b.make_node(NodeKind::ThisExpression {});
        let module = b.finish();
        let mut resumed = Builder::from_module(module);
        let second = resumed.make_node(NodeKind::Super {});
        assert_ne!(first, second);
        assert!(resumed.node(&first).is_some());
    }
}
