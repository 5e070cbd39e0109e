//! Canonical, serializable intermediate representation.
//!
//! - [`id`]: balanced-ternary node identifiers.
//! - [`ty`]: the algebraic type model used for optional annotations.
//! - [`node`]: the closed node-kind set and per-node shape.
//! - [`cfg`]: per-function control-flow graphs.
//! - [`module`]: the top-level `{schemaVersion, module, nodes,
//!   controlFlowGraphs}` tuple.
//! - [`builder`]: constructs and interns nodes with auto-assigned ids.

pub mod builder;
pub mod cfg;
pub mod doc;
pub mod id;
pub mod module;
pub mod node;
pub mod ty;

pub use builder::Builder;
pub use cfg::{BasicBlock, BlockId, BlockKind, CfgId, ControlFlowGraph};
pub use doc::{Comment, Doc};
pub use id::{decode, encode, is_valid_id_shape, IdGenerator, PREFIX_BB, PREFIX_CFG, PREFIX_DECL, PREFIX_IR, PREFIX_NODE};
pub use module::{IrModule, ModuleInfo, SourceRef, Toolchain, SCHEMA_VERSION};
pub use node::{CfgRef, LiteralValue, Meta, MethodKind, Node, NodeFlags, NodeId, NodeKind, PropertyKind};
pub use ty::{Primitive, Type};

pub use luascript_diagnostic::Span;
