//! Pattern destructuring: expanding an `ArrayPattern`/`ObjectPattern`
//! binding target into a sequence of Lua `local` statements that pick
//! fields/indices off a single source expression, recursing into nested
//! patterns. Used both for `VariableDeclarator` bodies and for destructured
//! function parameters (which bind off a synthesized temp holding the
//! argument).

use luascript_diagnostic::CompileError;
use luascript_ir::{IrModule, NodeId, NodeKind};

use crate::context::EmitContext;
use crate::expr::emit_expr;

/// Emits the `local`/assignment lines that bind every name in `pattern_id`
/// from `source`, in declaration order. `declare` selects `local x = ...`
/// vs. a plain `x = ...` (re-assignment, e.g. a destructuring assignment
/// expression rather than a fresh declaration).
pub fn emit_pattern_bindings(
    module: &IrModule,
    ctx: &mut EmitContext,
    pattern_id: &NodeId,
    source: &str,
    declare: bool,
) -> Result<Vec<String>, CompileError> {
    let node = module
        .node(pattern_id)
        .ok_or_else(|| CompileError::BrokenReference { id: pattern_id.clone() })?;

    match &node.kind {
        NodeKind::Identifier { name } => {
            let keyword = if declare { "local " } else { "" };
            Ok(vec![format!("{keyword}{name} = {source}")])
        }
        NodeKind::AssignmentPattern { left, right } => {
            let default_text = emit_expr(module, ctx, right)?;
            let temp = ctx.fresh_temp();
            let mut lines = vec![format!(
                "local {temp} = ({source} ~= nil) and {source} or {default_text}"
            )];
            lines.extend(emit_pattern_bindings(module, ctx, left, &temp, declare)?);
            Ok(lines)
        }
        NodeKind::ArrayPattern { elements } => emit_array_pattern_bindings(module, ctx, elements, source, declare),
        NodeKind::ObjectPattern { properties } => emit_object_pattern_bindings(module, ctx, properties, source, declare),
        NodeKind::MemberExpression { .. } => {
            // Assignment to an existing member (`[a.b] = x`), not a fresh binding.
            let target = emit_expr(module, ctx, pattern_id)?;
            Ok(vec![format!("{target} = {source}")])
        }
        other => Err(CompileError::UnsupportedKind { kind: format!("pattern kind {}", other.tag()) }),
    }
}

fn emit_array_pattern_bindings(
    module: &IrModule,
    ctx: &mut EmitContext,
    elements: &[Option<NodeId>],
    source: &str,
    declare: bool,
) -> Result<Vec<String>, CompileError> {
    let mut lines = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let Some(element_id) = element else { continue };
        let position = i + 1;
        let element_node = module
            .node(element_id)
            .ok_or_else(|| CompileError::BrokenReference { id: element_id.clone() })?;
        if let NodeKind::RestElement { argument } = &element_node.kind {
            let rest_temp = ctx.fresh_temp();
            lines.push(format!("local {rest_temp} = {{}}"));
            lines.push(format!("for __i = {position}, #{source} do"));
            lines.push(format!("  {rest_temp}[#{rest_temp} + 1] = {source}[__i]"));
            lines.push("end".to_string());
            lines.extend(emit_pattern_bindings(module, ctx, argument, &rest_temp, declare)?);
        } else {
            let element_access = format!("{source}[{position}]");
            lines.extend(emit_pattern_bindings(module, ctx, element_id, &element_access, declare)?);
        }
    }
    Ok(lines)
}

fn emit_object_pattern_bindings(
    module: &IrModule,
    ctx: &mut EmitContext,
    properties: &[NodeId],
    source: &str,
    declare: bool,
) -> Result<Vec<String>, CompileError> {
    let mut lines = Vec::new();
    let mut bound_keys = Vec::new();
    for property_id in properties {
        let property_node = module
            .node(property_id)
            .ok_or_else(|| CompileError::BrokenReference { id: property_id.clone() })?;
        match &property_node.kind {
            NodeKind::Property { key, value, computed, .. } => {
                let key_name = match module.node(key).map(|n| &n.kind) {
                    Some(NodeKind::Identifier { name }) if !computed => name.clone(),
                    _ => {
                        return Err(CompileError::UnsupportedKind {
                            kind: "computed key in object destructuring".to_string(),
                        })
                    }
                };
                bound_keys.push(key_name.clone());
                let access = format!("{source}.{key_name}");
                lines.extend(emit_pattern_bindings(module, ctx, value, &access, declare)?);
            }
            NodeKind::RestElement { argument } => {
                let rest_temp = ctx.fresh_temp();
                lines.push(format!("local {rest_temp} = {{}}"));
                lines.push(format!("for __k, __v in pairs({source}) do"));
                if bound_keys.is_empty() {
                    lines.push(format!("  {rest_temp}[__k] = __v"));
                } else {
                    let guard = bound_keys
                        .iter()
                        .map(|k| format!("__k ~= \"{k}\""))
                        .collect::<Vec<_>>()
                        .join(" and ");
                    lines.push(format!("  if {guard} then {rest_temp}[__k] = __v end"));
                }
                lines.push("end".to_string());
                lines.extend(emit_pattern_bindings(module, ctx, argument, &rest_temp, declare)?);
            }
            other => return Err(CompileError::UnsupportedKind { kind: format!("object pattern entry {}", other.tag()) }),
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascript_ir::Builder;

    #[test]
    fn identifier_pattern_binds_directly() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let id = b.make_node(NodeKind::Identifier { name: "x".into() });
        let module = b.finish();
        let lines = emit_pattern_bindings(&module, &mut ctx, &id, "src", true).unwrap();
        assert_eq!(lines, vec!["local x = src".to_string()]);
    }

    #[test]
    fn array_pattern_binds_by_position_and_collects_rest() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let a = b.make_node(NodeKind::Identifier { name: "a".into() });
        let rest_target = b.make_node(NodeKind::Identifier { name: "rest".into() });
        let rest = b.make_node(NodeKind::RestElement { argument: rest_target });
        let pattern = b.make_node(NodeKind::ArrayPattern { elements: vec![Some(a), Some(rest)] });
        let module = b.finish();
        let lines = emit_pattern_bindings(&module, &mut ctx, &pattern, "src", true).unwrap();
        assert_eq!(lines[0], "local a = src[1]");
        assert!(lines.iter().any(|l| l.contains("for __i = 2, #src do")));
    }

    #[test]
    fn object_pattern_binds_by_key() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let key = b.make_node(NodeKind::Identifier { name: "x".into() });
        let value = b.make_node(NodeKind::Identifier { name: "x".into() });
        let property = b.make_node(NodeKind::Property {
            key,
            value,
            computed: false,
            shorthand: true,
            property_kind: luascript_ir::PropertyKind::Init,
        });
        let pattern = b.make_node(NodeKind::ObjectPattern { properties: vec![property] });
        let module = b.finish();
        let lines = emit_pattern_bindings(&module, &mut ctx, &pattern, "src", true).unwrap();
        assert_eq!(lines, vec!["local x = src.x".to_string()]);
    }

    #[test]
    fn assignment_pattern_falls_back_to_default_when_nil() {
        let options = crate::context::EmitOptions::default();
        let mut ctx = EmitContext::new(&options);
        let mut b = Builder::new();
        let left = b.make_node(NodeKind::Identifier { name: "x".into() });
        let right = b.make_node(NodeKind::Literal { value: luascript_ir::LiteralValue::Number(1.0), type_annotation: None });
        let pattern = b.make_node(NodeKind::AssignmentPattern { left, right });
        let module = b.finish();
        let lines = emit_pattern_bindings(&module, &mut ctx, &pattern, "src", true).unwrap();
        assert!(lines[0].contains("src ~= nil"));
        assert_eq!(lines[1], "local x = __tmp0");
    }
}
