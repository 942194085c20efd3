//! The transform stages between literal and stylesheet text.
//!
//! Order matters: selector combination reads the parent chain, so it runs
//! before `hoist` breaks that chain by lifting nested blocks to the root.

use std::mem;

use crate::ast::{kind_for_selector, Ast, AstId, AstKind};
use crate::literal::{format_number, Entry, Value};

/// Expands a node's pending literal into declarations and child blocks.
pub fn parse(ast: &mut Ast, id: AstId) {
    let Some(literal) = ast.node_mut(id).literal.take() else {
        return;
    };
    for (name, entry) in literal.into_entries() {
        let name = name.trim().to_string();
        match entry {
            Entry::Decl(value) => ast.node_mut(id).declarations.push((name, value)),
            Entry::Block(nested) => {
                let kind = kind_for_selector(&name);
                ast.create(kind, name, id, Some(nested));
            }
        }
    }
}

/// camelCase property names become dashed CSS names.
pub fn dashify(ast: &mut Ast, id: AstId) {
    for declaration in &mut ast.node_mut(id).declarations {
        declaration.0 = camel_to_dash(&declaration.0);
    }
}

fn camel_to_dash(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

const ANGLE: &[&str] = &["rotate", "offset-rotate"];

const TIME: &[&str] = &[
    "animation",
    "animation-duration",
    "animation-delay",
    "transition",
    "transition-duration",
    "transition-delay",
];

const LENGTH: &[&str] = &[
    "background-position",
    "background-position-x",
    "background-position-y",
    "background-size",
    "block-size",
    "border",
    "border-block-end-width",
    "border-block-start-width",
    "border-block-width",
    "border-bottom-left-radius",
    "border-bottom-right-radius",
    "border-bottom-width",
    "border-end-end-radius",
    "border-end-start-radius",
    "border-inline-end-width",
    "border-inline-start-width",
    "border-inline-width",
    "border-left-width",
    "border-radius",
    "border-right-width",
    "border-start-end-radius",
    "border-start-start-radius",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-top-width",
    "border-width",
    "bottom",
    "column-gap",
    "column-rule-width",
    "column-width",
    "flex-basis",
    "font-size",
    "gap",
    "grid-template-columns",
    "grid-template-rows",
    "height",
    "inline-size",
    "inset",
    "inset-block",
    "inset-block-end",
    "inset-block-start",
    "inset-inline",
    "inset-inline-end",
    "inset-inline-start",
    "left",
    "margin",
    "margin-block",
    "margin-block-end",
    "margin-block-start",
    "margin-bottom",
    "margin-inline",
    "margin-inline-end",
    "margin-inline-start",
    "margin-left",
    "margin-right",
    "margin-top",
    "mask-border-width",
    "mask-origin",
    "mask-position",
    "mask-size",
    "max-block-size",
    "max-height",
    "max-width",
    "min-block-size",
    "min-height",
    "min-width",
    "offset",
    "offset-anchor",
    "offset-distance",
    "offset-position",
    "outline-width",
    "overflow-clip-margin",
    "padding",
    "padding-block",
    "padding-block-end",
    "padding-block-start",
    "padding-bottom",
    "padding-inline",
    "padding-inline-end",
    "padding-inline-start",
    "padding-left",
    "padding-right",
    "padding-top",
    "perspective",
    "right",
    "row-gap",
    "scroll-margin",
    "scroll-margin-block",
    "scroll-margin-block-end",
    "scroll-margin-block-start",
    "scroll-margin-bottom",
    "scroll-margin-inline",
    "scroll-margin-inline-end",
    "scroll-margin-inline-start",
    "scroll-margin-left",
    "scroll-margin-right",
    "scroll-margin-top",
    "scroll-padding",
    "scroll-padding-block",
    "scroll-padding-block-end",
    "scroll-padding-block-start",
    "scroll-padding-bottom",
    "scroll-padding-inline",
    "scroll-padding-inline-end",
    "scroll-padding-inline-start",
    "scroll-padding-left",
    "scroll-padding-right",
    "scroll-padding-top",
    "top",
    "translate",
    "width",
];

fn default_unit(property: &str) -> Option<&'static str> {
    if ANGLE.contains(&property) {
        Some("deg")
    } else if TIME.contains(&property) {
        Some("ms")
    } else if LENGTH.contains(&property) {
        Some("px")
    } else {
        None
    }
}

fn append_unit(value: Value, unit: &str) -> Value {
    match value {
        Value::Num(number) => Value::Str(format!("{}{unit}", format_number(number))),
        Value::List(parts) => Value::List(
            parts
                .into_iter()
                .map(|part| append_unit(part, unit))
                .collect(),
        ),
        value => value,
    }
}

/// Appends the property's default unit to bare numeric values. Runs after
/// `dashify`, so the tables are keyed by dashed names.
pub fn units(ast: &mut Ast, id: AstId) {
    let declarations = mem::take(&mut ast.node_mut(id).declarations);
    let declarations = declarations
        .into_iter()
        .map(|(name, value)| match default_unit(&name) {
            Some(unit) => {
                let value = append_unit(value, unit);
                (name, value)
            }
            None => (name, value),
        })
        .collect();
    ast.node_mut(id).declarations = declarations;
}

/// Declarations sitting directly inside a nested at-rule are rewrapped in a
/// block carrying the enclosing declaration block's selector, so
/// `@media { color: red }` nested under `.x` emits `@media { .x { ... } }`.
pub fn split(ast: &mut Ast, id: AstId) {
    if ast.node(id).kind != AstKind::NestedAtRule {
        return;
    }
    let Some(parent) = ast.node(id).parent else {
        return;
    };
    let Some(block) = ast.find_closest_declaration_block(parent) else {
        return;
    };
    if ast.node(id).declarations.is_empty() {
        return;
    }
    let selector = ast.node(block).selector.clone();
    let declarations = mem::take(&mut ast.node_mut(id).declarations);
    let child = ast.create(AstKind::DeclarationBlock, selector, id, None);
    ast.node_mut(child).declarations = declarations;
    // the rewrapped declarations come before any explicitly nested blocks
    let children = &mut ast.node_mut(id).children;
    let created = children.pop().expect("just created");
    children.insert(0, created);
}

/// Combines nested selectors with their ancestors; `&` splices the parent
/// selector in place instead of prefixing it.
pub fn selectors(ast: &mut Ast, id: AstId) {
    if ast.node(id).kind != AstKind::DeclarationBlock {
        return;
    }
    let mut selector = ast.node(id).selector.trim().to_string();
    let mut current = ast
        .node(id)
        .parent
        .and_then(|parent| ast.find_closest_declaration_block(parent));

    if let Some(parent_block) = current {
        if let Some(position) = selector.find('&') {
            let prepend = selector[..position].trim_end().to_string();
            let append = selector[position + 1..].trim_start().to_string();
            let combined = join(&ast.node(parent_block).selector, &append);
            selector = join(&prepend, &combined);
            current = ast
                .node(parent_block)
                .parent
                .and_then(|parent| ast.find_closest_declaration_block(parent));
        }
    }
    while let Some(parent_block) = current {
        selector = join(&ast.node(parent_block).selector, &selector);
        current = ast
            .node(parent_block)
            .parent
            .and_then(|parent| ast.find_closest_declaration_block(parent));
    }
    ast.node_mut(id).selector = selector;
}

fn join(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }
    if b.starts_with(':') {
        format!("{a}{b}")
    } else {
        format!("{a} {b}")
    }
}

/// Lifts every nested block to the root (or the closest enclosing at-rule)
/// so the stringified output is flat rules, not nested ones.
pub fn hoist(ast: &mut Ast, id: AstId) {
    if ast.node(id).kind == AstKind::Root {
        return;
    }
    let Some(parent) = ast.node(id).parent else {
        return;
    };
    let target = ast.find_root_or_closest_at_rule(parent);
    if target != parent {
        ast.reparent(id, target);
    }
}
