//! AST to stylesheet text.

use crate::ast::{Ast, AstId};

pub fn stringify(ast: &Ast, root: AstId) -> String {
    let mut buffer = String::new();
    inner(ast, root, &mut buffer);
    buffer
}

fn inner(ast: &Ast, id: AstId, buffer: &mut String) {
    for (name, value) in &ast.node(id).declarations {
        buffer.push_str(name);
        buffer.push(':');
        buffer.push_str(&value.to_css());
        buffer.push_str(";\n");
    }
    for child in &ast.node(id).children {
        outer(ast, *child, buffer);
    }
}

fn outer(ast: &Ast, id: AstId, buffer: &mut String) {
    buffer.push_str(&ast.node(id).selector);
    buffer.push_str("{\n");
    inner(ast, id, buffer);
    buffer.push_str("}\n");
}
