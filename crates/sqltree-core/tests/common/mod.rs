#![allow(dead_code)]

use sqltree_core::ast::{SqlValue, Table};
use sqltree_core::render::{Node, Rendered, Renderer};
use sqltree_core::{Error, Select};

pub fn users() -> Table {
    Table::new("users")
}

pub fn posts() -> Table {
    Table::new("posts")
}

pub fn orders() -> Table {
    Table::new("orders")
}

/// Parameterised PostgreSQL renderer.
pub fn pg() -> Renderer {
    Renderer::postgres()
}

/// PostgreSQL renderer with literals written inline.
pub fn inline_pg() -> Renderer {
    Renderer::postgres().parameterised(false)
}

pub fn render<N: Node + ?Sized>(renderer: &Renderer, node: &N) -> Rendered {
    renderer
        .render(node)
        .unwrap_or_else(|e| panic!("Failed to render with {}: {e}", renderer.dialect().name()))
}

pub fn render_select(renderer: &Renderer, select: &Select) -> Rendered {
    select
        .to_sql(renderer)
        .unwrap_or_else(|e| panic!("Failed to render with {}: {e}", renderer.dialect().name()))
}

/// SQL text of a select, for tests that do not inspect parameters.
pub fn sql_of(renderer: &Renderer, select: &Select) -> String {
    render_select(renderer, select).sql
}

pub fn expect_malformed(result: sqltree_core::Result<Rendered>) -> String {
    match result {
        Err(Error::MalformedAst(message)) => message,
        other => panic!("Expected MalformedAst, got {other:?}"),
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}
