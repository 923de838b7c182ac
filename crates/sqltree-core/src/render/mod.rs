//! Turning AST nodes into SQL text plus captured parameters.
//!
//! ```rust
//! use sqltree_core::ast::Table;
//! use sqltree_core::builder::Select;
//! use sqltree_core::render::Renderer;
//!
//! let users = Table::new("users");
//! let rendered = Select::new()
//!     .from(&users)
//!     .select([users.col("id")])
//!     .where_clause(users.col("name").eq("O'Brien"))
//!     .to_sql(&Renderer::postgres())
//!     .unwrap();
//!
//! assert_eq!(
//!     rendered.sql,
//!     r#"SELECT "users"."id" FROM "users" WHERE "users"."name" = $1"#
//! );
//! ```

pub mod visit;
mod writer;

pub use writer::SqlWriter;

use std::sync::Arc;

use crate::ast::{
    DeleteStatement, Expr, InsertStatement, Ordering, Query, Relation, SelectCore, SqlValue,
    Statement, UpdateStatement,
};
use crate::dialect::{Dialect, MySql, Postgres, Sqlite};
use crate::error::Result;

/// Renderer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Capture literal values as parameters instead of inlining them.
    pub parameterised: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parameterised: true,
        }
    }
}

/// The result of a render: SQL text and the ordered parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A node that can be rendered on its own.
pub trait Node {
    /// Writes this node through `dialect`.
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()>;
}

/// Renders nodes with a dialect and options. Every call starts from a
/// fresh buffer, so one renderer can be reused and shared.
#[derive(Debug, Clone)]
pub struct Renderer {
    dialect: Arc<dyn Dialect>,
    options: RenderOptions,
}

impl Renderer {
    /// Creates a renderer for any dialect.
    #[must_use]
    pub fn new(dialect: impl Dialect + 'static, options: RenderOptions) -> Self {
        Self {
            dialect: Arc::new(dialect),
            options,
        }
    }

    /// PostgreSQL renderer in parameterised mode.
    #[must_use]
    pub fn postgres() -> Self {
        Self::new(Postgres, RenderOptions::default())
    }

    /// MySQL renderer in parameterised mode.
    #[must_use]
    pub fn mysql() -> Self {
        Self::new(MySql, RenderOptions::default())
    }

    /// SQLite renderer in parameterised mode.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(Sqlite, RenderOptions::default())
    }

    /// Switches between parameterised and inline literals.
    #[must_use]
    pub const fn parameterised(mut self, parameterised: bool) -> Self {
        self.options.parameterised = parameterised;
        self
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Renders a node.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedAst` if the tree breaks a structural rule
    /// or uses a construct the dialect cannot express.
    pub fn render<N: Node + ?Sized>(&self, node: &N) -> Result<Rendered> {
        let mut out = SqlWriter::new(self.options.parameterised);
        node.accept(self.dialect.as_ref(), &mut out)?;
        let (sql, params) = out.into_parts();
        tracing::trace!(
            dialect = self.dialect.name(),
            params = params.len(),
            sql = %sql,
            "rendered statement"
        );
        Ok(Rendered { sql, params })
    }
}

impl Node for Statement {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_statement(self, out)
    }
}

impl Node for Query {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_query(self, out)
    }
}

impl Node for SelectCore {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_select_core(self, out)
    }
}

impl Node for InsertStatement {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_insert(self, out)
    }
}

impl Node for UpdateStatement {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_update(self, out)
    }
}

impl Node for DeleteStatement {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_delete(self, out)
    }
}

impl Node for Expr {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_expr(self, out)
    }
}

impl Node for Relation {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_relation(self, out)
    }
}

impl Node for Ordering {
    fn accept(&self, dialect: &dyn Dialect, out: &mut SqlWriter) -> Result<()> {
        dialect.visit_ordering(self, out)
    }
}
