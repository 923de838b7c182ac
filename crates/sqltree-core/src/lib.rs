//! # sqltree-core
//!
//! A SQL query builder that keeps statements as an AST until the last
//! moment.
//!
//! This crate provides:
//! - An AST for SELECT (with CTEs, windows, grouping sets and set
//!   operations), INSERT, UPDATE and DELETE
//! - Builders that assemble the AST through method chains
//! - A transformer pipeline that rewrites statements before rendering
//! - Renderers for PostgreSQL, MySQL and SQLite
//!
//! ## SQL Injection Prevention
//!
//! Values become literal nodes. A parameterised renderer captures them
//! into a separate vector and emits placeholders:
//!
//! ```rust
//! use sqltree_core::ast::{SqlValue, Table};
//! use sqltree_core::builder::Select;
//! use sqltree_core::render::Renderer;
//!
//! let users = Table::new("users");
//! let user_input = "'; DROP TABLE users; --";
//! let rendered = Select::new()
//!     .from(&users)
//!     .select([users.col("id")])
//!     .where_clause(users.col("name").eq(user_input))
//!     .to_sql(&Renderer::sqlite())
//!     .unwrap();
//!
//! assert_eq!(
//!     rendered.sql,
//!     r#"SELECT "users"."id" FROM "users" WHERE "users"."name" = ?"#
//! );
//! assert_eq!(rendered.params, vec![SqlValue::Text(user_input.into())]);
//! ```

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod render;
pub mod schema;
pub mod transform;

pub use ast::{Expr, IntoExpr, Relation, SqlValue, Statement, Table};
pub use builder::{col, Compound, Delete, Insert, Select, Update};
pub use dialect::{Dialect, MySql, Postgres, Sqlite};
pub use error::{BoxError, Error, Result};
pub use render::{Node, RenderOptions, Rendered, Renderer};
pub use transform::{Pipeline, Transformer};
