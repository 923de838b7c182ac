//! Abstract Syntax Tree (AST) types for SQL statements.
//!
//! Every node is an owned, cloneable value. Nodes are assembled by the
//! builders in [`crate::builder`], rewritten by transformers and turned
//! into SQL text by a [`crate::render::Renderer`].

mod expression;
mod relation;
mod statement;
mod value;
mod window;

pub(crate) use expression::precedence;
pub use expression::{
    Aggregate, AggregateFunc, Attribute, Case, ComparisonOp, Expr, ExtractField, GroupingKind,
    GroupingSet, InfixOp, IntoExpr, NamedFunction, UnaryOp, WindowFunc, WindowFunction,
};
pub use relation::{Relation, Table, TableAlias};
pub use statement::{
    Assignment, ConflictAction, Cte, DeleteStatement, InsertSource, InsertStatement, Join,
    JoinKind, JoinSource, LockMode, OnConflict, Query, SelectCore, SetOperation, SetOperator,
    Statement, UpdateStatement,
};
pub use value::{hex, quote_string, SqlValue, ToSqlValue};
pub use window::{
    FrameBound, FrameUnits, NullOrdering, OrderDirection, Ordering, WindowDefinition,
    WindowFrame, WindowSpec,
};
