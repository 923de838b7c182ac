//! Expression factories.
//!
//! Free functions for the nodes that do not hang off an existing
//! expression: columns, escape hatches, aggregates, window functions and
//! grouping sets.

use std::sync::Arc;

use crate::ast::{
    Aggregate, AggregateFunc, Case, Expr, ExtractField, GroupingKind, GroupingSet, IntoExpr,
    NamedFunction, Query, SqlValue, Table, ToSqlValue, WindowFunc, WindowFunction,
};

/// Creates a table reference.
#[must_use]
pub fn table(name: &str) -> Table {
    Table::new(name)
}

/// Creates an unqualified column reference.
#[must_use]
pub fn col(name: &str) -> Expr {
    Expr::column(name)
}

/// Unqualified `*`.
#[must_use]
pub const fn star() -> Expr {
    Expr::Star(None)
}

/// Raw SQL emitted verbatim. Never pass untrusted input here.
#[must_use]
pub fn sql(raw: impl Into<String>) -> Expr {
    Expr::SqlLiteral(raw.into())
}

/// A value that always renders as a placeholder.
#[must_use]
pub fn bind(value: impl ToSqlValue) -> Expr {
    Expr::BindParam(value.to_sql_value())
}

/// A value that is always written inline, even by a parameterising
/// renderer.
#[must_use]
pub fn inline(value: impl ToSqlValue) -> Expr {
    Expr::InlineValue(value.to_sql_value())
}

/// A literal value.
#[must_use]
pub fn lit(value: impl ToSqlValue) -> Expr {
    Expr::Literal(value.to_sql_value())
}

/// The NULL literal.
#[must_use]
pub const fn null() -> Expr {
    Expr::Literal(SqlValue::Null)
}

/// A generic function call; the name is upper-cased.
#[must_use]
pub fn func<I>(name: &str, args: I) -> NamedFunction
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    NamedFunction::new(name, args)
}

// Aggregates

#[must_use]
pub const fn count_star() -> Aggregate {
    Aggregate {
        func: AggregateFunc::Count,
        expr: None,
        distinct: false,
        filter: None,
    }
}

#[must_use]
pub fn count(expr: impl IntoExpr) -> Aggregate {
    Aggregate::new(AggregateFunc::Count, Some(expr.into_expr()))
}

#[must_use]
pub fn sum(expr: impl IntoExpr) -> Aggregate {
    Aggregate::new(AggregateFunc::Sum, Some(expr.into_expr()))
}

#[must_use]
pub fn avg(expr: impl IntoExpr) -> Aggregate {
    Aggregate::new(AggregateFunc::Avg, Some(expr.into_expr()))
}

#[must_use]
pub fn min(expr: impl IntoExpr) -> Aggregate {
    Aggregate::new(AggregateFunc::Min, Some(expr.into_expr()))
}

#[must_use]
pub fn max(expr: impl IntoExpr) -> Aggregate {
    Aggregate::new(AggregateFunc::Max, Some(expr.into_expr()))
}

// Window functions

const fn window(func: WindowFunc, args: Vec<Expr>) -> WindowFunction {
    WindowFunction { func, args }
}

#[must_use]
pub const fn row_number() -> WindowFunction {
    window(WindowFunc::RowNumber, Vec::new())
}

#[must_use]
pub const fn rank() -> WindowFunction {
    window(WindowFunc::Rank, Vec::new())
}

#[must_use]
pub const fn dense_rank() -> WindowFunction {
    window(WindowFunc::DenseRank, Vec::new())
}

#[must_use]
pub const fn cume_dist() -> WindowFunction {
    window(WindowFunc::CumeDist, Vec::new())
}

#[must_use]
pub const fn percent_rank() -> WindowFunction {
    window(WindowFunc::PercentRank, Vec::new())
}

#[must_use]
pub fn ntile(buckets: i64) -> WindowFunction {
    window(WindowFunc::Ntile, vec![buckets.into_expr()])
}

fn offset_args(expr: Expr, offset: Option<i64>, default: Option<Expr>) -> Vec<Expr> {
    let mut args = vec![expr];
    match (offset, default) {
        (Some(offset), Some(default)) => {
            args.push(offset.into_expr());
            args.push(default);
        }
        (None, Some(default)) => {
            args.push(1_i64.into_expr());
            args.push(default);
        }
        (Some(offset), None) => args.push(offset.into_expr()),
        (None, None) => {}
    }
    args
}

/// `LAG(expr[, offset[, default]])`.
#[must_use]
pub fn lag(expr: impl IntoExpr, offset: Option<i64>, default: Option<Expr>) -> WindowFunction {
    window(WindowFunc::Lag, offset_args(expr.into_expr(), offset, default))
}

/// `LEAD(expr[, offset[, default]])`.
#[must_use]
pub fn lead(expr: impl IntoExpr, offset: Option<i64>, default: Option<Expr>) -> WindowFunction {
    window(WindowFunc::Lead, offset_args(expr.into_expr(), offset, default))
}

#[must_use]
pub fn first_value(expr: impl IntoExpr) -> WindowFunction {
    window(WindowFunc::FirstValue, vec![expr.into_expr()])
}

#[must_use]
pub fn last_value(expr: impl IntoExpr) -> WindowFunction {
    window(WindowFunc::LastValue, vec![expr.into_expr()])
}

#[must_use]
pub fn nth_value(expr: impl IntoExpr, n: i64) -> WindowFunction {
    window(WindowFunc::NthValue, vec![expr.into_expr(), n.into_expr()])
}

// Other constructs

/// Searched CASE.
#[must_use]
pub fn case() -> Case {
    Case::new()
}

#[must_use]
pub fn cast(expr: impl IntoExpr, type_name: &str) -> Expr {
    expr.into_expr().cast(type_name)
}

#[must_use]
pub fn extract(field: ExtractField, expr: impl IntoExpr) -> Expr {
    Expr::Extract {
        field,
        expr: Box::new(expr.into_expr()),
    }
}

#[must_use]
pub fn exists(query: impl Into<Query>) -> Expr {
    Expr::Exists {
        query: Arc::new(query.into()),
        negated: false,
    }
}

#[must_use]
pub fn not_exists(query: impl Into<Query>) -> Expr {
    Expr::Exists {
        query: Arc::new(query.into()),
        negated: true,
    }
}

/// Scalar subquery.
#[must_use]
pub fn subquery(query: impl Into<Query>) -> Expr {
    Expr::Subquery(Arc::new(query.into()))
}

/// The proposed value of `column` in an upsert.
#[must_use]
pub fn excluded(column: &str) -> Expr {
    Expr::Excluded(String::from(column))
}

/// AND of all predicates; `None` when there are none.
#[must_use]
pub fn all<I>(predicates: I) -> Option<Expr>
where
    I: IntoIterator<Item = Expr>,
{
    predicates.into_iter().reduce(Expr::and)
}

/// OR of all predicates; `None` when there are none.
#[must_use]
pub fn any<I>(predicates: I) -> Option<Expr>
where
    I: IntoIterator<Item = Expr>,
{
    predicates.into_iter().reduce(Expr::or)
}

fn grouping<I, S>(kind: GroupingKind, sets: I) -> GroupingSet
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Expr>,
{
    GroupingSet {
        kind,
        sets: sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect(),
    }
}

/// `CUBE(...)`; each inner list is one grouping element.
#[must_use]
pub fn cube<I, S>(sets: I) -> GroupingSet
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Expr>,
{
    grouping(GroupingKind::Cube, sets)
}

/// `ROLLUP(...)`; each inner list is one grouping element.
#[must_use]
pub fn rollup<I, S>(sets: I) -> GroupingSet
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Expr>,
{
    grouping(GroupingKind::Rollup, sets)
}

/// `GROUPING SETS(...)`; an empty inner list is the grand total `()`.
#[must_use]
pub fn grouping_sets<I, S>(sets: I) -> GroupingSet
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Expr>,
{
    grouping(GroupingKind::GroupingSets, sets)
}
