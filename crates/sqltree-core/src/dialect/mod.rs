//! SQL Dialect support.
//!
//! A [`Dialect`] is the visitor that turns AST nodes into SQL text. Every
//! `visit_*` method has a default implementation producing the portable
//! spelling; dialects override only the nodes they spell differently.
//! Recursion always goes back through the trait, so an override applies
//! wherever its node appears in the tree.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use std::fmt;

use crate::ast::{
    Aggregate, ComparisonOp, Cte, DeleteStatement, Expr, ExtractField, GroupingSet, InfixOp,
    InsertStatement, Join, LockMode, OnConflict, Ordering, Query, Relation, SelectCore,
    SetOperation, SqlValue, Statement, UpdateStatement,
};
use crate::error::Result;
use crate::render::{visit, SqlWriter};

/// Trait for SQL dialect-specific rendering.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let doubled: String = [quote, quote].iter().collect();
        format!("{quote}{}{quote}", name.replace(quote, &doubled))
    }

    /// Returns the placeholder for the `index`-th captured parameter
    /// (1-based).
    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    /// Spells a value inline.
    fn inline_value(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// Returns whether the dialect supports a RETURNING clause.
    fn supports_returning(&self) -> bool {
        true
    }

    /// Returns whether the dialect supports `SELECT DISTINCT ON (...)`.
    fn supports_distinct_on(&self) -> bool {
        false
    }

    /// Returns whether the dialect has a native ILIKE. Without it,
    /// case-insensitive matches compare `LOWER()` of both sides.
    fn supports_ilike(&self) -> bool {
        false
    }

    /// Returns whether set-operation operands may be parenthesised.
    fn parenthesize_set_operands(&self) -> bool {
        true
    }

    /// Regular-expression match operator.
    fn regex_operator(&self, negated: bool, _case_insensitive: bool) -> &'static str {
        if negated {
            "NOT REGEXP"
        } else {
            "REGEXP"
        }
    }

    /// Spelling of an infix operator.
    fn infix_operator(&self, op: InfixOp) -> &'static str {
        op.as_str()
    }

    /// Binding strength of an infix operator, used to decide where
    /// operands need parentheses.
    fn infix_precedence(&self, op: InfixOp) -> u8 {
        op.precedence()
    }

    /// Keyword that starts an INSERT.
    fn insert_keyword(&self, _stmt: &InsertStatement) -> &'static str {
        "INSERT INTO"
    }

    /// Clause for an INSERT without rows.
    fn default_values_clause(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    fn visit_statement(&self, stmt: &Statement, out: &mut SqlWriter) -> Result<()> {
        visit::statement(self, stmt, out)
    }

    fn visit_query(&self, query: &Query, out: &mut SqlWriter) -> Result<()> {
        visit::query(self, query, out)
    }

    fn visit_select_core(&self, core: &SelectCore, out: &mut SqlWriter) -> Result<()> {
        visit::select_core(self, core, out)
    }

    fn visit_set_operation(&self, op: &SetOperation, out: &mut SqlWriter) -> Result<()> {
        visit::set_operation(self, op, out)
    }

    fn visit_ctes(&self, ctes: &[Cte], out: &mut SqlWriter) -> Result<()> {
        visit::ctes(self, ctes, out)
    }

    fn visit_relation(&self, relation: &Relation, out: &mut SqlWriter) -> Result<()> {
        visit::relation(self, relation, out)
    }

    fn visit_join(&self, join: &Join, out: &mut SqlWriter) -> Result<()> {
        visit::join(self, join, out)
    }

    fn visit_distinct_on(&self, exprs: &[Expr], out: &mut SqlWriter) -> Result<()> {
        visit::distinct_on(self, exprs, out)
    }

    fn visit_limit_offset(
        &self,
        limit: Option<&Expr>,
        offset: Option<&Expr>,
        out: &mut SqlWriter,
    ) -> Result<()> {
        visit::limit_offset(self, limit, offset, out)
    }

    fn visit_lock(&self, lock: LockMode, skip_locked: bool, out: &mut SqlWriter) -> Result<()> {
        visit::lock(lock, skip_locked, out);
        Ok(())
    }

    fn visit_expr(&self, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
        visit::expr(self, expr, out)
    }

    fn visit_literal(&self, value: &SqlValue, out: &mut SqlWriter) -> Result<()> {
        visit::literal(self, value, out);
        Ok(())
    }

    fn visit_comparison(
        &self,
        left: &Expr,
        op: ComparisonOp,
        right: &Expr,
        out: &mut SqlWriter,
    ) -> Result<()> {
        visit::comparison(self, left, op, right, out)
    }

    fn visit_infix(
        &self,
        left: &Expr,
        op: InfixOp,
        right: &Expr,
        out: &mut SqlWriter,
    ) -> Result<()> {
        visit::infix(self, left, op, right, out)
    }

    fn visit_is_distinct_from(
        &self,
        left: &Expr,
        right: &Expr,
        negated: bool,
        out: &mut SqlWriter,
    ) -> Result<()> {
        visit::is_distinct_from(self, left, right, negated, out)
    }

    fn visit_aggregate(&self, aggregate: &Aggregate, out: &mut SqlWriter) -> Result<()> {
        visit::aggregate(self, aggregate, out)
    }

    fn visit_ordering(&self, ordering: &Ordering, out: &mut SqlWriter) -> Result<()> {
        visit::ordering(self, ordering, out)
    }

    fn visit_extract(&self, field: ExtractField, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
        visit::extract(self, field, expr, out)
    }

    fn visit_grouping_set(&self, set: &GroupingSet, out: &mut SqlWriter) -> Result<()> {
        visit::grouping_set(self, set, out)
    }

    fn visit_excluded(&self, column: &str, out: &mut SqlWriter) -> Result<()> {
        out.write("EXCLUDED.");
        out.write_identifier(self, column);
        Ok(())
    }

    fn visit_insert(&self, stmt: &InsertStatement, out: &mut SqlWriter) -> Result<()> {
        visit::insert(self, stmt, out)
    }

    fn visit_on_conflict(&self, on_conflict: &OnConflict, out: &mut SqlWriter) -> Result<()> {
        visit::on_conflict(self, on_conflict, out)
    }

    fn visit_update(&self, stmt: &UpdateStatement, out: &mut SqlWriter) -> Result<()> {
        visit::update(self, stmt, out)
    }

    fn visit_delete(&self, stmt: &DeleteStatement, out: &mut SqlWriter) -> Result<()> {
        visit::delete(self, stmt, out)
    }

    fn visit_returning(&self, exprs: &[Expr], out: &mut SqlWriter) -> Result<()> {
        visit::returning(self, exprs, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_doubles_quotes() {
        assert_eq!(Postgres.quote_identifier("users"), "\"users\"");
        assert_eq!(Postgres.quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(MySql.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.placeholder(3), "$3");
        assert_eq!(MySql.placeholder(3), "?");
        assert_eq!(Sqlite.placeholder(3), "?");
    }

    #[test]
    fn test_capabilities() {
        assert!(Postgres.supports_returning());
        assert!(!MySql.supports_returning());
        assert!(Sqlite.supports_returning());
        assert!(Postgres.supports_distinct_on());
        assert!(!Sqlite.supports_distinct_on());
        assert!(!Sqlite.parenthesize_set_operands());
    }
}
