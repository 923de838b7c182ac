//! MySQL dialect.

use crate::ast::{
    precedence, Aggregate, ComparisonOp, ConflictAction, Expr, ExtractField, GroupingKind,
    GroupingSet, InfixOp, InsertStatement, LockMode, NullOrdering, OnConflict, Ordering,
    SelectCore, SqlValue,
};
use crate::error::{Error, Result};
use crate::render::{visit, SqlWriter};

use super::Dialect;

/// Largest LIMIT MySQL accepts; used when only OFFSET is given.
const MAX_LIMIT: &str = "18446744073709551615";

/// MySQL: backtick quoting, `?` placeholders, no RETURNING.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn inline_value(&self, value: &SqlValue) -> String {
        match value {
            // Backslash is an escape character inside MySQL strings.
            SqlValue::Text(text) => {
                format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''"))
            }
            other => other.to_sql_inline(),
        }
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn infix_precedence(&self, op: InfixOp) -> u8 {
        match op {
            // Rendered as a CONCAT() call.
            InfixOp::Concat => precedence::ATOM,
            // `^` binds tighter than the arithmetic operators.
            InfixOp::BitXor => precedence::TIGHT_INFIX,
            other => other.precedence(),
        }
    }

    fn insert_keyword(&self, stmt: &InsertStatement) -> &'static str {
        match &stmt.on_conflict {
            Some(OnConflict {
                action: ConflictAction::DoNothing,
                ..
            }) => "INSERT IGNORE INTO",
            _ => "INSERT INTO",
        }
    }

    fn default_values_clause(&self) -> &'static str {
        "VALUES ()"
    }

    fn visit_select_core(&self, core: &SelectCore, out: &mut SqlWriter) -> Result<()> {
        // `WITH ROLLUP` applies to the whole GROUP BY list, so it only
        // matches ROLLUP(...) when that is the sole grouping element.
        let grouping_sets = core
            .groups
            .iter()
            .filter(|group| matches!(group, Expr::GroupingSet(_)))
            .count();
        if grouping_sets > 0 && core.groups.len() > 1 {
            return Err(Error::malformed(
                "mysql only supports ROLLUP as the sole GROUP BY element",
            ));
        }
        visit::select_core(self, core, out)
    }

    fn visit_comparison(
        &self,
        left: &Expr,
        op: ComparisonOp,
        right: &Expr,
        out: &mut SqlWriter,
    ) -> Result<()> {
        if matches!(op, ComparisonOp::Contains | ComparisonOp::Overlaps) {
            return Err(Error::malformed(format!(
                "mysql has no {} operator",
                op.as_str()
            )));
        }
        visit::comparison(self, left, op, right, out)
    }

    fn visit_infix(
        &self,
        left: &Expr,
        op: InfixOp,
        right: &Expr,
        out: &mut SqlWriter,
    ) -> Result<()> {
        // `||` means OR unless PIPES_AS_CONCAT is set.
        if op == InfixOp::Concat {
            out.write("CONCAT(");
            self.visit_expr(left, out)?;
            out.write(", ");
            self.visit_expr(right, out)?;
            out.push(')');
            return Ok(());
        }
        visit::infix(self, left, op, right, out)
    }

    fn visit_is_distinct_from(
        &self,
        left: &Expr,
        right: &Expr,
        negated: bool,
        out: &mut SqlWriter,
    ) -> Result<()> {
        if !negated {
            out.write("NOT (");
        }
        visit::operand(self, left, precedence::PREDICATE + 1, out)?;
        out.write(" <=> ");
        visit::operand(self, right, precedence::PREDICATE + 1, out)?;
        if !negated {
            out.push(')');
        }
        Ok(())
    }

    fn visit_aggregate(&self, aggregate: &Aggregate, out: &mut SqlWriter) -> Result<()> {
        let Some(filter) = &aggregate.filter else {
            return visit::aggregate(self, aggregate, out);
        };
        // No FILTER clause: move the predicate into a CASE argument.
        visit::check_star_argument(aggregate)?;
        out.write(aggregate.func.as_str());
        out.push('(');
        if aggregate.distinct {
            out.write("DISTINCT ");
        }
        out.write("CASE WHEN ");
        self.visit_expr(filter, out)?;
        out.write(" THEN ");
        match &aggregate.expr {
            Some(expr) => self.visit_expr(expr, out)?,
            None => out.push('1'),
        }
        out.write(" END)");
        Ok(())
    }

    fn visit_ordering(&self, ordering: &Ordering, out: &mut SqlWriter) -> Result<()> {
        // Emulate NULLS FIRST/LAST by sorting on the null test first.
        let nulls_direction = match ordering.nulls {
            NullOrdering::Default => return visit::ordering(self, ordering, out),
            NullOrdering::First => " IS NULL DESC, ",
            NullOrdering::Last => " IS NULL ASC, ",
        };
        visit::operand(self, &ordering.expr, precedence::PREDICATE + 1, out)?;
        out.write(nulls_direction);
        visit::operand(self, &ordering.expr, precedence::ALIAS + 1, out)?;
        out.push(' ');
        out.write(ordering.direction.as_str());
        Ok(())
    }

    fn visit_extract(&self, field: ExtractField, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
        let (open, close) = match field {
            ExtractField::Dow => ("(DAYOFWEEK(", ") - 1)"),
            ExtractField::Doy => ("DAYOFYEAR(", ")"),
            ExtractField::Epoch => ("UNIX_TIMESTAMP(", ")"),
            _ => return visit::extract(self, field, expr, out),
        };
        out.write(open);
        self.visit_expr(expr, out)?;
        out.write(close);
        Ok(())
    }

    fn visit_grouping_set(&self, set: &GroupingSet, out: &mut SqlWriter) -> Result<()> {
        if set.kind != GroupingKind::Rollup {
            return Err(Error::malformed(format!(
                "mysql does not support {}",
                set.kind.as_str()
            )));
        }
        let columns: Vec<Expr> = set.sets.iter().flatten().cloned().collect();
        if columns.is_empty() {
            return Err(Error::malformed("ROLLUP needs at least one column"));
        }
        visit::expr_list(self, &columns, out)?;
        out.write(" WITH ROLLUP");
        Ok(())
    }

    fn visit_limit_offset(
        &self,
        limit: Option<&Expr>,
        offset: Option<&Expr>,
        out: &mut SqlWriter,
    ) -> Result<()> {
        if let (None, Some(offset)) = (limit, offset) {
            out.write(" LIMIT ");
            out.write(MAX_LIMIT);
            out.write(" OFFSET ");
            return self.visit_expr(offset, out);
        }
        visit::limit_offset(self, limit, offset, out)
    }

    fn visit_lock(&self, lock: LockMode, skip_locked: bool, out: &mut SqlWriter) -> Result<()> {
        let lock = match lock {
            LockMode::Update | LockMode::NoKeyUpdate => LockMode::Update,
            LockMode::Share | LockMode::KeyShare => LockMode::Share,
        };
        visit::lock(lock, skip_locked, out);
        Ok(())
    }

    fn visit_excluded(&self, column: &str, out: &mut SqlWriter) -> Result<()> {
        out.write("VALUES(");
        out.write_identifier(self, column);
        out.push(')');
        Ok(())
    }

    fn visit_on_conflict(&self, on_conflict: &OnConflict, out: &mut SqlWriter) -> Result<()> {
        match &on_conflict.action {
            // Spelled as INSERT IGNORE by `insert_keyword`.
            ConflictAction::DoNothing => Ok(()),
            ConflictAction::DoUpdate(assignments) => {
                out.write(" ON DUPLICATE KEY UPDATE ");
                visit::assignment_list(self, assignments, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AggregateFunc, Table};
    use crate::render::{RenderOptions, Renderer};

    fn inline() -> Renderer {
        Renderer::new(MySql, RenderOptions { parameterised: false })
    }

    #[test]
    fn test_backslashes_are_doubled() {
        assert_eq!(
            MySql.inline_value(&SqlValue::Text(String::from(r"a\'b"))),
            r"'a\\''b'"
        );
    }

    #[test]
    fn test_distinctness_uses_null_safe_equality() {
        let r = inline();
        assert_eq!(
            r.render(&Expr::column("a").is_distinct_from(1)).unwrap().sql,
            "NOT (`a` <=> 1)"
        );
        assert_eq!(
            r.render(&Expr::column("a").is_not_distinct_from(1))
                .unwrap()
                .sql,
            "`a` <=> 1"
        );
    }

    #[test]
    fn test_filter_becomes_case() {
        let t = Table::new("orders");
        let count = Aggregate::new(AggregateFunc::Count, None).filter(t.col("paid").eq(true));
        assert_eq!(
            inline().render(&Expr::Aggregate(count)).unwrap().sql,
            "COUNT(CASE WHEN `orders`.`paid` = TRUE THEN 1 END)"
        );

        let sum = Aggregate::new(AggregateFunc::Sum, Some(t.col("total")))
            .filter(t.col("paid").eq(true));
        assert_eq!(
            inline().render(&Expr::Aggregate(sum)).unwrap().sql,
            "SUM(CASE WHEN `orders`.`paid` = TRUE THEN `orders`.`total` END)"
        );
    }

    #[test]
    fn test_nulls_last_is_emulated() {
        let ordering = Expr::column("a").asc().nulls_last();
        assert_eq!(
            inline().render(&ordering).unwrap().sql,
            "`a` IS NULL ASC, `a` ASC"
        );
    }

    #[test]
    fn test_concat_uses_function() {
        assert_eq!(
            inline()
                .render(&Expr::column("a").concat("-"))
                .unwrap()
                .sql,
            "CONCAT(`a`, '-')"
        );
    }

    #[test]
    fn test_extract_mappings() {
        let r = inline();
        let sql = |field| {
            r.render(&Expr::Extract {
                field,
                expr: Box::new(Expr::column("d")),
            })
            .unwrap()
            .sql
        };
        assert_eq!(sql(ExtractField::Year), "EXTRACT(YEAR FROM `d`)");
        assert_eq!(sql(ExtractField::Dow), "(DAYOFWEEK(`d`) - 1)");
        assert_eq!(sql(ExtractField::Doy), "DAYOFYEAR(`d`)");
        assert_eq!(sql(ExtractField::Epoch), "UNIX_TIMESTAMP(`d`)");
    }

    #[test]
    fn test_array_operators_are_rejected() {
        let err = inline()
            .render(&Expr::column("tags").contains(Expr::SqlLiteral("'{a}'".into())))
            .unwrap_err();
        assert!(err.to_string().contains("@>"));
    }
}
