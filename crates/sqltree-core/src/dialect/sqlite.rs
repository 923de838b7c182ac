//! SQLite dialect.

use crate::ast::{
    precedence, ComparisonOp, Expr, ExtractField, GroupingSet, InfixOp, LockMode,
};
use crate::error::{Error, Result};
use crate::render::{visit, SqlWriter};

use super::Dialect;

/// SQLite: `?` placeholders, strftime-based EXTRACT, no row locks.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn parenthesize_set_operands(&self) -> bool {
        false
    }

    fn infix_precedence(&self, op: InfixOp) -> u8 {
        // `||` binds tighter than the arithmetic operators.
        match op {
            InfixOp::Concat => precedence::TIGHT_INFIX,
            other => other.precedence(),
        }
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
                "sqlite has no {} operator",
                op.as_str()
            )));
        }
        visit::comparison(self, left, op, right, out)
    }

    fn visit_is_distinct_from(
        &self,
        left: &Expr,
        right: &Expr,
        negated: bool,
        out: &mut SqlWriter,
    ) -> Result<()> {
        visit::operand(self, left, precedence::PREDICATE + 1, out)?;
        out.write(if negated { " IS " } else { " IS NOT " });
        visit::operand(self, right, precedence::PREDICATE + 1, out)
    }

    fn visit_extract(&self, field: ExtractField, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
        let format = match field {
            ExtractField::Year => "%Y",
            ExtractField::Quarter => {
                out.write("((CAST(strftime('%m', ");
                self.visit_expr(expr, out)?;
                out.write(") AS INTEGER) + 2) / 3)");
                return Ok(());
            }
            ExtractField::Month => "%m",
            ExtractField::Week => "%W",
            ExtractField::Day => "%d",
            ExtractField::Hour => "%H",
            ExtractField::Minute => "%M",
            ExtractField::Second => "%S",
            ExtractField::Dow => "%w",
            ExtractField::Doy => "%j",
            ExtractField::Epoch => "%s",
        };
        out.write("CAST(strftime('");
        out.write(format);
        out.write("', ");
        self.visit_expr(expr, out)?;
        out.write(") AS INTEGER)");
        Ok(())
    }

    fn visit_grouping_set(&self, set: &GroupingSet, _out: &mut SqlWriter) -> Result<()> {
        Err(Error::malformed(format!(
            "sqlite does not support {}",
            set.kind.as_str()
        )))
    }

    fn visit_limit_offset(
        &self,
        limit: Option<&Expr>,
        offset: Option<&Expr>,
        out: &mut SqlWriter,
    ) -> Result<()> {
        if let (None, Some(offset)) = (limit, offset) {
            out.write(" LIMIT -1 OFFSET ");
            return self.visit_expr(offset, out);
        }
        visit::limit_offset(self, limit, offset, out)
    }

    fn visit_lock(&self, lock: LockMode, _skip_locked: bool, _out: &mut SqlWriter) -> Result<()> {
        tracing::warn!(
            dialect = "sqlite",
            lock = lock.as_str(),
            "row locks are not supported, dropping lock clause"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, Renderer};

    fn inline() -> Renderer {
        Renderer::new(Sqlite, RenderOptions { parameterised: false })
    }

    #[test]
    fn test_distinctness_uses_is() {
        let r = inline();
        assert_eq!(
            r.render(&Expr::column("a").is_distinct_from(Expr::column("b")))
                .unwrap()
                .sql,
            r#""a" IS NOT "b""#
        );
        assert_eq!(
            r.render(&Expr::column("a").is_not_distinct_from(Expr::column("b")))
                .unwrap()
                .sql,
            r#""a" IS "b""#
        );
    }

    #[test]
    fn test_extract_uses_strftime() {
        let r = inline();
        let sql = |field| {
            r.render(&Expr::Extract {
                field,
                expr: Box::new(Expr::column("d")),
            })
            .unwrap()
            .sql
        };
        assert_eq!(
            sql(ExtractField::Year),
            r#"CAST(strftime('%Y', "d") AS INTEGER)"#
        );
        assert_eq!(
            sql(ExtractField::Quarter),
            r#"((CAST(strftime('%m', "d") AS INTEGER) + 2) / 3)"#
        );
    }

    #[test]
    fn test_ilike_lowers_both_sides() {
        assert_eq!(
            inline().render(&Expr::column("a").ilike("%X%")).unwrap().sql,
            r#"LOWER("a") LIKE LOWER('%X%')"#
        );
    }
}
