//! PostgreSQL dialect.

use crate::ast::{hex, InfixOp, SqlValue};

use super::Dialect;

/// PostgreSQL: `$n` placeholders, `~` regex operators, DISTINCT ON and
/// native ILIKE.
#[derive(Debug, Default, Clone, Copy)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn inline_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Blob(bytes) => format!("'\\x{}'::bytea", hex(bytes)),
            other => other.to_sql_inline(),
        }
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn regex_operator(&self, negated: bool, case_insensitive: bool) -> &'static str {
        match (negated, case_insensitive) {
            (false, false) => "~",
            (true, false) => "!~",
            (false, true) => "~*",
            (true, true) => "!~*",
        }
    }

    fn infix_operator(&self, op: InfixOp) -> &'static str {
        // `^` is exponentiation in PostgreSQL.
        match op {
            InfixOp::BitXor => "#",
            other => other.as_str(),
        }
    }
}
