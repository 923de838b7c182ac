//! Translation of residual policy queries into SQL predicates.
//!
//! A compile response is a disjunction of conjunctions. Each expression
//! is a call `[operator, operand, operand]` where exactly one operand is
//! a reference into `data.<table>` (the column) and the other is a
//! constant.

use serde_json::Value;
use sqltree_core::ast::{ComparisonOp, Expr, Relation, SqlValue};
use sqltree_core::builder::{all, any};

use crate::error::{PolicyError, Result};

/// Builds the row filter for `table` from residual `queries`.
///
/// Returns `Ok(None)` for an unconditional allow, i.e. when any inner
/// query is empty. An empty outer list is a deny.
pub fn row_filter(
    table: &str,
    queries: &[Vec<Value>],
    relation: &Relation,
) -> Result<Option<Expr>> {
    if queries.is_empty() {
        return Err(PolicyError::Deny {
            table: table.to_string(),
        });
    }
    if queries.iter().any(Vec::is_empty) {
        return Ok(None);
    }

    let mut branches = Vec::with_capacity(queries.len());
    for query in queries {
        let conjuncts = query
            .iter()
            .map(|expr| expression(expr, table, relation))
            .collect::<Result<Vec<_>>>()?;
        branches.extend(all(conjuncts));
    }
    Ok(any(branches))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    NotEq,
    Compare(ComparisonOp),
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "eq" | "equal" => Self::Eq,
            "neq" => Self::NotEq,
            "lt" => Self::Compare(ComparisonOp::Lt),
            "lte" => Self::Compare(ComparisonOp::LtEq),
            "gt" => Self::Compare(ComparisonOp::Gt),
            "gte" => Self::Compare(ComparisonOp::GtEq),
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "contains" => Self::Contains,
            other => return Err(PolicyError::UnsupportedOperator(other.to_string())),
        })
    }
}

/// Translates one residual expression over `table`, qualifying the
/// column with `relation`.
pub fn expression(expr: &Value, table: &str, relation: &Relation) -> Result<Expr> {
    let terms = match expr {
        Value::Array(terms) => terms.as_slice(),
        Value::Object(call) => call
            .get("terms")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| malformed(expr, "expected a call"))?,
        _ => return Err(malformed(expr, "expected a call")),
    };
    let [operator, left, right] = terms else {
        return Err(malformed(expr, "expected three terms"));
    };

    let name = reference(operator)
        .and_then(|segments| segments.last())
        .and_then(|segment| segment.get("value"))
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(operator, "operator is not a reference"))?;
    let operator = Operator::parse(name)?;

    let (column, value, column_first) = match (
        data_column(left, table)?,
        data_column(right, table)?,
    ) {
        (Some(column), None) => (column, constant(right)?, true),
        (None, Some(column)) => (column, constant(left)?, false),
        (Some(_), Some(_)) => return Err(malformed(expr, "both operands reference data")),
        (None, None) => return Err(malformed(expr, "no operand references data")),
    };
    let column = relation.col(column);

    match operator {
        Operator::Eq if value.is_null() => Ok(column.is_null()),
        Operator::NotEq if value.is_null() => Ok(column.is_not_null()),
        Operator::Eq => Ok(column.eq(value)),
        Operator::NotEq => Ok(column.not_eq(value)),
        Operator::Compare(op) => {
            let op = if column_first { op } else { op.flipped() };
            Ok(Expr::Comparison {
                left: Box::new(column),
                op,
                right: Box::new(Expr::Literal(value)),
            })
        }
        Operator::StartsWith | Operator::EndsWith | Operator::Contains => {
            let SqlValue::Text(text) = value else {
                return Err(malformed(expr, "pattern operand must be a string"));
            };
            if !column_first {
                return Err(malformed(expr, "pattern operators need the column first"));
            }
            let text = escape_like(&text);
            let pattern = match operator {
                Operator::StartsWith => format!("{text}%"),
                Operator::EndsWith => format!("%{text}"),
                _ => format!("%{text}%"),
            };
            Ok(column.like(pattern).escape('\\'))
        }
    }
}

/// Backslash-escapes LIKE wildcards and the escape character itself.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn reference(term: &Value) -> Option<&Vec<Value>> {
    if term.get("type").and_then(Value::as_str) != Some("ref") {
        return None;
    }
    term.get("value").and_then(Value::as_array)
}

/// The column named by a `data.<table>.<column>` or
/// `data.<table>[_].<column>` reference, if `term` is one.
fn data_column<'a>(term: &'a Value, table: &str) -> Result<Option<&'a str>> {
    let Some(segments) = reference(term) else {
        return Ok(None);
    };
    let Some((head, rest)) = segments.split_first() else {
        return Ok(None);
    };
    if segment(head, "var") != Some("data") {
        return Ok(None);
    }

    let (named, column) = match rest {
        [named, column] | [named, _, column] => (named, column),
        _ => return Err(malformed(term, "expected data.<table>.<column>")),
    };
    match segment(named, "string") {
        Some(name) if name == table => {}
        Some(_) => return Err(malformed(term, &format!("reference is not into {table}"))),
        None => return Err(malformed(term, "reference names no table")),
    }
    segment(column, "string")
        .map(Some)
        .ok_or_else(|| malformed(term, "reference names no column"))
}

/// The value of a ref segment of the given `kind`.
fn segment<'a>(part: &'a Value, kind: &str) -> Option<&'a str> {
    if part.get("type").and_then(Value::as_str) != Some(kind) {
        return None;
    }
    part.get("value").and_then(Value::as_str)
}

fn constant(term: &Value) -> Result<SqlValue> {
    let value = term.get("value");
    let converted = match term.get("type").and_then(Value::as_str) {
        Some("string") => value
            .and_then(Value::as_str)
            .map(|text| SqlValue::Text(text.to_string())),
        Some("number") => value.and_then(|n| {
            n.as_i64()
                .map(SqlValue::Int)
                .or_else(|| n.as_f64().map(SqlValue::Float))
        }),
        Some("boolean") => value.and_then(Value::as_bool).map(SqlValue::Bool),
        Some("null") => Some(SqlValue::Null),
        _ => None,
    };
    converted.ok_or_else(|| malformed(term, "operand is not a constant"))
}

fn malformed(term: &Value, reason: &str) -> PolicyError {
    PolicyError::MalformedExpression(format!("{reason}: {term}"))
}
