//! Portable rendering shared by every dialect.
//!
//! These are the default bodies of the [`Dialect`] visit methods. Each
//! function recurses through `d.visit_*` so dialect overrides are picked
//! up at any depth.

use crate::ast::{
    precedence, Aggregate, AggregateFunc, Assignment, ComparisonOp, ConflictAction, Cte,
    DeleteStatement, Expr, ExtractField, FrameBound, GroupingKind, GroupingSet, InfixOp,
    InsertSource, InsertStatement, Join, JoinKind, JoinSource, LockMode, NullOrdering,
    OnConflict, Ordering, Query, Relation, SelectCore, SetOperation, SetOperator, SqlValue,
    Statement, UnaryOp, UpdateStatement, WindowDefinition, WindowFrame, WindowSpec,
};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

use super::SqlWriter;

/// Operands of comparisons and other predicates bind at least this tight.
const COMPARAND: u8 = precedence::PREDICATE + 1;

pub fn statement<D: Dialect + ?Sized>(d: &D, stmt: &Statement, out: &mut SqlWriter) -> Result<()> {
    match stmt {
        Statement::Query(query) => d.visit_query(query, out),
        Statement::Insert(insert) => d.visit_insert(insert, out),
        Statement::Update(update) => d.visit_update(update, out),
        Statement::Delete(delete) => d.visit_delete(delete, out),
    }
}

pub fn query<D: Dialect + ?Sized>(d: &D, query: &Query, out: &mut SqlWriter) -> Result<()> {
    match query {
        Query::Select(core) => d.visit_select_core(core, out),
        Query::SetOperation(op) => d.visit_set_operation(op, out),
    }
}

pub fn set_operation<D: Dialect + ?Sized>(
    d: &D,
    op: &SetOperation,
    out: &mut SqlWriter,
) -> Result<()> {
    set_operand(d, &op.left, op.op, false, out)?;
    out.push(' ');
    out.write(op.op.as_str());
    out.push(' ');
    set_operand(d, &op.right, op.op, true, out)
}

fn set_operand<D: Dialect + ?Sized>(
    d: &D,
    operand: &Query,
    parent: SetOperator,
    right: bool,
    out: &mut SqlWriter,
) -> Result<()> {
    match operand {
        Query::Select(_) => {
            out.mark_set_op_branch();
            d.visit_query(operand, out)
        }
        Query::SetOperation(inner) => {
            let needs_parens = right || inner.op.precedence() < parent.precedence();
            if !needs_parens {
                return d.visit_query(operand, out);
            }
            if !d.parenthesize_set_operands() {
                if !right {
                    // Operators evaluate left to right here.
                    return d.visit_query(operand, out);
                }
                return Err(Error::malformed(format!(
                    "{} cannot nest a set operation on the right of {}",
                    d.name(),
                    parent.as_str()
                )));
            }
            out.push('(');
            d.visit_query(operand, out)?;
            out.push(')');
            Ok(())
        }
    }
}

pub fn select_core<D: Dialect + ?Sized>(
    d: &D,
    core: &SelectCore,
    out: &mut SqlWriter,
) -> Result<()> {
    let set_op_branch = out.take_set_op_branch();
    if core.from.is_none() && core.ctes.is_empty() && !set_op_branch {
        return Err(Error::malformed(
            "SELECT needs a FROM relation, a CTE or an enclosing set operation",
        ));
    }
    if core.distinct && !core.distinct_on.is_empty() {
        return Err(Error::malformed(
            "DISTINCT and DISTINCT ON are mutually exclusive",
        ));
    }

    let mut names = Vec::with_capacity(core.windows.len());
    for window in &core.windows {
        match &window.name {
            Some(name) => names.push(name.clone()),
            None => {
                return Err(Error::malformed(
                    "WINDOW clause entries must be named",
                ))
            }
        }
    }

    out.enter_window_scope(names);
    let result = select_clauses(d, core, out);
    out.exit_window_scope();
    result
}

fn select_clauses<D: Dialect + ?Sized>(
    d: &D,
    core: &SelectCore,
    out: &mut SqlWriter,
) -> Result<()> {
    if let Some(comment) = &core.comment {
        out.write("/* ");
        out.write(&neutralize_comment(comment));
        out.write(" */ ");
    }
    if !core.ctes.is_empty() {
        d.visit_ctes(&core.ctes, out)?;
        out.push(' ');
    }

    out.write("SELECT");
    if !core.hints.is_empty() {
        let hints: Vec<String> = core.hints.iter().map(|h| neutralize_comment(h)).collect();
        out.write(" /*+ ");
        out.write(&hints.join(" "));
        out.write(" */");
    }
    if core.distinct {
        out.write(" DISTINCT");
    } else if !core.distinct_on.is_empty() {
        out.push(' ');
        d.visit_distinct_on(&core.distinct_on, out)?;
    }

    out.push(' ');
    if core.projections.is_empty() {
        out.push('*');
    } else {
        projection_list(d, &core.projections, out)?;
    }

    if let Some(from) = &core.from {
        out.write(" FROM ");
        d.visit_relation(from, out)?;
    }
    for source in &core.joins {
        out.push(' ');
        match source {
            JoinSource::Join(join) => d.visit_join(join, out)?,
            JoinSource::Raw(text) => out.write(text),
        }
    }

    if !core.wheres.is_empty() {
        out.write(" WHERE ");
        conjunction(d, &core.wheres, out)?;
    }
    if !core.groups.is_empty() {
        out.write(" GROUP BY ");
        expr_list(d, &core.groups, out)?;
    }
    if !core.havings.is_empty() {
        out.write(" HAVING ");
        conjunction(d, &core.havings, out)?;
    }
    if !core.windows.is_empty() {
        out.write(" WINDOW ");
        for (i, window) in core.windows.iter().enumerate() {
            if i > 0 {
                out.write(", ");
            }
            out.write_identifier(d, window.name.as_deref().unwrap_or_default());
            out.write(" AS (");
            window_body(d, window, out)?;
            out.push(')');
        }
    }
    if !core.orders.is_empty() {
        out.write(" ORDER BY ");
        ordering_list(d, &core.orders, out)?;
    }

    check_row_count("LIMIT", core.limit.as_ref())?;
    check_row_count("OFFSET", core.offset.as_ref())?;
    d.visit_limit_offset(core.limit.as_ref(), core.offset.as_ref(), out)?;
    if let Some(lock) = core.lock {
        d.visit_lock(lock, core.skip_locked, out)?;
    }
    Ok(())
}

/// Breaks up comment delimiters so user text cannot close the comment.
fn neutralize_comment(text: &str) -> String {
    let mut safe = String::with_capacity(text.len());
    let mut prev = None;
    for ch in text.chars() {
        if matches!((prev, ch), (Some('*'), '/') | (Some('/'), '*')) {
            safe.push(' ');
        }
        safe.push(ch);
        prev = Some(ch);
    }
    safe
}

pub fn ctes<D: Dialect + ?Sized>(d: &D, ctes: &[Cte], out: &mut SqlWriter) -> Result<()> {
    if ctes.iter().any(|cte| cte.recursive) {
        out.write("WITH RECURSIVE ");
    } else {
        out.write("WITH ");
    }
    for (i, cte) in ctes.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        out.write_identifier(d, &cte.name);
        out.write(" AS (");
        d.visit_query(&cte.query, out)?;
        out.push(')');
    }
    Ok(())
}

pub fn relation<D: Dialect + ?Sized>(
    d: &D,
    relation: &Relation,
    out: &mut SqlWriter,
) -> Result<()> {
    match relation {
        Relation::Table(table) => {
            if let Some(schema) = &table.schema {
                out.write_identifier(d, schema);
                out.push('.');
            }
            out.write_identifier(d, &table.name);
        }
        Relation::Alias(alias) => {
            d.visit_relation(&alias.relation, out)?;
            out.write(" AS ");
            out.write_identifier(d, &alias.name);
        }
        Relation::Subquery(query) => {
            out.push('(');
            d.visit_query(query, out)?;
            out.push(')');
        }
    }
    Ok(())
}

pub fn join<D: Dialect + ?Sized>(d: &D, join: &Join, out: &mut SqlWriter) -> Result<()> {
    match (join.kind, &join.on) {
        (JoinKind::Cross, Some(_)) => {
            return Err(Error::malformed("CROSS JOIN cannot carry an ON predicate"))
        }
        (kind, None) if kind != JoinKind::Cross => {
            return Err(Error::malformed(format!(
                "{} requires an ON predicate",
                kind.as_str()
            )))
        }
        _ => {}
    }

    out.write(join.kind.as_str());
    out.push(' ');
    if join.lateral {
        out.write("LATERAL ");
    }
    d.visit_relation(&join.relation, out)?;
    if let Some(on) = &join.on {
        out.write(" ON ");
        d.visit_expr(on, out)?;
    }
    Ok(())
}

pub fn distinct_on<D: Dialect + ?Sized>(
    d: &D,
    exprs: &[Expr],
    out: &mut SqlWriter,
) -> Result<()> {
    if !d.supports_distinct_on() {
        return Err(Error::malformed(format!(
            "{} does not support DISTINCT ON",
            d.name()
        )));
    }
    out.write("DISTINCT ON (");
    expr_list(d, exprs, out)?;
    out.push(')');
    Ok(())
}

fn check_row_count(clause: &str, count: Option<&Expr>) -> Result<()> {
    match count {
        Some(Expr::Literal(SqlValue::Int(n)) | Expr::BindParam(SqlValue::Int(n))) if *n < 0 => {
            Err(Error::malformed(format!("{clause} must not be negative, got {n}")))
        }
        _ => Ok(()),
    }
}

pub fn limit_offset<D: Dialect + ?Sized>(
    d: &D,
    limit: Option<&Expr>,
    offset: Option<&Expr>,
    out: &mut SqlWriter,
) -> Result<()> {
    if let Some(limit) = limit {
        out.write(" LIMIT ");
        d.visit_expr(limit, out)?;
    }
    if let Some(offset) = offset {
        out.write(" OFFSET ");
        d.visit_expr(offset, out)?;
    }
    Ok(())
}

pub fn lock(lock: LockMode, skip_locked: bool, out: &mut SqlWriter) {
    out.push(' ');
    out.write(lock.as_str());
    if skip_locked {
        out.write(" SKIP LOCKED");
    }
}

// Expressions

pub fn expr<D: Dialect + ?Sized>(d: &D, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
    match expr {
        Expr::Attribute(attr) => {
            if let Some(qualifier) = attr.relation.as_ref().and_then(Relation::qualifier) {
                out.write_identifier(d, qualifier);
                out.push('.');
            }
            out.write_identifier(d, &attr.name);
        }
        Expr::Star(relation) => {
            if let Some(qualifier) = relation.as_ref().and_then(Relation::qualifier) {
                out.write_identifier(d, qualifier);
                out.push('.');
            }
            out.push('*');
        }
        Expr::Literal(value) => d.visit_literal(value, out)?,
        Expr::BindParam(value) => out.bind(d, value.clone()),
        Expr::InlineValue(value) => out.write(&d.inline_value(value)),
        Expr::SqlLiteral(text) => out.write(text),
        Expr::Comparison { left, op, right } => d.visit_comparison(left, *op, right, out)?,
        Expr::Unary { op, operand } => unary(d, *op, operand, out)?,
        Expr::Infix { left, op, right } => d.visit_infix(left, *op, right, out)?,
        Expr::And(items) => {
            if items.is_empty() {
                return Err(Error::malformed("AND node without operands"));
            }
            conjunction(d, items, out)?;
        }
        Expr::Or(..) => {
            out.push('(');
            disjunction(d, expr, out)?;
            out.push(')');
        }
        Expr::Grouping(inner) => {
            if matches!(inner.as_ref(), Expr::Or(..)) {
                d.visit_expr(inner, out)?;
            } else {
                out.push('(');
                d.visit_expr(inner, out)?;
                out.push(')');
            }
        }
        Expr::IsNull { expr, negated } => {
            operand(d, expr, COMPARAND, out)?;
            out.write(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        Expr::IsDistinctFrom {
            left,
            right,
            negated,
        } => d.visit_is_distinct_from(left, right, *negated, out)?,
        Expr::In {
            expr,
            list,
            negated,
        } => {
            if list.is_empty() {
                return Err(Error::malformed("IN list is empty"));
            }
            operand(d, expr, COMPARAND, out)?;
            out.write(if *negated { " NOT IN (" } else { " IN (" });
            expr_list(d, list, out)?;
            out.push(')');
        }
        Expr::InQuery {
            expr,
            query,
            negated,
        } => {
            operand(d, expr, COMPARAND, out)?;
            out.write(if *negated { " NOT IN (" } else { " IN (" });
            d.visit_query(query, out)?;
            out.push(')');
        }
        Expr::Exists { query, negated } => {
            out.write(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
            d.visit_query(query, out)?;
            out.push(')');
        }
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            operand(d, expr, COMPARAND, out)?;
            out.write(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
            operand(d, low, COMPARAND, out)?;
            out.write(" AND ");
            operand(d, high, COMPARAND, out)?;
        }
        Expr::Like {
            expr,
            pattern,
            negated,
            case_insensitive,
            escape,
        } => like(d, expr, pattern, *negated, *case_insensitive, *escape, out)?,
        Expr::Regex {
            expr,
            pattern,
            negated,
            case_insensitive,
        } => {
            operand(d, expr, COMPARAND, out)?;
            out.push(' ');
            out.write(d.regex_operator(*negated, *case_insensitive));
            out.push(' ');
            operand(d, pattern, COMPARAND, out)?;
        }
        Expr::Aggregate(aggregate) => d.visit_aggregate(aggregate, out)?,
        Expr::Function(function) => {
            out.write(&function.name);
            out.push('(');
            if function.distinct {
                out.write("DISTINCT ");
            }
            expr_list(d, &function.args, out)?;
            out.push(')');
        }
        Expr::Window(function) => {
            out.write(function.func.as_str());
            out.push('(');
            expr_list(d, &function.args, out)?;
            out.push(')');
        }
        Expr::Over { function, window } => over(d, function, window, out)?,
        Expr::Case(case) => {
            if case.whens.is_empty() {
                return Err(Error::malformed("CASE without WHEN branches"));
            }
            out.write("CASE");
            if let Some(operand) = &case.operand {
                out.push(' ');
                d.visit_expr(operand, out)?;
            }
            for (condition, result) in &case.whens {
                out.write(" WHEN ");
                d.visit_expr(condition, out)?;
                out.write(" THEN ");
                d.visit_expr(result, out)?;
            }
            if let Some(otherwise) = &case.otherwise {
                out.write(" ELSE ");
                d.visit_expr(otherwise, out)?;
            }
            out.write(" END");
        }
        Expr::Cast { expr, type_name } => {
            out.write("CAST(");
            d.visit_expr(expr, out)?;
            out.write(" AS ");
            out.write(type_name);
            out.push(')');
        }
        Expr::Extract { field, expr } => d.visit_extract(*field, expr, out)?,
        Expr::GroupingSet(set) => d.visit_grouping_set(set, out)?,
        Expr::Alias { expr, name } => {
            operand(d, expr, precedence::ALIAS + 1, out)?;
            out.write(" AS ");
            out.write_identifier(d, name);
        }
        Expr::Subquery(query) => {
            out.push('(');
            d.visit_query(query, out)?;
            out.push(')');
        }
        Expr::Excluded(column) => d.visit_excluded(column, out)?,
    }
    Ok(())
}

/// Renders `expr`, parenthesised when it binds looser than `min`.
pub fn operand<D: Dialect + ?Sized>(
    d: &D,
    expr: &Expr,
    min: u8,
    out: &mut SqlWriter,
) -> Result<()> {
    if expr.precedence() < min {
        out.push('(');
        d.visit_expr(expr, out)?;
        out.push(')');
        Ok(())
    } else {
        d.visit_expr(expr, out)
    }
}

/// Comma-separated expressions.
pub fn expr_list<D: Dialect + ?Sized>(
    d: &D,
    exprs: &[Expr],
    out: &mut SqlWriter,
) -> Result<()> {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        operand(d, expr, precedence::ALIAS + 1, out)?;
    }
    Ok(())
}

/// Comma-separated projections; aliases are allowed at the top level.
fn projection_list<D: Dialect + ?Sized>(
    d: &D,
    exprs: &[Expr],
    out: &mut SqlWriter,
) -> Result<()> {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        d.visit_expr(expr, out)?;
    }
    Ok(())
}

/// Predicates joined with AND.
pub fn conjunction<D: Dialect + ?Sized>(
    d: &D,
    predicates: &[Expr],
    out: &mut SqlWriter,
) -> Result<()> {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            out.write(" AND ");
        }
        operand(d, predicate, precedence::AND, out)?;
    }
    Ok(())
}

/// The inside of an OR chain, without the surrounding parentheses.
fn disjunction<D: Dialect + ?Sized>(d: &D, expr: &Expr, out: &mut SqlWriter) -> Result<()> {
    match expr {
        Expr::Or(left, right) => {
            disjunction(d, left, out)?;
            out.write(" OR ");
            disjunction(d, right, out)
        }
        other => operand(d, other, precedence::AND, out),
    }
}

pub fn literal<D: Dialect + ?Sized>(d: &D, value: &SqlValue, out: &mut SqlWriter) {
    if out.is_parameterised() {
        out.bind(d, value.clone());
    } else {
        out.write(&d.inline_value(value));
    }
}

pub fn comparison<D: Dialect + ?Sized>(
    d: &D,
    left: &Expr,
    op: ComparisonOp,
    right: &Expr,
    out: &mut SqlWriter,
) -> Result<()> {
    operand(d, left, COMPARAND, out)?;
    out.push(' ');
    out.write(op.as_str());
    out.push(' ');
    operand(d, right, COMPARAND, out)
}

pub fn infix<D: Dialect + ?Sized>(
    d: &D,
    left: &Expr,
    op: InfixOp,
    right: &Expr,
    out: &mut SqlWriter,
) -> Result<()> {
    infix_operand(d, left, op, false, out)?;
    out.push(' ');
    out.write(d.infix_operator(op));
    out.push(' ');
    infix_operand(d, right, op, true, out)
}

fn infix_operand<D: Dialect + ?Sized>(
    d: &D,
    child: &Expr,
    parent: InfixOp,
    right: bool,
    out: &mut SqlWriter,
) -> Result<()> {
    let needs_parens = match child {
        Expr::Case(_) => true,
        Expr::Infix { op, .. } => {
            let child_prec = d.infix_precedence(*op);
            let parent_prec = d.infix_precedence(parent);
            child_prec < parent_prec
                || (child_prec == parent_prec
                    && (*op != parent || (right && !parent.is_associative())))
        }
        other => other.precedence() < d.infix_precedence(parent),
    };
    if needs_parens {
        out.push('(');
        d.visit_expr(child, out)?;
        out.push(')');
        Ok(())
    } else {
        d.visit_expr(child, out)
    }
}

fn unary<D: Dialect + ?Sized>(
    d: &D,
    op: UnaryOp,
    operand_expr: &Expr,
    out: &mut SqlWriter,
) -> Result<()> {
    match op {
        UnaryOp::Not => {
            out.write("NOT ");
            operand(d, operand_expr, precedence::NOT, out)
        }
        UnaryOp::BitNot | UnaryOp::Neg => {
            out.push(if op == UnaryOp::BitNot { '~' } else { '-' });
            let bare = matches!(
                operand_expr,
                Expr::Attribute(_)
                    | Expr::BindParam(_)
                    | Expr::Function(_)
                    | Expr::Aggregate(_)
                    | Expr::Cast { .. }
                    | Expr::Grouping(_)
                    | Expr::Subquery(_)
            );
            if bare {
                d.visit_expr(operand_expr, out)
            } else {
                out.push('(');
                d.visit_expr(operand_expr, out)?;
                out.push(')');
                Ok(())
            }
        }
    }
}

pub fn is_distinct_from<D: Dialect + ?Sized>(
    d: &D,
    left: &Expr,
    right: &Expr,
    negated: bool,
    out: &mut SqlWriter,
) -> Result<()> {
    operand(d, left, COMPARAND, out)?;
    out.write(if negated {
        " IS NOT DISTINCT FROM "
    } else {
        " IS DISTINCT FROM "
    });
    operand(d, right, COMPARAND, out)
}

fn like<D: Dialect + ?Sized>(
    d: &D,
    expr: &Expr,
    pattern: &Expr,
    negated: bool,
    case_insensitive: bool,
    escape: Option<char>,
    out: &mut SqlWriter,
) -> Result<()> {
    let native = case_insensitive && d.supports_ilike();
    let lowered = case_insensitive && !native;

    let side = |e: &Expr, out: &mut SqlWriter| -> Result<()> {
        if lowered {
            out.write("LOWER(");
            d.visit_expr(e, out)?;
            out.push(')');
            Ok(())
        } else {
            operand(d, e, COMPARAND, out)
        }
    };

    side(expr, out)?;
    out.write(match (negated, native) {
        (false, false) => " LIKE ",
        (true, false) => " NOT LIKE ",
        (false, true) => " ILIKE ",
        (true, true) => " NOT ILIKE ",
    });
    side(pattern, out)?;
    if let Some(ch) = escape {
        out.write(" ESCAPE ");
        out.write(&d.inline_value(&SqlValue::Text(ch.to_string())));
    }
    Ok(())
}

pub fn aggregate<D: Dialect + ?Sized>(
    d: &D,
    aggregate: &Aggregate,
    out: &mut SqlWriter,
) -> Result<()> {
    aggregate_call(d, aggregate, out)?;
    if let Some(filter) = &aggregate.filter {
        out.write(" FILTER (WHERE ");
        d.visit_expr(filter, out)?;
        out.push(')');
    }
    Ok(())
}

/// `FUNC([DISTINCT ]arg)` without the FILTER clause.
pub fn aggregate_call<D: Dialect + ?Sized>(
    d: &D,
    aggregate: &Aggregate,
    out: &mut SqlWriter,
) -> Result<()> {
    check_star_argument(aggregate)?;
    out.write(aggregate.func.as_str());
    out.push('(');
    if aggregate.distinct {
        out.write("DISTINCT ");
    }
    match &aggregate.expr {
        Some(expr) => d.visit_expr(expr, out)?,
        None => out.push('*'),
    }
    out.push(')');
    Ok(())
}

/// Only `COUNT(*)` may omit its argument, and never with DISTINCT.
pub fn check_star_argument(aggregate: &Aggregate) -> Result<()> {
    if aggregate.expr.is_some() {
        return Ok(());
    }
    if aggregate.func != AggregateFunc::Count {
        return Err(Error::malformed(format!(
            "{}(*) is not a valid aggregate",
            aggregate.func.as_str()
        )));
    }
    if aggregate.distinct {
        return Err(Error::malformed("COUNT(DISTINCT *) is not valid"));
    }
    Ok(())
}

fn over<D: Dialect + ?Sized>(
    d: &D,
    function: &Expr,
    window: &WindowSpec,
    out: &mut SqlWriter,
) -> Result<()> {
    d.visit_expr(function, out)?;
    out.write(" OVER ");
    match window {
        WindowSpec::Named(name) => {
            if !out.window_in_scope(name) {
                return Err(Error::malformed(format!(
                    "window \"{name}\" is not declared in the WINDOW clause"
                )));
            }
            out.write_identifier(d, name);
        }
        WindowSpec::Inline(definition) => {
            out.push('(');
            window_body(d, definition, out)?;
            out.push(')');
        }
    }
    Ok(())
}

/// Partition, order and frame of a window, space-separated.
pub fn window_body<D: Dialect + ?Sized>(
    d: &D,
    window: &WindowDefinition,
    out: &mut SqlWriter,
) -> Result<()> {
    let mut wrote = false;
    if !window.partition_by.is_empty() {
        out.write("PARTITION BY ");
        expr_list(d, &window.partition_by, out)?;
        wrote = true;
    }
    if !window.order_by.is_empty() {
        if wrote {
            out.push(' ');
        }
        out.write("ORDER BY ");
        ordering_list(d, &window.order_by, out)?;
        wrote = true;
    }
    if let Some(frame) = &window.frame {
        if wrote {
            out.push(' ');
        }
        window_frame(frame, out)?;
    }
    Ok(())
}

fn window_frame(frame: &WindowFrame, out: &mut SqlWriter) -> Result<()> {
    if frame.start == FrameBound::UnboundedFollowing {
        return Err(Error::malformed(
            "a window frame cannot start at UNBOUNDED FOLLOWING",
        ));
    }
    if frame.end == Some(FrameBound::UnboundedPreceding) {
        return Err(Error::malformed(
            "a window frame cannot end at UNBOUNDED PRECEDING",
        ));
    }
    out.write(frame.units.as_str());
    out.push(' ');
    match frame.end {
        Some(end) => {
            out.write("BETWEEN ");
            out.write(&frame.start.to_sql());
            out.write(" AND ");
            out.write(&end.to_sql());
        }
        None => out.write(&frame.start.to_sql()),
    }
    Ok(())
}

fn ordering_list<D: Dialect + ?Sized>(
    d: &D,
    orderings: &[Ordering],
    out: &mut SqlWriter,
) -> Result<()> {
    for (i, ordering) in orderings.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        d.visit_ordering(ordering, out)?;
    }
    Ok(())
}

pub fn ordering<D: Dialect + ?Sized>(
    d: &D,
    ordering: &Ordering,
    out: &mut SqlWriter,
) -> Result<()> {
    operand(d, &ordering.expr, precedence::ALIAS + 1, out)?;
    out.push(' ');
    out.write(ordering.direction.as_str());
    if ordering.nulls != NullOrdering::Default {
        out.push(' ');
        out.write(ordering.nulls.as_str());
    }
    Ok(())
}

pub fn extract<D: Dialect + ?Sized>(
    d: &D,
    field: ExtractField,
    expr: &Expr,
    out: &mut SqlWriter,
) -> Result<()> {
    out.write("EXTRACT(");
    out.write(field.as_str());
    out.write(" FROM ");
    d.visit_expr(expr, out)?;
    out.push(')');
    Ok(())
}

pub fn grouping_set<D: Dialect + ?Sized>(
    d: &D,
    set: &GroupingSet,
    out: &mut SqlWriter,
) -> Result<()> {
    if set.sets.is_empty() {
        return Err(Error::malformed(format!(
            "{} needs at least one grouping element",
            set.kind.as_str()
        )));
    }
    out.write(set.kind.as_str());
    out.push('(');
    for (i, element) in set.sets.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        match element.as_slice() {
            [] if set.kind == GroupingKind::GroupingSets => out.write("()"),
            [] => {
                return Err(Error::malformed(format!(
                    "empty grouping element inside {}",
                    set.kind.as_str()
                )))
            }
            [single] => operand(d, single, precedence::ALIAS + 1, out)?,
            many => {
                out.push('(');
                expr_list(d, many, out)?;
                out.push(')');
            }
        }
    }
    out.push(')');
    Ok(())
}

// Data modification

fn dml_target<D: Dialect + ?Sized>(
    d: &D,
    table: &Relation,
    statement: &str,
    out: &mut SqlWriter,
) -> Result<()> {
    if table.base_table().is_none() {
        return Err(Error::malformed(format!(
            "{statement} target must be a table"
        )));
    }
    d.visit_relation(table, out)
}

pub fn insert<D: Dialect + ?Sized>(
    d: &D,
    stmt: &InsertStatement,
    out: &mut SqlWriter,
) -> Result<()> {
    if !stmt.ctes.is_empty() {
        d.visit_ctes(&stmt.ctes, out)?;
        out.push(' ');
    }
    out.write(d.insert_keyword(stmt));
    out.push(' ');
    dml_target(d, &stmt.table, "INSERT", out)?;
    if !stmt.columns.is_empty() {
        out.write(" (");
        identifier_list(d, &stmt.columns, out);
        out.push(')');
    }

    match &stmt.source {
        InsertSource::Values(rows) => {
            check_row_widths(stmt.columns.len(), rows)?;
            out.write(" VALUES ");
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    out.write(", ");
                }
                out.push('(');
                expr_list(d, row, out)?;
                out.push(')');
            }
        }
        InsertSource::Query(query) => {
            out.push(' ');
            d.visit_query(query, out)?;
        }
        InsertSource::DefaultValues => {
            if !stmt.columns.is_empty() {
                return Err(Error::malformed(
                    "INSERT with a column list needs values",
                ));
            }
            out.push(' ');
            out.write(d.default_values_clause());
        }
    }

    if let Some(on_conflict) = &stmt.on_conflict {
        d.visit_on_conflict(on_conflict, out)?;
    }
    if !stmt.returning.is_empty() {
        d.visit_returning(&stmt.returning, out)?;
    }
    Ok(())
}

/// Every row must have the same width, matching the column list if any.
fn check_row_widths(columns: usize, rows: &[Vec<Expr>]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Err(Error::malformed("INSERT VALUES without rows"));
    };
    let width = if columns > 0 { columns } else { first.len() };
    if width == 0 {
        return Err(Error::malformed("INSERT row without values"));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(Error::malformed(format!(
                "INSERT row {i} has {} values, expected {width}",
                row.len()
            )));
        }
    }
    Ok(())
}

pub fn on_conflict<D: Dialect + ?Sized>(
    d: &D,
    on_conflict: &OnConflict,
    out: &mut SqlWriter,
) -> Result<()> {
    out.write(" ON CONFLICT");
    if !on_conflict.target.is_empty() {
        out.write(" (");
        identifier_list(d, &on_conflict.target, out);
        out.push(')');
    }
    match &on_conflict.action {
        ConflictAction::DoNothing => out.write(" DO NOTHING"),
        ConflictAction::DoUpdate(assignments) => {
            if on_conflict.target.is_empty() {
                return Err(Error::malformed(
                    "ON CONFLICT DO UPDATE requires a conflict target",
                ));
            }
            out.write(" DO UPDATE SET ");
            assignment_list(d, assignments, out)?;
        }
    }
    Ok(())
}

pub fn update<D: Dialect + ?Sized>(
    d: &D,
    stmt: &UpdateStatement,
    out: &mut SqlWriter,
) -> Result<()> {
    if stmt.assignments.is_empty() {
        return Err(Error::malformed("UPDATE without SET assignments"));
    }
    if !stmt.ctes.is_empty() {
        d.visit_ctes(&stmt.ctes, out)?;
        out.push(' ');
    }
    out.write("UPDATE ");
    dml_target(d, &stmt.table, "UPDATE", out)?;
    out.write(" SET ");
    assignment_list(d, &stmt.assignments, out)?;
    if !stmt.wheres.is_empty() {
        out.write(" WHERE ");
        conjunction(d, &stmt.wheres, out)?;
    }
    if !stmt.returning.is_empty() {
        d.visit_returning(&stmt.returning, out)?;
    }
    Ok(())
}

pub fn delete<D: Dialect + ?Sized>(
    d: &D,
    stmt: &DeleteStatement,
    out: &mut SqlWriter,
) -> Result<()> {
    if !stmt.ctes.is_empty() {
        d.visit_ctes(&stmt.ctes, out)?;
        out.push(' ');
    }
    out.write("DELETE FROM ");
    dml_target(d, &stmt.table, "DELETE", out)?;
    if !stmt.wheres.is_empty() {
        out.write(" WHERE ");
        conjunction(d, &stmt.wheres, out)?;
    }
    if !stmt.returning.is_empty() {
        d.visit_returning(&stmt.returning, out)?;
    }
    Ok(())
}

pub fn returning<D: Dialect + ?Sized>(
    d: &D,
    exprs: &[Expr],
    out: &mut SqlWriter,
) -> Result<()> {
    if !d.supports_returning() {
        return Err(Error::malformed(format!(
            "{} does not support RETURNING",
            d.name()
        )));
    }
    out.write(" RETURNING ");
    projection_list(d, exprs, out)
}

fn identifier_list<D: Dialect + ?Sized>(d: &D, names: &[String], out: &mut SqlWriter) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        out.write_identifier(d, name);
    }
}

pub fn assignment_list<D: Dialect + ?Sized>(
    d: &D,
    assignments: &[Assignment],
    out: &mut SqlWriter,
) -> Result<()> {
    for (i, assignment) in assignments.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        out.write_identifier(d, &assignment.column);
        out.write(" = ");
        operand(d, &assignment.value, precedence::ALIAS + 1, out)?;
    }
    Ok(())
}
