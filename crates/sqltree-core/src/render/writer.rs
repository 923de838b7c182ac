//! Output buffer threaded through a single render.

use crate::ast::SqlValue;
use crate::dialect::Dialect;

/// Accumulates SQL text and captured parameters for one render call.
///
/// Besides the text the writer tracks two pieces of traversal state: the
/// named windows declared by each enclosing SELECT, and whether the next
/// SELECT core is a set-operation branch (which may omit FROM).
#[derive(Debug)]
pub struct SqlWriter {
    sql: String,
    params: Vec<SqlValue>,
    parameterised: bool,
    windows: Vec<Vec<String>>,
    set_op_branch: bool,
}

impl SqlWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new(parameterised: bool) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            parameterised,
            windows: Vec::new(),
            set_op_branch: false,
        }
    }

    /// Appends raw SQL text.
    pub fn write(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Appends a single character.
    pub fn push(&mut self, ch: char) {
        self.sql.push(ch);
    }

    /// Appends a quoted identifier.
    pub fn write_identifier(&mut self, dialect: &(impl Dialect + ?Sized), name: &str) {
        let quoted = dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Captures `value` and writes its placeholder.
    pub fn bind(&mut self, dialect: &(impl Dialect + ?Sized), value: SqlValue) {
        self.params.push(value);
        let placeholder = dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Whether literals are captured as parameters.
    #[must_use]
    pub const fn is_parameterised(&self) -> bool {
        self.parameterised
    }

    /// Number of parameters captured so far.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// SQL written so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn enter_window_scope(&mut self, names: Vec<String>) {
        self.windows.push(names);
    }

    pub(crate) fn exit_window_scope(&mut self) {
        self.windows.pop();
    }

    /// Whether `name` is declared in the WINDOW clause of the innermost
    /// SELECT being rendered.
    #[must_use]
    pub fn window_in_scope(&self, name: &str) -> bool {
        self.windows
            .last()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    pub(crate) fn mark_set_op_branch(&mut self) {
        self.set_op_branch = true;
    }

    /// Reads and clears the set-operation flag, so nested subqueries do
    /// not inherit it.
    pub(crate) fn take_set_op_branch(&mut self) -> bool {
        std::mem::take(&mut self.set_op_branch)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_bind_numbers_postgres_placeholders() {
        let mut out = SqlWriter::new(true);
        out.bind(&Postgres, SqlValue::Int(1));
        out.write(", ");
        out.bind(&Postgres, SqlValue::Int(2));
        assert_eq!(out.sql(), "$1, $2");
        assert_eq!(out.param_count(), 2);
    }

    #[test]
    fn test_bind_question_marks_sqlite() {
        let mut out = SqlWriter::new(true);
        out.bind(&Sqlite, SqlValue::Int(1));
        out.bind(&Sqlite, SqlValue::Int(2));
        let (sql, params) = out.into_parts();
        assert_eq!(sql, "??");
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_window_scope_is_innermost_only() {
        let mut out = SqlWriter::new(false);
        assert!(!out.window_in_scope("w"));
        out.enter_window_scope(vec![String::from("w")]);
        assert!(out.window_in_scope("w"));
        out.enter_window_scope(Vec::new());
        assert!(!out.window_in_scope("w"));
        out.exit_window_scope();
        assert!(out.window_in_scope("w"));
    }

    #[test]
    fn test_set_op_flag_is_consumed() {
        let mut out = SqlWriter::new(false);
        out.mark_set_op_branch();
        assert!(out.take_set_op_branch());
        assert!(!out.take_set_op_branch());
    }
}
