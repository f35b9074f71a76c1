//! Parameterized SQL statements.

use crate::db2::Db2Value;
use std::fmt::{self, Display, Formatter};

/// SQL text with `?` placeholders, and the values bound to them in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterizedSql {
    pub(crate) sql: String,
    pub(crate) params: Vec<Db2Value>,
}

impl ParameterizedSql {
    pub fn new(sql: impl Into<String>, params: Vec<Db2Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Db2Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Db2Value>) {
        (self.sql, self.params)
    }

    /// Binds one more value, to be referenced by a placeholder in the text.
    pub fn bind(mut self, value: impl Into<Db2Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Appends `other` after a single space, keeping parameter order.
    pub fn merge(mut self, other: impl Into<ParameterizedSql>) -> Self {
        let other = other.into();
        if other.sql.is_empty() {
            return self;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    /// Joins statements with `separator`, concatenating their parameters in order.
    pub fn join<I>(parts: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = ParameterizedSql>,
    {
        let mut joined = ParameterizedSql::default();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined.sql.push_str(separator);
            }
            joined.sql.push_str(&part.sql);
            joined.params.extend(part.params);
        }
        joined
    }

    /// Number of `?` markers outside of quoted literals and identifiers.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut quote = None;
        for c in self.sql.chars() {
            match (quote, c) {
                (None, '\'' | '"') => quote = Some(c),
                (Some(q), c) if q == c => quote = None,
                (None, '?') => count += 1,
                _ => {}
            }
        }
        count
    }
}

impl From<String> for ParameterizedSql {
    fn from(sql: String) -> Self {
        ParameterizedSql::new(sql, Vec::new())
    }
}

impl From<&str> for ParameterizedSql {
    fn from(sql: &str) -> Self {
        ParameterizedSql::new(sql, Vec::new())
    }
}

impl Display for ParameterizedSql {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_parameter_order() {
        let stmt = ParameterizedSql::new("SELECT * FROM T WHERE A = ?", vec![1.into()])
            .merge(ParameterizedSql::new("AND B = ?", vec!["x".into()]));

        assert_eq!(stmt.sql(), "SELECT * FROM T WHERE A = ? AND B = ?");
        assert_eq!(stmt.params(), &[Db2Value::Int(1), Db2Value::Text("x".into())]);
    }

    #[test]
    fn merge_skips_empty_fragments() {
        let stmt = ParameterizedSql::from("SELECT 1 FROM sysibm.sysdummy1").merge("");
        assert_eq!(stmt.sql(), "SELECT 1 FROM sysibm.sysdummy1");
    }

    #[test]
    fn join_concatenates_params() {
        let stmt = ParameterizedSql::join(
            vec![
                ParameterizedSql::new("A = ?", vec![1.into()]),
                ParameterizedSql::new("B = ?", vec![2.into()]),
            ],
            " AND ",
        );

        assert_eq!(stmt.sql(), "A = ? AND B = ?");
        assert_eq!(stmt.params(), &[Db2Value::Int(1), Db2Value::Int(2)]);
    }

    #[test]
    fn placeholders_inside_literals_are_ignored() {
        let stmt = ParameterizedSql::from("SELECT '?' , \"a?\" FROM T WHERE X = ? AND Y = ?");
        assert_eq!(stmt.placeholder_count(), 2);
    }
}
