//! Row-number pagination.
//!
//! DB2 has no `LIMIT` / `OFFSET` clause, so a window of rows is selected by numbering the rows
//! of the base statement with `ROW_NUMBER() OVER ()` and filtering on that number. Rows are
//! numbered in whatever order the engine evaluates the base statement; a caller that needs
//! stable pages must put an `ORDER BY` inside it.

use crate::sql::ParameterizedSql;
use serde::Deserialize;

/// The paging part of an ORM filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Maximum number of rows; `-1` (or unset) means unbounded.
    pub limit: Option<i64>,
    /// Number of leading rows to skip.
    pub offset: Option<i64>,
    /// Alias of `offset`, used when `offset` is unset.
    pub skip: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// The number of rows skipped before the window starts.
    pub fn effective_offset(&self) -> i64 {
        self.offset.or(self.skip).unwrap_or(0).max(0)
    }

    /// The window size, or `None` when the window is unbounded.
    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|limit| *limit >= 0)
    }
}

/// Rewrites `stmt` to return only the rows selected by `filter`.
///
/// The statement's parameters are carried over in order.
pub fn apply_pagination(stmt: ParameterizedSql, filter: &Filter) -> ParameterizedSql {
    let offset = filter.effective_offset();
    let (base, params) = stmt.into_parts();

    let mut sql = format!(
        "SELECT * FROM (SELECT ROW_NUMBER() OVER () AS rownum, src.* FROM ({}) AS src) AS paged WHERE rownum > {}",
        base, offset
    );

    if let Some(limit) = filter.effective_limit() {
        sql.push_str(&format!(" AND rownum <= {}", offset.saturating_add(limit)));
    }

    ParameterizedSql::new(sql, params)
}
