//! Parameterized SQL fragments.
//!
//! A [`SqlFragment`] is a piece of SQL text carrying `$1, $2, ...` placeholders
//! together with the values bound to them, in order. The builders in this module
//! turn sparse, caller-supplied mappings into fragments:
//!
//! - [`build_partial_update`]: `{"numEmployees": 10}` → `"num_employees"=$1`
//! - [`build_filter_clause`]: `{"name": "gree"}` → `name ILIKE $1` bound to `%gree%`
//!
//! The model layer splices the clause into a full statement and keeps
//! numbering from [`SqlFragment::next_index`].
//!
//! ```ignore
//! let set = build_partial_update(&fields, &aliases)?;
//! let sql = format!(
//!     "UPDATE companies SET {} WHERE handle = ${}",
//!     set.clause,
//!     set.next_index()
//! );
//! let mut params = set.params_ref();
//! params.push(&handle);
//! conn.execute(&sql, &params).await?;
//! ```

mod filter;
mod partial_update;


pub use filter::{FilterColumns, build_filter_clause};
pub use partial_update::build_partial_update;

use crate::value::SqlValue;
use std::collections::BTreeMap;
use tokio_postgres::types::ToSql;

/// Ordered field mapping for partial updates (`key → new value`).
///
/// `serde_json` is built with `preserve_order`, so iteration follows insertion
/// order and placeholder numbering is reproducible.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Ordered filter mapping (`filter name → raw value`).
pub type FilterMap = serde_json::Map<String, serde_json::Value>;

/// A SQL clause and the values for its positional placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    /// Clause text with `$1..$N` placeholders.
    pub clause: String,
    /// `values[i]` binds to `$(i + 1)`.
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    /// An empty clause with no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// The placeholder index the next appended parameter should use.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }

    /// Render as ` WHERE <clause>`, or `""` when there is nothing to filter on.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clause)
        }
    }

    /// AND a parameterless condition onto the clause.
    pub fn and_raw(&mut self, condition: &str) -> &mut Self {
        if !self.clause.is_empty() {
            self.clause.push_str(" AND ");
        }
        self.clause.push_str(condition);
        self
    }
}

/// Mapping from logical (request) keys to storage column names.
///
/// Keys without an entry map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAliases {
    map: BTreeMap<String, String>,
}

impl ColumnAliases {
    /// No aliases: every key is its own column.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<K, C>(pairs: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: Into<String>,
        C: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Column name for `key`.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.map.get(key).map(String::as_str).unwrap_or(key)
    }
}

impl<K: Into<String>, C: Into<String>> FromIterator<(K, C)> for ColumnAliases {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(k, c)| (k.into(), c.into()))
                .collect(),
        }
    }
}
