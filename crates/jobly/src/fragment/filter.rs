use super::{FilterMap, SqlFragment};
use crate::column::ColumnName;
use crate::error::{JoblyError, JoblyResult};
use crate::value::SqlValue;

/// Filter vocabulary for one searchable table.
///
/// Recognized filter names:
/// - `search_key` (exact): case-insensitive substring match on `search_column`
/// - `min*`: `bound_column >= value`
/// - `max*`: `bound_column <= value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterColumns {
    search_key: String,
    search_column: ColumnName,
    bound_column: ColumnName,
}

enum FilterKind {
    Search,
    Min,
    Max,
}

impl FilterColumns {
    pub fn new(search_key: &str, search_column: &str, bound_column: &str) -> JoblyResult<Self> {
        if search_key.is_empty() {
            return Err(JoblyError::invalid_input("Empty search key"));
        }
        Ok(Self {
            search_key: search_key.to_string(),
            search_column: ColumnName::parse(search_column)?,
            bound_column: ColumnName::parse(bound_column)?,
        })
    }

    /// `name` substring search and `num_employees` bounds.
    pub fn companies() -> Self {
        Self {
            search_key: "name".to_string(),
            search_column: ColumnName::known("name"),
            bound_column: ColumnName::known("num_employees"),
        }
    }

    /// `title` substring search and `salary` bounds.
    pub fn jobs() -> Self {
        Self {
            search_key: "title".to_string(),
            search_column: ColumnName::known("title"),
            bound_column: ColumnName::known("salary"),
        }
    }

    fn classify(&self, name: &str) -> Option<FilterKind> {
        if name == self.search_key {
            Some(FilterKind::Search)
        } else if name.starts_with("min") {
            Some(FilterKind::Min)
        } else if name.starts_with("max") {
            Some(FilterKind::Max)
        } else {
            None
        }
    }

    /// Build a `WHERE` clause body (without the keyword) from `filters`.
    ///
    /// Conditions are joined with `AND` in the mapping's order. The search value
    /// is bound as `%value%`; the clause itself never contains wildcards. An
    /// empty mapping yields an empty fragment.
    ///
    /// # Errors
    ///
    /// [`JoblyError::InvalidInput`] for an unrecognized filter name, a bound
    /// that is not numeric, or a search value that is not a scalar.
    pub fn build(&self, filters: &FilterMap) -> JoblyResult<SqlFragment> {
        let mut fragment = SqlFragment {
            clause: String::new(),
            values: Vec::with_capacity(filters.len()),
        };

        for (name, raw) in filters {
            let kind = self
                .classify(name)
                .ok_or_else(|| JoblyError::invalid_input(format!("Unknown filter: {name}")))?;
            let value = SqlValue::from(raw);

            let (column, op, bound) = match kind {
                FilterKind::Search => {
                    let text = value.as_text().ok_or_else(|| {
                        JoblyError::invalid_input(format!("Filter '{name}' must be a string"))
                    })?;
                    (&self.search_column, " ILIKE ", SqlValue::Text(format!("%{text}%")))
                }
                FilterKind::Min | FilterKind::Max if !value.is_numeric() => {
                    return Err(JoblyError::invalid_input(format!(
                        "Filter '{name}' must be numeric"
                    )));
                }
                FilterKind::Min => (&self.bound_column, " >= ", value),
                FilterKind::Max => (&self.bound_column, " <= ", value),
            };

            if !fragment.values.is_empty() {
                fragment.clause.push_str(" AND ");
            }
            let index = fragment.next_index();
            column.write_placeholder(&mut fragment.clause, op, index);
            fragment.values.push(bound);
        }

        Ok(fragment)
    }
}

/// Build a companies `WHERE` clause body from query-string filters.
///
/// See [`FilterColumns::build`] and [`FilterColumns::companies`].
pub fn build_filter_clause(filters: &FilterMap) -> JoblyResult<SqlFragment> {
    FilterColumns::companies().build(filters)
}
