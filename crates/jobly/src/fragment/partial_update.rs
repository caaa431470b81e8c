use super::{ColumnAliases, FieldMap, SqlFragment};
use crate::column::ColumnName;
use crate::error::{JoblyError, JoblyResult};
use crate::value::SqlValue;

/// Build the body of a `SET` clause from the fields a caller wants to change.
///
/// Each entry becomes `"column"=$N`, joined by `", "`, where `column` is the
/// aliased name of the key (or the key itself). Values keep the mapping's
/// order, so `$N` binds to `values[N - 1]`.
///
/// # Errors
///
/// [`JoblyError::InvalidInput`] if `fields` is empty or a column name cannot
/// be quoted.
///
/// # Example
/// ```ignore
/// let aliases = ColumnAliases::new([("firstName", "first_name"), ("lastName", "last_name")]);
/// let set = build_partial_update(&fields, &aliases)?;
/// assert_eq!(set.clause, r#""first_name"=$1, "last_name"=$2"#);
/// ```
pub fn build_partial_update(fields: &FieldMap, aliases: &ColumnAliases) -> JoblyResult<SqlFragment> {
    if fields.is_empty() {
        return Err(JoblyError::invalid_input("No data"));
    }

    let mut fragment = SqlFragment {
        clause: String::new(),
        values: Vec::with_capacity(fields.len()),
    };

    for (key, value) in fields {
        if !fragment.values.is_empty() {
            fragment.clause.push_str(", ");
        }
        let index = fragment.next_index();
        ColumnName::quoted(aliases.resolve(key))?.write_placeholder(&mut fragment.clause, "=", index);
        fragment.values.push(SqlValue::from(value));
    }

    Ok(fragment)
}
