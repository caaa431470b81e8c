//! Companies and jobs.
//!
//! Every method takes any [`GenericClient`](crate::GenericClient), so it works
//! on a plain `tokio_postgres::Client` or inside a transaction.

mod company;
mod job;

pub use company::{Company, CompanyDetail, NewCompany};
pub use job::{Job, NewJob};

use crate::error::{JoblyError, JoblyResult};
use crate::value::SqlValue;
use serde_json::{Map, Value};

/// Reject keys outside `allowed`.
fn ensure_known_keys(map: &Map<String, Value>, allowed: &[&str], what: &str) -> JoblyResult<()> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(JoblyError::invalid_input(format!("Unknown {what}: {key}"))),
        None => Ok(()),
    }
}

/// `min_key > max_key` is a caller error; the clause builder doesn't check it.
fn ensure_ordered_bounds(
    filters: &Map<String, Value>,
    min_key: &str,
    max_key: &str,
) -> JoblyResult<()> {
    let bound = |key: &str| filters.get(key).map(SqlValue::from).and_then(|v| v.as_f64());
    match (bound(min_key), bound(max_key)) {
        (Some(min), Some(max)) if min > max => Err(JoblyError::invalid_input(format!(
            "{min_key} cannot be greater than {max_key}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn known_keys_pass() {
        let m = map(json!({"name": "a", "minEmployees": 1}));
        assert!(ensure_known_keys(&m, &["name", "minEmployees", "maxEmployees"], "filter").is_ok());
    }

    #[test]
    fn unknown_key_is_named() {
        let m = map(json!({"name": "a", "handle": "x"}));
        let err = ensure_known_keys(&m, &["name"], "field").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Unknown field: handle");
    }

    #[test]
    fn bounds_in_order() {
        let m = map(json!({"minEmployees": "10", "maxEmployees": 200}));
        assert!(ensure_ordered_bounds(&m, "minEmployees", "maxEmployees").is_ok());

        let m = map(json!({"minEmployees": 5}));
        assert!(ensure_ordered_bounds(&m, "minEmployees", "maxEmployees").is_ok());
    }

    #[test]
    fn bounds_reversed() {
        let m = map(json!({"minEmployees": "300", "maxEmployees": "20"}));
        let err = ensure_ordered_bounds(&m, "minEmployees", "maxEmployees").unwrap_err();
        assert!(err.is_invalid_input());
    }
}
