//! SQL column identifiers.
//!
//! Postgres can't bind identifiers as parameters, so column names that end up in
//! generated clauses go through [`ColumnName`] first:
//!
//! - [`ColumnName::quoted`] accepts any name except empty/NUL and renders it
//!   as `"name"` with embedded `"` doubled.
//! - [`ColumnName::parse`] accepts bare (optionally dotted) names matching
//!   `[A-Za-z_][A-Za-z0-9_$]*` per segment and renders them verbatim.

use crate::error::{JoblyError, JoblyResult};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Form {
    Bare(String),
    Quoted(String),
}

/// A validated column name, ready to be written into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnName(Form);

impl ColumnName {
    /// Wrap a column name in double quotes.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::invalid_input("Empty column name"));
        }
        if name.contains('\0') {
            return Err(JoblyError::invalid_input(
                "Column name cannot contain NUL character",
            ));
        }
        Ok(Self(Form::Quoted(name.to_string())))
    }

    /// Parse a bare column name such as `num_employees` or `c.num_employees`.
    pub fn parse(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::invalid_input("Column name cannot be empty"));
        }

        for seg in name.split('.') {
            let mut chars = seg.chars();
            let Some(first) = chars.next() else {
                return Err(JoblyError::invalid_input(format!(
                    "Empty segment in column name '{name}'"
                )));
            };
            if !(first == '_' || first.is_ascii_alphabetic()) {
                return Err(JoblyError::invalid_input(format!(
                    "Invalid column name start character: '{first}'"
                )));
            }
            if let Some(bad) = chars.find(|&c| !(c == '_' || c == '$' || c.is_ascii_alphanumeric())) {
                return Err(JoblyError::invalid_input(format!(
                    "Invalid character in column name: '{bad}'"
                )));
            }
        }

        Ok(Self(Form::Bare(name.to_string())))
    }

    /// A bare column name fixed at compile time.
    pub(crate) fn known(name: &'static str) -> Self {
        debug_assert!(Self::parse(name).is_ok(), "invalid column name: {name}");
        Self(Form::Bare(name.to_string()))
    }

    /// Render the column as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match &self.0 {
            Form::Bare(s) => out.push_str(s),
            Form::Quoted(s) => {
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' {
                        out.push_str("\"\"");
                    } else {
                        out.push(ch);
                    }
                }
                out.push('"');
            }
        }
    }

    pub(crate) fn write_placeholder(&self, out: &mut String, op: &str, index: usize) {
        self.write_sql(out);
        // Writing to a String cannot fail.
        let _ = write!(out, "{op}${index}");
    }
}
