use super::{ensure_known_keys, ensure_ordered_bounds};
use crate::client::{GenericClient, trace_sql};
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{ColumnAliases, FieldMap, FilterColumns, FilterMap, build_partial_update};
use crate::row::{FromRow, RowExt, map_rows};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

const FILTERS: &[&str] = &["title", "minSalary", "maxSalary", "hasEquity"];

const UPDATABLE: &[&str] = &["title", "salary", "equity"];

/// A row of `jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &tokio_postgres::Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Data for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// `hasEquity` accepts a JSON bool or the query-string forms `"true"`/`"false"`.
fn parse_has_equity(value: &Value) -> JoblyResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => s
            .parse()
            .map_err(|_| JoblyError::invalid_input(format!("hasEquity must be true or false, got '{s}'"))),
        other => Err(JoblyError::invalid_input(format!(
            "hasEquity must be true or false, got {other}"
        ))),
    }
}

impl Job {
    /// Insert a job. A missing company surfaces as `ForeignKeyViolation`.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        trace_sql("job.create", &sql, 4);
        let row = conn
            .query_one(
                &sql,
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs matching `filters`, ordered by title.
    ///
    /// Accepted filters: `title` (case-insensitive substring), `minSalary`,
    /// `maxSalary`, `hasEquity` (only `true` narrows the result).
    pub async fn find_all(conn: &impl GenericClient, filters: &FilterMap) -> JoblyResult<Vec<Job>> {
        ensure_known_keys(filters, FILTERS, "filter")?;
        ensure_ordered_bounds(filters, "minSalary", "maxSalary")?;

        let has_equity = match filters.get("hasEquity") {
            Some(v) => parse_has_equity(v)?,
            None => false,
        };
        let clause_filters: FilterMap = filters
            .iter()
            .filter(|(k, _)| k.as_str() != "hasEquity")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut filter = FilterColumns::jobs().build(&clause_filters)?;
        if has_equity {
            filter.and_raw("equity > 0");
        }

        let sql = format!("SELECT {COLUMNS} FROM jobs{} ORDER BY title", filter.where_sql());
        let params = filter.params_ref();
        trace_sql("job.find_all", &sql, params.len());
        let rows = conn.query(&sql, &params).await?;
        map_rows(&rows)
    }

    /// A single job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let sql = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        trace_sql("job.get", &sql, 1);
        let row = conn
            .query_opt(&sql, &[&id])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    pub(crate) async fn for_company(conn: &impl GenericClient, handle: &str) -> JoblyResult<Vec<Job>> {
        let sql = format!("SELECT {COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id");
        trace_sql("job.for_company", &sql, 1);
        let rows = conn.query(&sql, &[&handle]).await?;
        map_rows(&rows)
    }

    /// Change only the fields present in `data`.
    ///
    /// Accepted keys: `title`, `salary`, `equity`. The id and the owning
    /// company never change.
    pub async fn update(conn: &impl GenericClient, id: i32, data: &FieldMap) -> JoblyResult<Job> {
        ensure_known_keys(data, UPDATABLE, "field")?;

        let set = build_partial_update(data, &ColumnAliases::none())?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {COLUMNS}",
            set.clause,
            set.next_index()
        );
        let mut params = set.params_ref();
        params.push(&id);
        trace_sql("job.update", &sql, params.len());

        let row = conn
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let sql = "DELETE FROM jobs WHERE id = $1 RETURNING id";
        trace_sql("job.remove", sql, 1);
        conn.query_opt(sql, &[&id])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn has_equity_forms() {
        assert!(parse_has_equity(&json!(true)).unwrap());
        assert!(!parse_has_equity(&json!("false")).unwrap());
        assert!(parse_has_equity(&json!("true")).unwrap());
        assert!(parse_has_equity(&json!("yes")).unwrap_err().is_invalid_input());
        assert!(parse_has_equity(&json!(1)).unwrap_err().is_invalid_input());
    }

    #[test]
    fn job_serializes_camel_case() {
        let job = Job {
            id: 1,
            title: "Engineer".into(),
            salary: Some(100_000),
            equity: Some(Decimal::new(5, 2)),
            company_handle: "c1".into(),
        };
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(v["companyHandle"], "c1");
        assert_eq!(v["equity"], "0.05");
    }
}
