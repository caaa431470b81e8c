use super::{Job, ensure_known_keys, ensure_ordered_bounds};
use crate::client::{GenericClient, trace_sql};
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{ColumnAliases, FieldMap, FilterMap, build_filter_clause, build_partial_update};
use crate::row::{FromRow, RowExt, map_rows};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

const FILTERS: &[&str] = &["name", "minEmployees", "maxEmployees"];

const UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

static ALIASES: LazyLock<ColumnAliases> = LazyLock::new(|| {
    ColumnAliases::new([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
});

/// A row of `companies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &tokio_postgres::Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Data for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A company with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

impl Company {
    /// Insert a company.
    ///
    /// Fails with `UniqueViolation` if the handle or the name is taken.
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        trace_sql("company.create", &sql, 5);
        let row = conn
            .query_one(
                &sql,
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await
            .map_err(|err| match err {
                JoblyError::UniqueViolation(msg) if msg.starts_with("companies_pkey") => {
                    JoblyError::UniqueViolation(format!("Duplicate company: {}", data.handle))
                }
                other => other,
            })?;
        Company::from_row(&row)
    }

    /// All companies matching `filters`, ordered by name.
    ///
    /// Accepted filters: `name` (case-insensitive substring), `minEmployees`,
    /// `maxEmployees`.
    pub async fn find_all(conn: &impl GenericClient, filters: &FilterMap) -> JoblyResult<Vec<Company>> {
        ensure_known_keys(filters, FILTERS, "filter")?;
        ensure_ordered_bounds(filters, "minEmployees", "maxEmployees")?;

        let filter = build_filter_clause(filters)?;
        let sql = format!(
            "SELECT {COLUMNS} FROM companies{} ORDER BY name",
            filter.where_sql()
        );
        let params = filter.params_ref();
        trace_sql("company.find_all", &sql, params.len());
        let rows = conn.query(&sql, &params).await?;
        map_rows(&rows)
    }

    /// A company and its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let sql = format!("SELECT {COLUMNS} FROM companies WHERE handle = $1");
        trace_sql("company.get", &sql, 1);
        let row = conn
            .query_opt(&sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        let company = Company::from_row(&row)?;
        let jobs = Job::for_company(conn, handle).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Change only the fields present in `data`.
    ///
    /// Accepted keys: `name`, `description`, `numEmployees`, `logoUrl`.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        data: &FieldMap,
    ) -> JoblyResult<Company> {
        ensure_known_keys(data, UPDATABLE, "field")?;

        let set = build_partial_update(data, &ALIASES)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COLUMNS}",
            set.clause,
            set.next_index()
        );
        let mut params = set.params_ref();
        params.push(&handle);
        trace_sql("company.update", &sql, params.len());

        let row = conn
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// Delete a company (its jobs go with it).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let sql = "DELETE FROM companies WHERE handle = $1 RETURNING handle";
        trace_sql("company.remove", sql, 1);
        conn.query_opt(sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Ok(())
    }
}
