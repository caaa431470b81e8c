//! Model round trips against a live database.
//!
//! Each test runs inside its own throwaway schema. Tests are skipped when
//! `DATABASE_URL` is not set.

use jobly::{
    Company, FieldMap, Job, JoblyError, JoblyResult, NewCompany, NewJob, SCHEMA_SQL, connect_url,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::Client;

struct TestDb {
    client: Client,
    schema: String,
}

impl TestDb {
    async fn setup(test: &str) -> JoblyResult<Option<Self>> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(v) => v,
            Err(_) => {
                eprintln!("DATABASE_URL is not set; skipping {test}");
                return Ok(None);
            }
        };

        let client = connect_url(&database_url).await?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX_EPOCH")
            .as_nanos();
        let schema = format!("jobly_test_{}_{}", std::process::id(), nanos);

        client
            .batch_execute(&format!("CREATE SCHEMA {schema}; SET search_path TO {schema};"))
            .await
            .map_err(JoblyError::from_db_error)?;
        client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(JoblyError::from_db_error)?;

        Ok(Some(Self { client, schema }))
    }

    async fn teardown(self) -> JoblyResult<()> {
        self.client
            .batch_execute(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .await
            .map_err(JoblyError::from_db_error)
    }
}

fn map(value: Value) -> FieldMap {
    match value {
        Value::Object(m) => m,
        other => panic!("expected object, got {other}"),
    }
}

fn new_company(handle: &str, name: &str, num_employees: Option<i32>) -> NewCompany {
    NewCompany {
        handle: handle.to_string(),
        name: name.to_string(),
        description: format!("Desc {name}"),
        num_employees,
        logo_url: Some(format!("http://{handle}.img")),
    }
}

fn titles(jobs: &[Job]) -> Vec<String> {
    jobs.iter().map(|j| j.title.clone()).collect()
}

async fn seed(client: &Client) -> JoblyResult<Vec<Job>> {
    Company::create(client, &new_company("c1", "C1", Some(1))).await?;
    Company::create(client, &new_company("c2", "C2", Some(2))).await?;
    Company::create(client, &new_company("c3", "C3", Some(3))).await?;

    let mut jobs = Vec::new();
    for (title, salary, equity) in [
        ("J1", 100, Some(Decimal::new(1, 1))),
        ("J2", 200, Some(Decimal::new(2, 1))),
        ("J3", 300, Some(Decimal::ZERO)),
        ("J4", 400, None),
    ] {
        jobs.push(
            Job::create(
                client,
                &NewJob {
                    title: title.to_string(),
                    salary: Some(salary),
                    equity,
                    company_handle: "c1".to_string(),
                },
            )
            .await?,
        );
    }
    Ok(jobs)
}

#[tokio::test]
async fn company_create_and_duplicate() -> JoblyResult<()> {
    let Some(db) = TestDb::setup("company_create_and_duplicate").await? else {
        return Ok(());
    };

    let data = new_company("new", "New", Some(1));
    let company = Company::create(&db.client, &data).await?;
    assert_eq!(company.handle, "new");
    assert_eq!(company.num_employees, Some(1));

    let err = Company::create(&db.client, &data).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(err.to_string().contains("Duplicate company: new"), "{err}");

    // Same name under another handle trips the `name` unique constraint.
    let err = Company::create(&db.client, &new_company("other", "New", None))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert!(!err.to_string().contains("Duplicate company"), "{err}");

    db.teardown().await
}

#[tokio::test]
async fn company_find_all_filters() -> JoblyResult<()> {
    let Some(db) = TestDb::setup("company_find_all_filters").await? else {
        return Ok(());
    };
    seed(&db.client).await?;

    let all = Company::find_all(&db.client, &map(json!({}))).await?;
    let handles: Vec<_> = all.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c1", "c2", "c3"]);

    let by_name = Company::find_all(&db.client, &map(json!({"name": "c2"}))).await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].handle, "c2");

    let ranged = Company::find_all(
        &db.client,
        &map(json!({"minEmployees": "2", "maxEmployees": "3"})),
    )
    .await?;
    let handles: Vec<_> = ranged.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c2", "c3"]);

    let none = Company::find_all(&db.client, &map(json!({"name": "nope"}))).await?;
    assert!(none.is_empty());

    let err = Company::find_all(
        &db.client,
        &map(json!({"minEmployees": 3, "maxEmployees": 1})),
    )
    .await
    .unwrap_err();
    assert!(err.is_invalid_input());

    let err = Company::find_all(&db.client, &map(json!({"color": "red"})))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    db.teardown().await
}

#[tokio::test]
async fn company_get_update_remove() -> JoblyResult<()> {
    let Some(db) = TestDb::setup("company_get_update_remove").await? else {
        return Ok(());
    };
    let jobs = seed(&db.client).await?;

    let detail = Company::get(&db.client, "c1").await?;
    assert_eq!(detail.company.name, "C1");
    assert_eq!(detail.jobs, jobs);

    assert!(Company::get(&db.client, "nope").await.unwrap_err().is_not_found());

    let updated = Company::update(
        &db.client,
        "c1",
        &map(json!({"name": "New", "numEmployees": 10, "logoUrl": null})),
    )
    .await?;
    assert_eq!(updated.name, "New");
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url, None);
    assert_eq!(updated.description, "Desc C1");

    let err = Company::update(&db.client, "c1", &map(json!({})))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    let err = Company::update(&db.client, "c1", &map(json!({"handle": "x"})))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    let err = Company::update(&db.client, "nope", &map(json!({"name": "x"})))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    Company::remove(&db.client, "c1").await?;
    assert!(Company::get(&db.client, "c1").await.unwrap_err().is_not_found());
    // Jobs cascade with their company.
    assert!(Job::get(&db.client, jobs[0].id).await.unwrap_err().is_not_found());
    assert!(Company::remove(&db.client, "c1").await.unwrap_err().is_not_found());

    db.teardown().await
}

#[tokio::test]
async fn job_find_all_filters() -> JoblyResult<()> {
    let Some(db) = TestDb::setup("job_find_all_filters").await? else {
        return Ok(());
    };
    seed(&db.client).await?;

    let all = Job::find_all(&db.client, &map(json!({}))).await?;
    assert_eq!(titles(&all), ["J1", "J2", "J3", "J4"]);

    let equity = Job::find_all(&db.client, &map(json!({"hasEquity": "true"}))).await?;
    assert_eq!(titles(&equity), ["J1", "J2"]);

    let ignored = Job::find_all(&db.client, &map(json!({"hasEquity": false}))).await?;
    assert_eq!(ignored.len(), 4);

    let combined = Job::find_all(
        &db.client,
        &map(json!({"minSalary": 150, "hasEquity": true, "title": "j"})),
    )
    .await?;
    assert_eq!(titles(&combined), ["J2"]);

    let err = Job::find_all(&db.client, &map(json!({"minSalary": 500, "maxSalary": 100})))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    db.teardown().await
}

#[tokio::test]
async fn job_get_update_remove() -> JoblyResult<()> {
    let Some(db) = TestDb::setup("job_get_update_remove").await? else {
        return Ok(());
    };
    let jobs = seed(&db.client).await?;
    let id = jobs[0].id;

    assert_eq!(Job::get(&db.client, id).await?, jobs[0]);
    assert!(Job::get(&db.client, 0).await.unwrap_err().is_not_found());

    let updated = Job::update(
        &db.client,
        id,
        &map(json!({"title": "Senior", "salary": "500", "equity": 0.5})),
    )
    .await?;
    assert_eq!(updated.title, "Senior");
    assert_eq!(updated.salary, Some(500));
    assert_eq!(updated.equity, Some(Decimal::new(5, 1)));
    assert_eq!(updated.company_handle, "c1");

    let err = Job::update(&db.client, id, &map(json!({"companyHandle": "c2"})))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    let err = Job::create(
        &db.client,
        &NewJob {
            title: "Orphan".to_string(),
            salary: None,
            equity: None,
            company_handle: "missing".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)));

    Job::remove(&db.client, id).await?;
    assert!(Job::remove(&db.client, id).await.unwrap_err().is_not_found());

    db.teardown().await
}
