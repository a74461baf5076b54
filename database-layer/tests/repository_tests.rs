//! Repository tests against a real Postgres.
//!
//! Require `DATABASE_URL` pointing at a disposable database; run with
//! `cargo test -p database-layer -- --ignored`.

use std::sync::Arc;

use audit_engine::{AuditAction, AuditEntry, AuditRecorder, AuditSink};
use chrono::NaiveDate;
use database_layer::models::{NewPatient, NewUser, PatientChanges, Sex, UserType};
use database_layer::repositories::{PatientFilter, PatientRepository, UserRepository};
use database_layer::{DatabasePool, Page, PgAuditSink, PoolSettings, UnitOfWork};
use serde_json::json;

async fn pool() -> DatabasePool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = DatabasePool::new(&url, &PoolSettings::default())
        .await
        .expect("connect");
    pool.migrate().await.expect("migrate");
    pool
}

/// Eleven digits that differ between runs
fn unique_digits() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:011}", nanos.rem_euclid(100_000_000_000))
}

fn new_user(email: String) -> NewUser {
    NewUser {
        email,
        password_hash: "hash".to_string(),
        user_type: UserType::Patient,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn dropped_unit_of_work_rolls_back() {
    let pool = pool().await;
    let email = format!("rollback-{}@vidaplus.test", unique_digits());

    {
        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        UserRepository::new(uow.conn())
            .create(&new_user(email.clone()))
            .await
            .unwrap();
        // dropped without commit
    }

    let mut conn = pool.acquire().await.unwrap();
    assert!(!UserRepository::new(&mut conn).email_exists(&email).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn audited_commit_writes_one_audit_row() {
    let pool = pool().await;
    let digits = unique_digits();
    let sink: Arc<dyn AuditSink> = Arc::new(PgAuditSink::new(pool.clone()));
    let recorder = AuditRecorder::new(sink);

    let mut uow = UnitOfWork::begin(&pool).await.unwrap();
    let user = UserRepository::new(uow.conn())
        .create(&new_user(format!("patient-{digits}@vidaplus.test")))
        .await
        .unwrap();
    let cpf = format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    );
    let patient_id = PatientRepository::new(uow.conn())
        .create(&NewPatient {
            user_id: user.id,
            cpf: cpf.clone(),
            name: "Maria Silva".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            sex: Sex::Female,
            phone: None,
            address: None,
            health_plan: Some("Unimed".to_string()),
            allergies: None,
            current_medications: None,
            family_history: None,
        })
        .await
        .unwrap();

    let entry = AuditEntry::new(user.id, AuditAction::Create, "patients")
        .record_id(patient_id)
        .after(json!({ "cpf": cpf }));
    uow.commit_audited(&recorder, entry).await.unwrap();

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs WHERE table_name = 'patients' AND record_id = $1",
    )
    .bind(patient_id)
    .fetch_one(pool.pool())
    .await
    .unwrap();
    assert_eq!(count, 1);

    let mut conn = pool.acquire().await.unwrap();
    let mut patients = PatientRepository::new(&mut conn);
    let (found, total) = patients
        .list(
            &PatientFilter {
                cpf: Some(cpf),
                ..Default::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, patient_id);

    let changed = patients
        .update(
            patient_id,
            &PatientChanges {
                phone: Some("(11) 98765-4321".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(changed);
    let patient = patients.find(patient_id).await.unwrap().unwrap();
    assert_eq!(patient.phone.as_deref(), Some("(11) 98765-4321"));
    assert_eq!(patient.name, "Maria Silva");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn audit_origin_accepts_full_length_ipv6() {
    let pool = pool().await;
    let origin = "ffff:ffff:ffff:ffff:ffff:ffff:255.255.255.255".to_string();
    let record_id = unique_digits().parse::<i64>().unwrap();

    PgAuditSink::new(pool.clone())
        .write_entry(
            &AuditEntry::new(1, AuditAction::Update, "appointments")
                .record_id(record_id)
                .origin(Some(origin.clone())),
        )
        .await
        .unwrap();

    let stored: Option<String> = sqlx::query_scalar(
        "SELECT origin FROM audit_logs WHERE table_name = 'appointments' AND record_id = $1",
    )
    .bind(record_id)
    .fetch_one(pool.pool())
    .await
    .unwrap();
    assert_eq!(stored, Some(origin));
}
