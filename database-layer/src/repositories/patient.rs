use sqlx::PgConnection;

use crate::models::{NewPatient, Patient, PatientChanges};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const PATIENT_SELECT: &str = r"
    SELECT p.id, p.user_id, u.email, u.active, p.cpf, p.name, p.birth_date, p.sex,
           p.phone, p.address, p.health_plan, p.allergies, p.current_medications,
           p.family_history
    FROM patients p
    JOIN users u ON u.id = p.user_id
    WHERE 1=1";

const PATIENT_COUNT: &str = "SELECT COUNT(*) FROM patients p WHERE 1=1";

/// List filters; the CPF is matched in its stored, formatted form
#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub health_plan: Option<String>,
}

/// Repository for patient records
pub struct PatientRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PatientRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<Patient>> {
        let sql = format!("{PATIENT_SELECT} AND p.id = $1");
        Ok(sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn find_by_user(&mut self, user_id: i64) -> DbResult<Option<Patient>> {
        let sql = format!("{PATIENT_SELECT} AND p.user_id = $1");
        Ok(sqlx::query_as::<_, Patient>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn cpf_exists(&mut self, cpf: &str) -> DbResult<bool> {
        Ok(sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM patients WHERE cpf = $1)")
            .bind(cpf)
            .fetch_one(&mut *self.conn)
            .await?)
    }

    pub async fn list(&mut self, filter: &PatientFilter, page: Page) -> DbResult<(Vec<Patient>, i64)> {
        let mut query = PaginatedQuery::new(PATIENT_SELECT, PATIENT_COUNT);
        query
            .filter_ilike("p.name", filter.name.as_deref())
            .filter_eq("p.cpf", filter.cpf.clone())
            .filter_ilike("p.health_plan", filter.health_plan.as_deref())
            .order_by("p.name", "ASC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    pub async fn create(&mut self, patient: &NewPatient) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            INSERT INTO patients
                (user_id, cpf, name, birth_date, sex, phone, address, health_plan,
                 allergies, current_medications, family_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(patient.user_id)
        .bind(&patient.cpf)
        .bind(&patient.name)
        .bind(patient.birth_date)
        .bind(patient.sex.as_str())
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(&patient.health_plan)
        .bind(&patient.allergies)
        .bind(&patient.current_medications)
        .bind(&patient.family_history)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    /// Applies the non-empty fields of `changes`. Returns false when the
    /// patient does not exist.
    pub async fn update(&mut self, id: i64, changes: &PatientChanges) -> DbResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE patients SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                health_plan = COALESCE($5, health_plan),
                allergies = COALESCE($6, allergies),
                current_medications = COALESCE($7, current_medications),
                family_history = COALESCE($8, family_history)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.address)
        .bind(&changes.health_plan)
        .bind(&changes.allergies)
        .bind(&changes.current_medications)
        .bind(&changes.family_history)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Appointments plus prescriptions that still reference the patient
    pub async fn dependent_records(&mut self, id: i64) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            SELECT (SELECT COUNT(*) FROM appointments WHERE patient_id = $1)
                 + (SELECT COUNT(*) FROM prescriptions WHERE patient_id = $1)
            ",
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn delete(&mut self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
