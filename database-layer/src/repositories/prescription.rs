use sqlx::PgConnection;

use crate::models::{NewPrescription, Prescription, PrescriptionChanges, PrescriptionStatus};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const PRESCRIPTION_SELECT: &str = r"
    SELECT rx.id, rx.patient_id, pa.name AS patient_name, rx.professional_id,
           pr.name AS professional_name, rx.prescribed_at, rx.medications, rx.dosage,
           rx.duration, rx.notes, rx.status
    FROM prescriptions rx
    JOIN patients pa ON pa.id = rx.patient_id
    JOIN professionals pr ON pr.id = rx.professional_id
    WHERE 1=1";

const PRESCRIPTION_COUNT: &str = "SELECT COUNT(*) FROM prescriptions rx WHERE 1=1";

#[derive(Debug, Clone, Default)]
pub struct PrescriptionFilter {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub status: Option<String>,
}

/// Repository for digital prescriptions
pub struct PrescriptionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PrescriptionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<Prescription>> {
        let sql = format!("{PRESCRIPTION_SELECT} AND rx.id = $1");
        Ok(sqlx::query_as::<_, Prescription>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn list(
        &mut self,
        filter: &PrescriptionFilter,
        page: Page,
    ) -> DbResult<(Vec<Prescription>, i64)> {
        let mut query = PaginatedQuery::new(PRESCRIPTION_SELECT, PRESCRIPTION_COUNT);
        query
            .filter_eq("rx.patient_id", filter.patient_id)
            .filter_eq("rx.professional_id", filter.professional_id)
            .filter_eq("rx.status", filter.status.clone())
            .order_by("rx.prescribed_at", "DESC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    pub async fn create(&mut self, prescription: &NewPrescription) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            INSERT INTO prescriptions
                (patient_id, professional_id, medications, dosage, duration, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(prescription.patient_id)
        .bind(prescription.professional_id)
        .bind(&prescription.medications)
        .bind(&prescription.dosage)
        .bind(&prescription.duration)
        .bind(&prescription.notes)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn update(&mut self, id: i64, changes: &PrescriptionChanges) -> DbResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE prescriptions SET
                medications = COALESCE($2, medications),
                dosage = COALESCE($3, dosage),
                duration = COALESCE($4, duration),
                notes = COALESCE($5, notes),
                status = COALESCE($6, status)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.medications)
        .bind(&changes.dosage)
        .bind(&changes.duration)
        .bind(&changes.notes)
        .bind(changes.status.map(PrescriptionStatus::as_str))
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&mut self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
