use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::models::{Appointment, AppointmentChanges, AppointmentStatus, AppointmentType, NewAppointment};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const APPOINTMENT_SELECT: &str = r"
    SELECT a.id, a.patient_id, pa.name AS patient_name, a.professional_id,
           pr.name AS professional_name, a.facility_id, f.name AS facility_name,
           a.scheduled_at, a.appointment_type, a.status, a.notes, a.telemedicine_link
    FROM appointments a
    JOIN patients pa ON pa.id = a.patient_id
    JOIN professionals pr ON pr.id = a.professional_id
    JOIN facilities f ON f.id = a.facility_id
    WHERE 1=1";

const APPOINTMENT_COUNT: &str = "SELECT COUNT(*) FROM appointments a WHERE 1=1";

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Repository for scheduled appointments
pub struct AppointmentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AppointmentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<Appointment>> {
        let sql = format!("{APPOINTMENT_SELECT} AND a.id = $1");
        Ok(sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn list(
        &mut self,
        filter: &AppointmentFilter,
        page: Page,
    ) -> DbResult<(Vec<Appointment>, i64)> {
        let mut query = PaginatedQuery::new(APPOINTMENT_SELECT, APPOINTMENT_COUNT);
        query
            .filter_eq("a.patient_id", filter.patient_id)
            .filter_eq("a.professional_id", filter.professional_id)
            .filter_eq("a.facility_id", filter.facility_id)
            .filter_eq("a.status", filter.status.clone())
            .filter_gte("a.scheduled_at", filter.from)
            .filter_lte("a.scheduled_at", filter.until)
            .order_by("a.scheduled_at", "ASC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    pub async fn create(&mut self, appointment: &NewAppointment) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            INSERT INTO appointments
                (patient_id, professional_id, facility_id, scheduled_at, appointment_type,
                 notes, telemedicine_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(appointment.patient_id)
        .bind(appointment.professional_id)
        .bind(appointment.facility_id)
        .bind(appointment.scheduled_at)
        .bind(appointment.appointment_type.as_str())
        .bind(&appointment.notes)
        .bind(&appointment.telemedicine_link)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn update(&mut self, id: i64, changes: &AppointmentChanges) -> DbResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE appointments SET
                scheduled_at = COALESCE($2, scheduled_at),
                appointment_type = COALESCE($3, appointment_type),
                status = COALESCE($4, status),
                notes = CASE WHEN $5 THEN $6 ELSE notes END,
                telemedicine_link = COALESCE($7, telemedicine_link)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(changes.scheduled_at)
        .bind(changes.appointment_type.map(AppointmentType::as_str))
        .bind(changes.status.map(AppointmentStatus::as_str))
        .bind(changes.notes.is_some())
        .bind(changes.notes.clone().flatten())
        .bind(&changes.telemedicine_link)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&mut self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
