use sqlx::PgConnection;

use crate::models::{NewProfessional, Professional, ProfessionalChanges};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const PROFESSIONAL_SELECT: &str = r"
    SELECT pr.id, pr.user_id, u.email, u.active, pr.license_number, pr.name, pr.specialty,
           pr.phone, pr.professional_email, pr.admission_date
    FROM professionals pr
    JOIN users u ON u.id = pr.user_id
    WHERE 1=1";

const PROFESSIONAL_COUNT: &str = "SELECT COUNT(*) FROM professionals pr WHERE 1=1";

#[derive(Debug, Clone, Default)]
pub struct ProfessionalFilter {
    pub name: Option<String>,
    pub specialty: Option<String>,
}

/// Repository for health professionals
pub struct ProfessionalRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProfessionalRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<Professional>> {
        let sql = format!("{PROFESSIONAL_SELECT} AND pr.id = $1");
        Ok(sqlx::query_as::<_, Professional>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn find_by_user(&mut self, user_id: i64) -> DbResult<Option<Professional>> {
        let sql = format!("{PROFESSIONAL_SELECT} AND pr.user_id = $1");
        Ok(sqlx::query_as::<_, Professional>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn license_exists(&mut self, license_number: &str) -> DbResult<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM professionals WHERE license_number = $1)")
                .bind(license_number)
                .fetch_one(&mut *self.conn)
                .await?,
        )
    }

    pub async fn list(
        &mut self,
        filter: &ProfessionalFilter,
        page: Page,
    ) -> DbResult<(Vec<Professional>, i64)> {
        let mut query = PaginatedQuery::new(PROFESSIONAL_SELECT, PROFESSIONAL_COUNT);
        query
            .filter_ilike("pr.name", filter.name.as_deref())
            .filter_eq("pr.specialty", filter.specialty.clone())
            .order_by("pr.name", "ASC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    pub async fn create(&mut self, professional: &NewProfessional) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            INSERT INTO professionals
                (user_id, license_number, name, specialty, phone, professional_email, admission_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(professional.user_id)
        .bind(&professional.license_number)
        .bind(&professional.name)
        .bind(professional.specialty.as_str())
        .bind(&professional.phone)
        .bind(&professional.professional_email)
        .bind(professional.admission_date)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn update(&mut self, id: i64, changes: &ProfessionalChanges) -> DbResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE professionals SET
                name = COALESCE($2, name),
                specialty = COALESCE($3, specialty),
                phone = COALESCE($4, phone),
                professional_email = COALESCE($5, professional_email)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.specialty)
        .bind(&changes.phone)
        .bind(&changes.professional_email)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn dependent_records(&mut self, id: i64) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            SELECT (SELECT COUNT(*) FROM appointments WHERE professional_id = $1)
                 + (SELECT COUNT(*) FROM prescriptions WHERE professional_id = $1)
            ",
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn delete(&mut self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM professionals WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
