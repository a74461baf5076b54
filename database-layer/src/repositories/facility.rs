use sqlx::PgConnection;

use crate::models::{Facility, FacilityChanges, NewFacility};
use crate::query::{Page, PaginatedQuery};
use crate::DatabaseResult as DbResult;

const FACILITY_COLUMNS: &str = "id, name, facility_type, address, phone, cnpj, active";

#[derive(Debug, Clone, Default)]
pub struct FacilityFilter {
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// Repository for hospitals, clinics and other care units
pub struct FacilityRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> FacilityRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<Facility>> {
        let sql = format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = $1");
        Ok(sqlx::query_as::<_, Facility>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn cnpj_exists(&mut self, cnpj: &str) -> DbResult<bool> {
        Ok(sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM facilities WHERE cnpj = $1)")
            .bind(cnpj)
            .fetch_one(&mut *self.conn)
            .await?)
    }

    pub async fn list(&mut self, filter: &FacilityFilter, page: Page) -> DbResult<(Vec<Facility>, i64)> {
        let select = format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE 1=1");
        let mut query = PaginatedQuery::new(&select, "SELECT COUNT(*) FROM facilities WHERE 1=1");
        query
            .filter_ilike("name", filter.name.as_deref())
            .filter_eq("active", filter.active)
            .order_by("name", "ASC")
            .paginate(page);
        query.fetch_page(&mut *self.conn).await
    }

    pub async fn create(&mut self, facility: &NewFacility) -> DbResult<i64> {
        Ok(sqlx::query_scalar(
            r"
            INSERT INTO facilities (name, facility_type, address, phone, cnpj)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&facility.name)
        .bind(&facility.facility_type)
        .bind(&facility.address)
        .bind(&facility.phone)
        .bind(&facility.cnpj)
        .fetch_one(&mut *self.conn)
        .await?)
    }

    pub async fn update(&mut self, id: i64, changes: &FacilityChanges) -> DbResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE facilities SET
                name = COALESCE($2, name),
                facility_type = COALESCE($3, facility_type),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                active = COALESCE($6, active)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.facility_type)
        .bind(&changes.address)
        .bind(&changes.phone)
        .bind(changes.active)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inserts the seed facility unless its CNPJ is already present.
    pub async fn ensure(&mut self, facility: &NewFacility) -> DbResult<()> {
        sqlx::query(
            r"
            INSERT INTO facilities (name, facility_type, address, phone, cnpj)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cnpj) DO NOTHING
            ",
        )
        .bind(&facility.name)
        .bind(&facility.facility_type)
        .bind(&facility.address)
        .bind(&facility.phone)
        .bind(&facility.cnpj)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }
}
