// Initial data every fresh database needs
use tracing::info;

use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use crate::models::{NewFacility, UserType};
use crate::repositories::FacilityRepository;
use crate::transaction::UnitOfWork;

/// CNPJ of the facility created on first boot
pub const DEFAULT_FACILITY_CNPJ: &str = "12.345.678/0001-95";

/// Administrator account created on first boot. The password arrives
/// already hashed.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password_hash: String,
}

#[must_use]
pub fn default_facility() -> NewFacility {
    NewFacility {
        name: "VidaPlus Central Hospital".to_string(),
        facility_type: "hospital".to_string(),
        address: "Av. Paulista, 1000 - São Paulo, SP".to_string(),
        phone: Some("(11) 3000-0000".to_string()),
        cnpj: Some(DEFAULT_FACILITY_CNPJ.to_string()),
    }
}

/// Inserts the administrator and the default facility unless present.
///
/// # Errors
///
/// Fails when either insert fails for a reason other than a duplicate.
pub async fn seed_initial_data(pool: &DatabasePool, admin: &SeedAdmin) -> DatabaseResult<()> {
    let mut uow = UnitOfWork::begin(pool).await?;

    let created = sqlx::query(
        r"
        INSERT INTO users (email, password_hash, user_type)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        ",
    )
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(UserType::Admin.as_str())
    .execute(uow.conn())
    .await?
    .rows_affected();

    FacilityRepository::new(uow.conn()).ensure(&default_facility()).await?;
    uow.commit().await?;

    if created > 0 {
        info!("Seeded administrator account");
    }
    Ok(())
}
