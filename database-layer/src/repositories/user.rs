use sqlx::PgConnection;

use crate::models::{NewUser, User};
use crate::DatabaseResult as DbResult;

const USER_COLUMNS: &str = "id, email, password_hash, user_type, active, created_at, last_access";

/// Repository for login accounts
pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn find_by_email(&mut self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    pub async fn email_exists(&mut self, email: &str) -> DbResult<bool> {
        Ok(sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *self.conn)
            .await?)
    }

    pub async fn create(&mut self, user: &NewUser) -> DbResult<User> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, user_type) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.user_type.as_str())
            .fetch_one(&mut *self.conn)
            .await?)
    }

    pub async fn touch_last_access(&mut self, id: i64) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_access = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    pub async fn update_password(&mut self, id: i64, password_hash: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
