use async_trait::async_trait;
use uuid::Uuid;

use super::{map_unique_violation, PgStore};
use crate::database::repository::{StoreResult, UserRepository};
use crate::models::{NewUser, User, UserCredentials};

const USER_COLUMNS: &str =
    "id, email, role, name, phone, company, address, city, state, country, created_at, updated_at";

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, role, name, phone, company) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.name)
            .bind(&user.phone)
            .bind(&user.company)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "An account with this email"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        Ok(sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password_hash, role FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_user_profile(&self, user: &User) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET name = $2, phone = $3, company = $4, address = $5, \
             city = $6, state = $7, country = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.phone)
            .bind(&user.company)
            .bind(&user.address)
            .bind(&user.city)
            .bind(&user.state)
            .bind(&user.country)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}
