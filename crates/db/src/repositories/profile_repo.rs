//! Repository for the `profiles` table.

use sqlx::PgPool;

use emlak_core::roles::Role;
use emlak_core::types::AccountId;

use crate::models::profile::ProfileRow;

const COLUMNS: &str = "id, full_name, role, whatsapp_number, created_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_id(pool: &PgPool, id: AccountId) -> Result<Option<ProfileRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ProfileRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles ORDER BY created_at DESC");
        sqlx::query_as::<_, ProfileRow>(&query).fetch_all(pool).await
    }

    pub async fn list_by_role(pool: &PgPool, role: Role) -> Result<Vec<ProfileRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles WHERE role = $1 ORDER BY full_name NULLS LAST"
        );
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(role.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn set_role(
        pool: &PgPool,
        id: AccountId,
        role: Role,
    ) -> Result<Option<ProfileRow>, sqlx::Error> {
        let query = format!("UPDATE profiles SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ProfileRow>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
    }
}
