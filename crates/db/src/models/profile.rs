use sqlx::FromRow;

use emlak_core::account::Profile;
use emlak_core::error::StorageError;
use emlak_core::types::{AccountId, Timestamp};

use super::parse_column;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: AccountId,
    pub full_name: Option<String>,
    pub role: String,
    pub whatsapp_number: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StorageError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            full_name: row.full_name,
            role: parse_column("role", &row.role)?,
            whatsapp_number: row.whatsapp_number,
            created_at: row.created_at,
        })
    }
}
