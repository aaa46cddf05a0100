//! Repository for the `listings` table.

use sqlx::PgPool;

use emlak_core::listing::NewListing;
use emlak_core::types::{AccountId, ListingId};

use crate::models::listing::ListingRow;

const COLUMNS: &str = "\
    id, title, description, price, transaction_type, category, detail_type, \
    rooms, gross_area, net_area, floor, total_floors, bathroom_count, heating, \
    building_age, parking_type, has_balcony, has_elevator, is_furnished, \
    usage_status, deed_status, dues, is_credit_eligible, credit_limit, \
    province, district, neighborhood, latitude, longitude, images, \
    contact_number, customer_name, customer_phone, commission_type, \
    seller_note, admin_note, created_by, is_active, featured, created_at";

pub struct ListingRepo;

impl ListingRepo {
    /// Active listings, newest first.
    pub async fn list_active(pool: &PgPool, limit: i64) -> Result<Vec<ListingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE is_active \
             ORDER BY created_at DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Active featured listings, newest first.
    pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<ListingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE is_active AND featured \
             ORDER BY created_at DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: ListingId) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All listings of an owner, inactive included.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: AccountId,
    ) -> Result<Vec<ListingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings WHERE created_by = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        owner: AccountId,
        input: &NewListing,
    ) -> Result<ListingRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings \
                (title, description, price, transaction_type, category, detail_type, \
                 rooms, gross_area, net_area, floor, total_floors, bathroom_count, \
                 heating, building_age, parking_type, has_balcony, has_elevator, \
                 is_furnished, usage_status, deed_status, dues, is_credit_eligible, \
                 credit_limit, province, district, neighborhood, latitude, longitude, \
                 images, contact_number, customer_name, customer_phone, \
                 commission_type, seller_note, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                     $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, \
                     $28, $29, $30, $31, $32, $33, $34, $35) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(input.title.trim())
            .bind(input.description.as_deref())
            .bind(input.price)
            .bind(input.transaction_type.as_str())
            .bind(input.category.as_str())
            .bind(input.detail_type.map(|d| d.as_str()))
            .bind(input.rooms.as_deref())
            .bind(input.gross_area)
            .bind(input.net_area)
            .bind(input.floor.as_deref())
            .bind(input.total_floors)
            .bind(input.bathroom_count)
            .bind(input.heating.as_deref())
            .bind(input.building_age.as_deref())
            .bind(input.parking_type.map(|p| p.as_str()))
            .bind(input.has_balcony)
            .bind(input.has_elevator)
            .bind(input.is_furnished)
            .bind(input.usage_status.as_deref())
            .bind(input.deed_status.as_deref())
            .bind(input.dues)
            .bind(input.is_credit_eligible)
            .bind(input.credit_limit)
            .bind(input.province.as_deref())
            .bind(input.district.as_deref())
            .bind(input.neighborhood.as_deref())
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.images)
            .bind(input.contact_number.as_deref())
            .bind(input.customer_name.as_deref())
            .bind(input.customer_phone.as_deref())
            .bind(input.commission_type.map(|c| c.as_str()))
            .bind(input.seller_note.as_deref())
            .bind(owner)
            .fetch_one(pool)
            .await
    }

    /// Set the given flags, leaving `None` ones untouched.
    pub async fn update_flags(
        pool: &PgPool,
        id: ListingId,
        is_active: Option<bool>,
        featured: Option<bool>,
    ) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET \
                is_active = COALESCE($2, is_active), \
                featured = COALESCE($3, featured) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(id)
            .bind(is_active)
            .bind(featured)
            .fetch_optional(pool)
            .await
    }

    /// Hard delete. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: ListingId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_owner(pool: &PgPool, owner: AccountId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE created_by = $1")
            .bind(owner)
            .fetch_one(pool)
            .await
    }

    /// Bulk-move ownership. Returns the number of listings moved.
    pub async fn reassign_owner(
        pool: &PgPool,
        from: AccountId,
        to: AccountId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE listings SET created_by = $2 WHERE created_by = $1")
            .bind(from)
            .bind(to)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
