//! Repository for `customer_requests`, `listing_favorites` and `listing_offers`.

use sqlx::PgPool;

use emlak_core::submission::{NewCustomerRequest, NewFavorite, NewOffer};

use crate::models::submission::{CustomerRequestRow, FavoriteRow, OfferRow};

const CUSTOMER_REQUEST_COLUMNS: &str = "\
    id, customer_name, customer_phone, listing_type, property_type, \
    min_budget, max_budget, note, ip_address, created_at";

const FAVORITE_COLUMNS: &str = "\
    f.id, f.listing_id, l.title AS listing_title, f.customer_name, \
    f.customer_phone, f.ip_address, f.created_at";

const OFFER_COLUMNS: &str = "\
    o.id, o.listing_id, l.title AS listing_title, o.customer_name, \
    o.customer_phone, o.offer_amount, o.ip_address, o.created_at";

pub struct SubmissionRepo;

impl SubmissionRepo {
    // -----------------------------------------------------------------------
    // Inserts
    // -----------------------------------------------------------------------

    pub async fn insert_customer_request(
        pool: &PgPool,
        input: &NewCustomerRequest,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO customer_requests \
                (customer_name, customer_phone, listing_type, property_type, \
                 min_budget, max_budget, note, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.listing_type.as_str())
        .bind(input.property_type.as_str())
        .bind(input.min_budget)
        .bind(input.max_budget)
        .bind(input.note.as_deref())
        .bind(input.ip_address.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn insert_favorite(pool: &PgPool, input: &NewFavorite) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO listing_favorites \
                (listing_id, customer_name, customer_phone, ip_address) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(input.listing_id)
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.ip_address.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn insert_offer(pool: &PgPool, input: &NewOffer) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO listing_offers \
                (listing_id, customer_name, customer_phone, offer_amount, ip_address) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(input.listing_id)
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.offer_amount)
        .bind(input.ip_address.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Back-office reads
    // -----------------------------------------------------------------------

    pub async fn list_customer_requests(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<CustomerRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CUSTOMER_REQUEST_COLUMNS} FROM customer_requests \
             ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, CustomerRequestRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Favorites with the listing title; the title is `NULL` once the
    /// listing has been deleted.
    pub async fn list_favorites(pool: &PgPool, limit: i64) -> Result<Vec<FavoriteRow>, sqlx::Error> {
        let query = format!(
            "SELECT {FAVORITE_COLUMNS} FROM listing_favorites f \
             LEFT JOIN listings l ON l.id = f.listing_id \
             ORDER BY f.created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_offers(pool: &PgPool, limit: i64) -> Result<Vec<OfferRow>, sqlx::Error> {
        let query = format!(
            "SELECT {OFFER_COLUMNS} FROM listing_offers o \
             LEFT JOIN listings l ON l.id = o.listing_id \
             ORDER BY o.created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, OfferRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
