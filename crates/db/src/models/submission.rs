//! Rows of the append-only submission tables.

use sqlx::FromRow;

use emlak_core::error::StorageError;
use emlak_core::submission::{CustomerRequest, FavoriteEntry, OfferEntry};
use emlak_core::types::{EntityId, ListingId, Timestamp};

use super::parse_column;

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRequestRow {
    pub id: EntityId,
    pub customer_name: String,
    pub customer_phone: String,
    pub listing_type: String,
    pub property_type: String,
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
    pub note: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<CustomerRequestRow> for CustomerRequest {
    type Error = StorageError;

    fn try_from(row: CustomerRequestRow) -> Result<Self, Self::Error> {
        Ok(CustomerRequest {
            id: row.id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            listing_type: parse_column("listing_type", &row.listing_type)?,
            property_type: parse_column("property_type", &row.property_type)?,
            min_budget: row.min_budget,
            max_budget: row.max_budget,
            note: row.note,
            ip_address: row.ip_address,
            created_at: row.created_at,
        })
    }
}

/// `listing_favorites` LEFT JOIN `listings` for the title.
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteRow {
    pub id: EntityId,
    pub listing_id: ListingId,
    pub listing_title: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

impl From<FavoriteRow> for FavoriteEntry {
    fn from(row: FavoriteRow) -> Self {
        FavoriteEntry {
            id: row.id,
            listing_id: row.listing_id,
            listing_title: row.listing_title,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            ip_address: row.ip_address,
            created_at: row.created_at,
        }
    }
}

/// `listing_offers` LEFT JOIN `listings` for the title.
#[derive(Debug, Clone, FromRow)]
pub struct OfferRow {
    pub id: EntityId,
    pub listing_id: ListingId,
    pub listing_title: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub offer_amount: i64,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

impl From<OfferRow> for OfferEntry {
    fn from(row: OfferRow) -> Self {
        OfferEntry {
            id: row.id,
            listing_id: row.listing_id,
            listing_title: row.listing_title,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            offer_amount: row.offer_amount,
            ip_address: row.ip_address,
            created_at: row.created_at,
        }
    }
}
