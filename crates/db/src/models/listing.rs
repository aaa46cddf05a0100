use sqlx::FromRow;

use emlak_core::error::StorageError;
use emlak_core::listing::{Listing, SalesMetadata};
use emlak_core::types::{AccountId, ListingId, Timestamp};

use super::{parse_column, parse_optional_column};

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: ListingId,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub transaction_type: String,
    pub category: String,
    pub detail_type: Option<String>,
    pub rooms: Option<String>,
    pub gross_area: Option<f64>,
    pub net_area: Option<f64>,
    pub floor: Option<String>,
    pub total_floors: Option<i32>,
    pub bathroom_count: Option<i32>,
    pub heating: Option<String>,
    pub building_age: Option<String>,
    pub parking_type: Option<String>,
    pub has_balcony: Option<bool>,
    pub has_elevator: Option<bool>,
    pub is_furnished: Option<bool>,
    pub usage_status: Option<String>,
    pub deed_status: Option<String>,
    pub dues: Option<i64>,
    pub is_credit_eligible: Option<bool>,
    pub credit_limit: Option<i64>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Vec<String>,
    pub contact_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub commission_type: Option<String>,
    pub seller_note: Option<String>,
    pub admin_note: Option<String>,
    pub created_by: AccountId,
    pub is_active: bool,
    pub featured: bool,
    pub created_at: Timestamp,
}

impl TryFrom<ListingRow> for Listing {
    type Error = StorageError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            transaction_type: parse_column("transaction_type", &row.transaction_type)?,
            category: parse_column("category", &row.category)?,
            detail_type: parse_optional_column("detail_type", row.detail_type.as_deref())?,
            rooms: row.rooms,
            gross_area: row.gross_area,
            net_area: row.net_area,
            floor: row.floor,
            total_floors: row.total_floors,
            bathroom_count: row.bathroom_count,
            heating: row.heating,
            building_age: row.building_age,
            parking_type: parse_optional_column("parking_type", row.parking_type.as_deref())?,
            has_balcony: row.has_balcony,
            has_elevator: row.has_elevator,
            is_furnished: row.is_furnished,
            usage_status: row.usage_status,
            deed_status: row.deed_status,
            dues: row.dues,
            is_credit_eligible: row.is_credit_eligible,
            credit_limit: row.credit_limit,
            province: row.province,
            district: row.district,
            neighborhood: row.neighborhood,
            latitude: row.latitude,
            longitude: row.longitude,
            images: row.images,
            contact_number: row.contact_number,
            created_by: row.created_by,
            is_active: row.is_active,
            featured: row.featured,
            created_at: row.created_at,
            sales: SalesMetadata {
                customer_name: row.customer_name,
                customer_phone: row.customer_phone,
                commission_type: parse_optional_column(
                    "commission_type",
                    row.commission_type.as_deref(),
                )?,
                seller_note: row.seller_note,
                admin_note: row.admin_note,
            },
        })
    }
}
