//! Visitor submissions: customer requests (leads), favorites and offers.
//!
//! Records are append-only. The `New*` structs are the already validated
//! inputs produced by [`crate::intake`]; the plain structs are what the
//! back office reads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::listing::PropertyCategory;
use crate::types::{EntityId, ListingId, Timestamp};

/// What a customer request is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestedTransaction {
    Sale,
    Rent,
}

impl RequestedTransaction {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestedTransaction::Sale => "sale",
            RequestedTransaction::Rent => "rent",
        }
    }
}

impl fmt::Display for RequestedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestedTransaction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(RequestedTransaction::Sale),
            "rent" => Ok(RequestedTransaction::Rent),
            other => Err(CoreError::Validation(format!(
                "Unknown listing type: '{other}'. Valid values: sale, rent"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomerRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub listing_type: RequestedTransaction,
    pub property_type: PropertyCategory,
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
    pub note: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub listing_id: ListingId,
    pub customer_name: String,
    pub customer_phone: String,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub listing_id: ListingId,
    pub customer_name: String,
    pub customer_phone: String,
    pub offer_amount: i64,
    pub ip_address: Option<String>,
}

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRequest {
    pub id: EntityId,
    pub customer_name: String,
    pub customer_phone: String,
    pub listing_type: RequestedTransaction,
    pub property_type: PropertyCategory,
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
    pub note: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// A favorite joined with the title of its listing (if it still exists).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteEntry {
    pub id: EntityId,
    pub listing_id: ListingId,
    pub listing_title: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// An offer joined with the title of its listing (if it still exists).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferEntry {
    pub id: EntityId,
    pub listing_id: ListingId,
    pub listing_title: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub offer_amount: i64,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// Maximum rows returned by the back-office submission listings.
pub const BACK_OFFICE_LIMIT: i64 = 500;
