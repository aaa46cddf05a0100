//! Listing domain types, creation validation and visibility projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::account::Viewer;
use crate::error::CoreError;
use crate::geo::{GeoPoint, UNBOUNDED_PRICE_SENTINEL};
use crate::roles::Role;
use crate::types::{AccountId, ListingId, Timestamp};

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Implements `as_str`, `Display` and `FromStr` for a text-backed enum.
///
/// The string forms are the values stored in the database and exchanged in
/// JSON, so they must stay in sync with the `#[serde(rename_all)]` casing.
macro_rules! text_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {}: '{other}'. Valid values: {}",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionType {
    ForSale,
    ForRent,
    TransferForSale,
}

text_enum!(TransactionType, "transaction type", {
    ForSale => "for-sale",
    ForRent => "for-rent",
    TransferForSale => "transfer-for-sale",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Land,
}

text_enum!(PropertyCategory, "property category", {
    Residential => "residential",
    Commercial => "commercial",
    Land => "land",
});

/// Sub-type of a residential listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetailType {
    Apartment,
    Residence,
    DetachedHouse,
    Villa,
    SummerHouse,
}

text_enum!(DetailType, "detail type", {
    Apartment => "apartment",
    Residence => "residence",
    DetachedHouse => "detached-house",
    Villa => "villa",
    SummerHouse => "summer-house",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParkingType {
    Open,
    Covered,
    #[serde(rename = "none")]
    NoParking,
}

text_enum!(ParkingType, "parking type", {
    Open => "open",
    Covered => "covered",
    NoParking => "none",
});

/// Whether the agency commission is included in the asking price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommissionType {
    Included,
    Excluded,
}

text_enum!(CommissionType, "commission type", {
    Included => "included",
    Excluded => "excluded",
});

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Seller-side details visible only to the listing owner and admins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesMetadata {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub commission_type: Option<CommissionType>,
    pub seller_note: Option<String>,
    /// Admin-only; stripped for owners who are not admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub transaction_type: TransactionType,
    pub category: PropertyCategory,
    pub detail_type: Option<DetailType>,
    pub rooms: Option<String>,
    pub gross_area: Option<f64>,
    pub net_area: Option<f64>,
    pub floor: Option<String>,
    pub total_floors: Option<i32>,
    pub bathroom_count: Option<i32>,
    pub heating: Option<String>,
    pub building_age: Option<String>,
    pub parking_type: Option<ParkingType>,
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
    /// Ordered; the first image is the cover.
    pub images: Vec<String>,
    pub contact_number: Option<String>,
    pub created_by: AccountId,
    pub is_active: bool,
    pub featured: bool,
    pub created_at: Timestamp,
    #[serde(skip)]
    pub sales: SalesMetadata,
}

impl Listing {
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Owners and admins may change a listing's status.
    pub fn can_be_managed_by(&self, viewer: &Viewer) -> bool {
        viewer.role == Role::Admin || viewer.account_id == self.created_by
    }
}

/// A listing as returned to a particular caller.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales: Option<SalesMetadata>,
}

impl ListingView {
    /// Anonymous visitors and non-owners get the public projection only.
    pub fn public(listing: Listing) -> Self {
        Self {
            listing,
            sales: None,
        }
    }

    pub fn for_viewer(listing: Listing, viewer: Option<&Viewer>) -> Self {
        let Some(viewer) = viewer else {
            return Self::public(listing);
        };

        if !listing.can_be_managed_by(viewer) {
            return Self::public(listing);
        }

        let mut sales = listing.sales.clone();
        if viewer.role != Role::Admin {
            sales.admin_note = None;
        }
        Self {
            listing,
            sales: Some(sales),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Input for creating a listing. `created_by` comes from the session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewListing {
    #[validate(length(min = 3, max = 200, message = "title must be 3-200 characters"))]
    pub title: String,
    #[validate(length(max = 20000, message = "description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = UNBOUNDED_PRICE_SENTINEL, message = "price is out of range"))]
    pub price: i64,
    pub transaction_type: TransactionType,
    pub category: PropertyCategory,
    pub detail_type: Option<DetailType>,
    #[validate(length(max = 20, message = "rooms is too long"))]
    pub rooms: Option<String>,
    #[validate(range(min = 0.0, message = "gross_area must not be negative"))]
    pub gross_area: Option<f64>,
    #[validate(range(min = 0.0, message = "net_area must not be negative"))]
    pub net_area: Option<f64>,
    pub floor: Option<String>,
    #[validate(range(min = 0, max = 300, message = "total_floors is out of range"))]
    pub total_floors: Option<i32>,
    #[validate(range(min = 0, max = 50, message = "bathroom_count is out of range"))]
    pub bathroom_count: Option<i32>,
    pub heating: Option<String>,
    pub building_age: Option<String>,
    pub parking_type: Option<ParkingType>,
    pub has_balcony: Option<bool>,
    pub has_elevator: Option<bool>,
    pub is_furnished: Option<bool>,
    pub usage_status: Option<String>,
    pub deed_status: Option<String>,
    #[validate(range(min = 0, max = UNBOUNDED_PRICE_SENTINEL, message = "dues is out of range"))]
    pub dues: Option<i64>,
    pub is_credit_eligible: Option<bool>,
    #[validate(range(min = 0, max = UNBOUNDED_PRICE_SENTINEL, message = "credit_limit is out of range"))]
    pub credit_limit: Option<i64>,
    #[validate(length(max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(max = 100))]
    pub neighborhood: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within [-180, 180]"))]
    pub longitude: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 30, message = "too many images"))]
    pub images: Vec<String>,
    #[validate(length(max = 20))]
    pub contact_number: Option<String>,
    #[validate(length(max = 100))]
    pub customer_name: Option<String>,
    #[validate(length(max = 20))]
    pub customer_phone: Option<String>,
    pub commission_type: Option<CommissionType>,
    #[validate(length(max = 2000))]
    pub seller_note: Option<String>,
}

impl NewListing {
    /// Run the declarative field rules plus the cross-field rules.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))?;

        if self.detail_type.is_some() && self.category != PropertyCategory::Residential {
            return Err(CoreError::Validation(
                "detail_type is only meaningful for residential listings".into(),
            ));
        }
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(CoreError::Validation(
                "latitude and longitude must be provided together".into(),
            ));
        }
        if let Some(bad) = self
            .images
            .iter()
            .find(|url| !(url.starts_with("https://") || url.starts_with("http://")))
        {
            return Err(CoreError::Validation(format!(
                "image '{bad}' is not an http(s) URL"
            )));
        }
        Ok(())
    }

    /// Materialize a new, active, non-featured listing owned by `owner`.
    pub fn to_listing(&self, id: ListingId, owner: AccountId, created_at: Timestamp) -> Listing {
        Listing {
            id,
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            price: self.price,
            transaction_type: self.transaction_type,
            category: self.category,
            detail_type: self.detail_type,
            rooms: self.rooms.clone(),
            gross_area: self.gross_area,
            net_area: self.net_area,
            floor: self.floor.clone(),
            total_floors: self.total_floors,
            bathroom_count: self.bathroom_count,
            heating: self.heating.clone(),
            building_age: self.building_age.clone(),
            parking_type: self.parking_type,
            has_balcony: self.has_balcony,
            has_elevator: self.has_elevator,
            is_furnished: self.is_furnished,
            usage_status: self.usage_status.clone(),
            deed_status: self.deed_status.clone(),
            dues: self.dues,
            is_credit_eligible: self.is_credit_eligible,
            credit_limit: self.credit_limit,
            province: self.province.clone(),
            district: self.district.clone(),
            neighborhood: self.neighborhood.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            images: self.images.clone(),
            contact_number: self.contact_number.clone(),
            created_by: owner,
            is_active: true,
            featured: false,
            created_at,
            sales: SalesMetadata {
                customer_name: self.customer_name.clone(),
                customer_phone: self.customer_phone.clone(),
                commission_type: self.commission_type,
                seller_note: self.seller_note.clone(),
                admin_note: None,
            },
        }
    }
}

/// Status toggles applied by the owner (`is_active`) or an admin (both).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFlags {
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

impl ListingFlags {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.featured.is_none()
    }

    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(is_active) = self.is_active {
            listing.is_active = is_active;
        }
        if let Some(featured) = self.featured {
            listing.featured = featured;
        }
    }

    /// Only admins may promote or demote a listing to the showcase.
    pub fn authorize(&self, viewer: &Viewer) -> Result<(), CoreError> {
        if self.featured.is_some() && viewer.role != Role::Admin {
            return Err(CoreError::Forbidden(
                "Only admins can change the featured flag".into(),
            ));
        }
        Ok(())
    }
}
