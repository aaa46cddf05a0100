//! Multi-criteria listing filter.
//!
//! Query strings arrive with the catalog's loose conventions (`"all"`,
//! empty strings, comma separated tokens). [`ListingFilter::from_params`]
//! translates them once into explicit optional constraints; after that every
//! field is either `None` / empty (no constraint) or a concrete predicate.
//!
//! All predicates are pure and independent, so evaluation order does not
//! matter. [`ListingFilter::apply`] is a stable filter: the surviving
//! listings keep their input order.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::{distance_km, GeoPoint, PriceRange};
use crate::listing::{Listing, PropertyCategory, TransactionType};

/// Query-string value meaning "do not constrain this field".
pub const WILDCARD: &str = "all";

/// Default number of listings per page.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Maximum number of listings per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw query parameters of the catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    /// Comma separated room tokens, e.g. `2+1,3+1`.
    pub rooms: Option<String>,
    /// Comma separated `min-max` tokens, e.g. `0-500000,1000000-1500000`.
    pub price_ranges: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    /// Free text matched against title and location.
    pub q: Option<String>,
    pub radius_km: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// "Near me" constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub center: GeoPoint,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<PropertyCategory>,
    /// Accepted room tokens (normalized). Empty = any.
    pub rooms: Vec<String>,
    /// Accepted price ranges, OR-combined. Empty = any.
    pub price_ranges: Vec<PriceRange>,
    /// Lower-cased location constraints.
    pub province: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub proximity: Option<Proximity>,
    /// Lower-cased search terms; every term must match.
    pub terms: Vec<String>,
}

impl ListingFilter {
    /// Build a filter from query parameters.
    ///
    /// Unknown transaction types or categories are validation errors.
    /// Malformed room or price tokens never narrow the result to nothing:
    /// empty tokens are dropped and unparsable price bounds widen the range.
    pub fn from_params(params: &FilterParams) -> Result<Self, CoreError> {
        let transaction_type = non_wildcard(params.transaction_type.as_deref())
            .map(str::parse::<TransactionType>)
            .transpose()?;
        let category = non_wildcard(params.category.as_deref())
            .map(str::parse::<PropertyCategory>)
            .transpose()?;

        let rooms = split_tokens(params.rooms.as_deref())
            .map(normalize_room_token)
            .collect();
        let price_ranges = split_tokens(params.price_ranges.as_deref())
            .map(PriceRange::parse)
            .collect();

        let proximity = match (params.radius_km, params.lat, params.lng) {
            (Some(radius_km), Some(lat), Some(lng)) => {
                if !radius_km.is_finite() || radius_km <= 0.0 {
                    return Err(CoreError::Validation(
                        "radius_km must be a positive number".into(),
                    ));
                }
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                    return Err(CoreError::Validation(
                        "lat must be within [-90, 90] and lng within [-180, 180]".into(),
                    ));
                }
                Some(Proximity {
                    center: GeoPoint::new(lat, lng),
                    radius_km,
                })
            }
            _ => None,
        };

        let terms = params
            .q
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        Ok(Self {
            transaction_type,
            category,
            rooms,
            price_ranges,
            province: location_value(params.province.as_deref()),
            district: location_value(params.district.as_deref()),
            neighborhood: location_value(params.neighborhood.as_deref()),
            proximity,
            terms,
        })
    }

    /// Whether `listing` satisfies every constraint.
    pub fn matches(&self, listing: &Listing) -> bool {
        if self
            .transaction_type
            .is_some_and(|t| t != listing.transaction_type)
        {
            return false;
        }
        if self.category.is_some_and(|c| c != listing.category) {
            return false;
        }
        if !self.rooms_match(listing.rooms.as_deref()) {
            return false;
        }
        if !self.price_ranges.is_empty()
            && !self.price_ranges.iter().any(|r| r.contains(listing.price))
        {
            return false;
        }
        if !location_matches(self.province.as_deref(), listing.province.as_deref())
            || !location_matches(self.district.as_deref(), listing.district.as_deref())
            || !location_matches(self.neighborhood.as_deref(), listing.neighborhood.as_deref())
        {
            return false;
        }
        if let Some(near) = self.proximity {
            match listing.coordinates() {
                Some(point) if distance_km(near.center, point) <= near.radius_km => {}
                _ => return false,
            }
        }
        self.terms_match(listing)
    }

    /// Keep the matching listings, preserving input order.
    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }

    /// A listing without room data is never excluded by a room filter.
    fn rooms_match(&self, rooms: Option<&str>) -> bool {
        if self.rooms.is_empty() {
            return true;
        }
        let token = rooms.map(normalize_room_token).unwrap_or_default();
        token.is_empty() || self.rooms.contains(&token)
    }

    fn terms_match(&self, listing: &Listing) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let haystack = [
            Some(listing.title.as_str()),
            listing.province.as_deref(),
            listing.district.as_deref(),
            listing.neighborhood.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        self.terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of results plus the number of matches before paging.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub items: Vec<T>,
}

/// Slice `items` by the (clamped) `limit` / `offset` from `params`.
pub fn paginate<T>(items: Vec<T>, params: &FilterParams) -> Page<T> {
    let total = items.len();
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE) as usize;
    let offset = clamp_offset(params.offset) as usize;
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page { total, items }
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Canonical room token: trimmed, inner whitespace collapsed into `+`.
///
/// Query strings decode a literal `+` as a space, so `"3 1"` and `"3+1"`
/// must compare equal.
pub fn normalize_room_token(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '+')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

fn non_wildcard(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(WILDCARD))
}

fn split_tokens(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn location_value(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// An unknown (empty) listing location never excludes the listing.
fn location_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    let Some(wanted) = wanted else {
        return true;
    };
    let actual = actual.map(str::trim).unwrap_or("");
    actual.is_empty() || actual.to_lowercase() == wanted
}
