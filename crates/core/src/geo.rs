//! Geo distance and numeric range helpers used by the listing filter.
//!
//! Everything here is pure and allocation-free so it can run per listing in
//! the hot filter loop.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper bound used by the catalog's "and above" price buckets.
pub const UNBOUNDED_PRICE_SENTINEL: i64 = 999_999_999_999;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two coordinates in kilometers (haversine).
///
/// Deltas are taken as absolute values so `distance_km(a, b)` and
/// `distance_km(b, a)` evaluate the exact same floating point expression.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).abs().to_radians();
    let dlng = (b.lng - a.lng).abs().to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

// ---------------------------------------------------------------------------
// Price ranges
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`; `max == None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl PriceRange {
    /// Parse a `"<min>-<max>"` token.
    ///
    /// Never fails: an unparsable lower bound becomes `0` and an unparsable
    /// or missing upper bound becomes unbounded. The sentinel
    /// [`UNBOUNDED_PRICE_SENTINEL`] is kept as a literal bound, which is
    /// equivalent for every storable price.
    pub fn parse(token: &str) -> Self {
        let (min_part, max_part) = match token.trim().split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (token.trim(), None),
        };

        let min = parse_bound(min_part).unwrap_or(0);
        let max = max_part.and_then(parse_bound);

        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Membership test for a single range; see [`PriceRange::contains`].
pub fn in_range(value: i64, range: &PriceRange) -> bool {
    range.contains(value)
}

/// Accepts integers and decimal numbers (truncated toward zero).
fn parse_bound(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
