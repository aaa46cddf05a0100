//! Submission intake: validate, normalize, rate-limit, persist.
//!
//! Each `submit_*` function runs the same ordered gates and stops at the
//! first failure:
//!
//! 1. required fields present
//! 2. trim and clamp text, reject empty name or phone
//! 3. phone at least [`MIN_PHONE_LEN`] characters
//! 4. numeric fields within `[0, MAX_AMOUNT]` (absent is allowed where optional)
//! 5. referenced listing exists and is active (favorites and offers)
//! 6. rate limit for the caller's address, skipped when the address is unknown
//! 7. persist
//!
//! Nothing is written and no rate-limit slot is consumed unless every
//! earlier gate passed.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreError;
use crate::gateway::{ListingGateway, SubmissionGateway};
use crate::listing::PropertyCategory;
use crate::rate_limit::{RateLimit, RateLimitDecision, RateLimitRule, RateLimitStore};
use crate::submission::{NewCustomerRequest, NewFavorite, NewOffer, RequestedTransaction};
use crate::types::{ListingId, Timestamp};

pub const NAME_MAX_CHARS: usize = 100;
pub const PHONE_MAX_CHARS: usize = 20;
pub const NOTE_MAX_CHARS: usize = 500;
pub const MIN_PHONE_LEN: usize = 10;

/// Upper bound for budgets and offer amounts.
pub const MAX_AMOUNT: i64 = 999_999_999_999;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Per submission type rate-limit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeLimits {
    pub customer_request: RateLimit,
    /// Offers per address, across all listings.
    pub offer_total: RateLimit,
    /// Offers per (address, listing) pair.
    pub offer_per_listing: RateLimit,
    /// `None` leaves favorites unlimited.
    pub favorite: Option<RateLimit>,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            customer_request: RateLimit::per_window(2, chrono::Duration::minutes(10))
                .with_escalation(chrono::Duration::hours(5)),
            offer_total: RateLimit::lifetime(4),
            offer_per_listing: RateLimit::lifetime(1),
            favorite: None,
        }
    }
}

impl IntakeLimits {
    /// The rule a customer request from `address` is counted against.
    pub fn customer_request_rule(&self, address: &str) -> RateLimitRule {
        RateLimitRule::new(format!("customer-request:{address}"), self.customer_request)
    }
}

/// Collaborators the pipeline needs for one submission.
#[derive(Clone, Copy)]
pub struct IntakeContext<'a> {
    pub listings: &'a dyn ListingGateway,
    pub submissions: &'a dyn SubmissionGateway,
    pub limiter: &'a dyn RateLimitStore,
    pub limits: &'a IntakeLimits,
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

// Fields stay loosely typed so the pipeline can tell "absent" from
// "present but invalid" and answer with its own messages.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerRequestForm {
    pub customer_name: Option<Value>,
    pub customer_phone: Option<Value>,
    pub listing_type: Option<Value>,
    pub property_type: Option<Value>,
    pub min_budget: Option<Value>,
    pub max_budget: Option<Value>,
    pub note: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteForm {
    pub listing_id: Option<Value>,
    pub customer_name: Option<Value>,
    pub customer_phone: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferForm {
    pub listing_id: Option<Value>,
    pub customer_name: Option<Value>,
    pub customer_phone: Option<Value>,
    pub offer_amount: Option<Value>,
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

pub async fn submit_customer_request(
    ctx: IntakeContext<'_>,
    form: CustomerRequestForm,
    address: Option<&str>,
    now: Timestamp,
) -> Result<(), CoreError> {
    require(&[
        ("customer_name", &form.customer_name),
        ("customer_phone", &form.customer_phone),
        ("listing_type", &form.listing_type),
        ("property_type", &form.property_type),
    ])?;

    let (customer_name, customer_phone) =
        contact_fields(&form.customer_name, &form.customer_phone)?;

    let min_budget = parse_amount(form.min_budget.as_ref(), "min_budget")?;
    let max_budget = parse_amount(form.max_budget.as_ref(), "max_budget")?;

    let listing_type: RequestedTransaction = scalar_text(&form.listing_type, "listing_type")?
        .trim()
        .parse()?;
    let property_type: PropertyCategory = scalar_text(&form.property_type, "property_type")?
        .trim()
        .parse()?;

    let note = optional_text(&form.note, "note")?
        .map(|n| clamp_chars(&n, NOTE_MAX_CHARS))
        .filter(|n| !n.is_empty());

    if let Some(address) = address {
        let rules = [ctx.limits.customer_request_rule(address)];
        if let RateLimitDecision::Rejected { .. } = ctx.limiter.check_and_consume(&rules, now).await? {
            tracing::info!(address, "Customer request rate limited");
            return Err(CoreError::RateLimited(format!(
                "Too many requests from this address: {} are allowed. Please try again later.",
                ctx.limits.customer_request.describe()
            )));
        }
    }

    let input = NewCustomerRequest {
        customer_name,
        customer_phone,
        listing_type,
        property_type,
        min_budget,
        max_budget,
        note,
        ip_address: address.map(str::to_string),
    };
    ctx.submissions.insert_customer_request(&input).await?;
    Ok(())
}

pub async fn submit_favorite(
    ctx: IntakeContext<'_>,
    form: FavoriteForm,
    address: Option<&str>,
    now: Timestamp,
) -> Result<(), CoreError> {
    require(&[
        ("listing_id", &form.listing_id),
        ("customer_name", &form.customer_name),
        ("customer_phone", &form.customer_phone),
    ])?;

    let (customer_name, customer_phone) =
        contact_fields(&form.customer_name, &form.customer_phone)?;
    let listing_id = parse_listing_id(&form.listing_id)?;
    ensure_listing_open(ctx.listings, listing_id).await?;

    if let (Some(address), Some(limit)) = (address, ctx.limits.favorite) {
        let rules = [RateLimitRule::new(format!("favorite:{address}"), limit)];
        if let RateLimitDecision::Rejected { .. } = ctx.limiter.check_and_consume(&rules, now).await? {
            tracing::info!(address, "Favorite rate limited");
            return Err(CoreError::RateLimited(format!(
                "Too many favorites from this address: {} are allowed. Please try again later.",
                limit.describe()
            )));
        }
    }

    let input = NewFavorite {
        listing_id,
        customer_name,
        customer_phone,
        ip_address: address.map(str::to_string),
    };
    ctx.submissions.insert_favorite(&input).await?;
    Ok(())
}

pub async fn submit_offer(
    ctx: IntakeContext<'_>,
    form: OfferForm,
    address: Option<&str>,
    now: Timestamp,
) -> Result<(), CoreError> {
    require(&[
        ("listing_id", &form.listing_id),
        ("customer_name", &form.customer_name),
        ("customer_phone", &form.customer_phone),
        ("offer_amount", &form.offer_amount),
    ])?;

    let (customer_name, customer_phone) =
        contact_fields(&form.customer_name, &form.customer_phone)?;
    let offer_amount = parse_amount(form.offer_amount.as_ref(), "offer_amount")?
        .ok_or_else(|| CoreError::Validation("offer_amount is required".into()))?;
    let listing_id = parse_listing_id(&form.listing_id)?;
    ensure_listing_open(ctx.listings, listing_id).await?;

    if let Some(address) = address {
        let rules = [
            RateLimitRule::new(format!("offer:{address}"), ctx.limits.offer_total),
            RateLimitRule::new(
                format!("offer:{address}:{listing_id}"),
                ctx.limits.offer_per_listing,
            ),
        ];
        match ctx.limiter.check_and_consume(&rules, now).await? {
            RateLimitDecision::Allowed => {}
            RateLimitDecision::Rejected { rule: 0 } => {
                tracing::info!(address, "Offer rejected by total cap");
                return Err(CoreError::RateLimited(format!(
                    "You can submit at most {} offers in total.",
                    ctx.limits.offer_total.max_requests
                )));
            }
            RateLimitDecision::Rejected { .. } => {
                tracing::info!(address, %listing_id, "Offer rejected by per-listing cap");
                return Err(CoreError::RateLimited(
                    "You have already made an offer on this listing.".into(),
                ));
            }
        }
    }

    let input = NewOffer {
        listing_id,
        customer_name,
        customer_phone,
        offer_amount,
        ip_address: address.map(str::to_string),
    };
    ctx.submissions.insert_offer(&input).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Absent, `null` and whitespace-only strings count as missing.
fn is_blank(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn require(fields: &[(&str, &Option<Value>)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Strings are taken as is; numbers and booleans by their JSON text.
fn scalar_text(value: &Option<Value>, field: &str) -> Result<String, CoreError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        None | Some(Value::Null) => Ok(String::new()),
        Some(_) => Err(CoreError::Validation(format!("{field} must be text"))),
    }
}

fn optional_text(value: &Option<Value>, field: &str) -> Result<Option<String>, CoreError> {
    if is_blank(value) {
        return Ok(None);
    }
    scalar_text(value, field).map(Some)
}

/// Trim, then keep at most `max` characters.
pub fn clamp_chars(raw: &str, max: usize) -> String {
    raw.trim().chars().take(max).collect()
}

fn contact_fields(
    name: &Option<Value>,
    phone: &Option<Value>,
) -> Result<(String, String), CoreError> {
    let name = clamp_chars(&scalar_text(name, "customer_name")?, NAME_MAX_CHARS);
    let phone = clamp_chars(&scalar_text(phone, "customer_phone")?, PHONE_MAX_CHARS);

    if name.is_empty() || phone.is_empty() {
        return Err(CoreError::Validation(
            "customer_name and customer_phone must not be empty".into(),
        ));
    }
    if phone.chars().count() < MIN_PHONE_LEN {
        return Err(CoreError::Validation(format!(
            "customer_phone must be at least {MIN_PHONE_LEN} characters"
        )));
    }
    Ok((name, phone))
}

/// Parse an optional amount.
///
/// `Ok(None)` when absent (missing, `null` or blank string); a validation
/// error when present but not a number within `[0, MAX_AMOUNT]`. Fractions
/// are rounded to the nearest whole unit.
pub fn parse_amount(value: Option<&Value>, field: &str) -> Result<Option<i64>, CoreError> {
    let number = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => None,
    };

    match number {
        Some(n) if n.is_finite() && (0.0..=MAX_AMOUNT as f64).contains(&n) => {
            Ok(Some(n.round() as i64))
        }
        _ => Err(CoreError::Validation(format!(
            "{field} must be a number between 0 and {MAX_AMOUNT}"
        ))),
    }
}

fn parse_listing_id(value: &Option<Value>) -> Result<ListingId, CoreError> {
    let raw = scalar_text(value, "listing_id")?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| CoreError::Validation("listing_id must be a valid UUID".into()))
}

async fn ensure_listing_open(
    listings: &dyn ListingGateway,
    listing_id: ListingId,
) -> Result<(), CoreError> {
    match listings.find_by_id(listing_id).await? {
        Some(listing) if listing.is_active => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "Listing {listing_id} does not exist or is no longer active"
        ))),
    }
}
