#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use emlak_api::auth::jwt::{Claims, JwtConfig};
use emlak_api::config::{RateLimitBackend, ServerConfig};
use emlak_api::router::build_app_router;
use emlak_api::state::AppState;
use emlak_core::account::Profile;
use emlak_core::error::{StorageError, UpstreamError};
use emlak_core::gateway::{
    AccountGateway, ImageHost, ImageUpload, ListingGateway, SubmissionGateway,
};
use emlak_core::intake::IntakeLimits;
use emlak_core::listing::{Listing, ListingFlags, NewListing};
use emlak_core::rate_limit::{
    MemoryRateLimiter, RateLimitDecision, RateLimitRule, RateLimitStore,
};
use emlak_core::roles::Role;
use emlak_core::submission::{
    CustomerRequest, FavoriteEntry, NewCustomerRequest, NewFavorite, NewOffer, OfferEntry,
};
use emlak_core::types::{AccountId, ListingId, Timestamp};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:3001` as CORS origin (matching the dev default)
/// and the production intake limits.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        database_max_connections: 1,
        upload_max_bytes: 1024 * 1024,
        listing_snapshot_limit: 60,
        featured_limit: 9,
        rate_limit_backend: RateLimitBackend::Memory,
        intake_limits: IntakeLimits::default(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            audience: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// Everything a test needs: the doubles behind the router, kept so the test
/// can seed and inspect them.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub images: Arc<FakeImageHost>,
    pub limiter: Arc<MemoryRateLimiter>,
    pub config: ServerConfig,
    pub image_host_configured: bool,
    pub limiter_fails: bool,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            images: Arc::new(FakeImageHost::default()),
            limiter: Arc::new(MemoryRateLimiter::new()),
            config,
            image_host_configured: true,
            limiter_fails: false,
        }
    }

    pub fn without_image_host(mut self) -> Self {
        self.image_host_configured = false;
        self
    }

    /// Swap the limiter for one whose store is unreachable.
    pub fn with_failing_limiter(mut self) -> Self {
        self.limiter_fails = true;
        self
    }

    /// A fresh router over the shared doubles. `oneshot` consumes the
    /// router, so build one per request.
    pub fn router(&self) -> Router {
        let images: Option<Arc<dyn ImageHost>> = if self.image_host_configured {
            Some(self.images.clone())
        } else {
            None
        };
        let limiter: Arc<dyn RateLimitStore> = if self.limiter_fails {
            Arc::new(FailingLimiter)
        } else {
            self.limiter.clone()
        };
        let state = AppState {
            listings: self.store.clone(),
            submissions: self.store.clone(),
            accounts: self.store.clone(),
            limiter,
            images,
            config: Arc::new(self.config.clone()),
        };
        build_app_router(state, &self.config)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// Register a profile and return a bearer token for it.
    pub fn login(&self, role: Role) -> (AccountId, String) {
        let id = self.store.add_profile(role);
        (id, token_for(id))
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub fn token_for(account: AccountId) -> String {
    let claims = Claims {
        sub: account,
        exp: Utc::now().timestamp() + 3600,
        aud: Some("authenticated".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// POST a JSON body as if relayed by a proxy for `address`.
pub fn post_from(uri: &str, address: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", address)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn new_listing_json() -> Value {
    json!({
        "title": "Sunny 3+1 near the coast",
        "description": "Sea view, renovated kitchen",
        "price": 1_500_000,
        "transaction_type": "for-sale",
        "category": "residential",
        "detail_type": "apartment",
        "rooms": "3+1",
        "gross_area": 140.0,
        "net_area": 120.0,
        "province": "Istanbul",
        "district": "Kadikoy",
        "neighborhood": "Suadiye",
        "latitude": 40.96,
        "longitude": 29.08,
        "images": ["https://res.cloudinary.com/demo/image/upload/a.jpg"],
        "customer_name": "Seller Person",
        "customer_phone": "05551112233",
        "commission_type": "included",
        "seller_note": "Keys with the doorman"
    })
}

pub fn sample_listing(owner: AccountId) -> Listing {
    let input: NewListing = serde_json::from_value(new_listing_json()).unwrap();
    input.to_listing(Uuid::new_v4(), owner, Utc::now())
}

// ---------------------------------------------------------------------------
// In-memory gateway
// ---------------------------------------------------------------------------

/// Storage double implementing every gateway trait, with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    listings: Mutex<Vec<Listing>>,
    profiles: Mutex<Vec<Profile>>,
    customer_requests: Mutex<Vec<CustomerRequest>>,
    favorites: Mutex<Vec<FavoriteEntry>>,
    offers: Mutex<Vec<OfferEntry>>,
    fail_inserts: AtomicBool,
    fail_reads: AtomicBool,
    fail_set_role: AtomicBool,
}

impl MemoryStore {
    pub fn add_profile(&self, role: Role) -> AccountId {
        let id = Uuid::new_v4();
        self.profiles.lock().unwrap().push(Profile {
            id,
            full_name: Some(format!("{role} account")),
            role,
            whatsapp_number: None,
            created_at: Utc::now(),
        });
        id
    }

    pub fn insert_listing(&self, listing: Listing) -> ListingId {
        let id = listing.id;
        self.listings.lock().unwrap().push(listing);
        id
    }

    pub fn add_listing(&self, owner: AccountId) -> ListingId {
        self.insert_listing(sample_listing(owner))
    }

    pub fn listing(&self, id: ListingId) -> Option<Listing> {
        self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }

    pub fn role_of(&self, id: AccountId) -> Option<Role> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.role)
    }

    pub fn owned_by(&self, owner: AccountId) -> usize {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.created_by == owner)
            .count()
    }

    pub fn customer_requests(&self) -> Vec<CustomerRequest> {
        self.customer_requests.lock().unwrap().clone()
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.favorites.lock().unwrap().clone()
    }

    pub fn offers(&self) -> Vec<OfferEntry> {
        self.offers.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_role(&self, fail: bool) {
        self.fail_set_role.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::new("connection refused: secret-host:5432"))
        } else {
            Ok(())
        }
    }

    fn title_of(&self, id: ListingId) -> Option<String> {
        self.listing(id).map(|l| l.title)
    }
}

/// Newest first, like the SQL queries.
fn newest_first<T: Clone>(items: &[T], limit: i64) -> Vec<T> {
    items.iter().rev().take(limit as usize).cloned().collect()
}

#[async_trait]
impl ListingGateway for MemoryStore {
    async fn list_active(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        Self::check(&self.fail_reads)?;
        let active: Vec<_> = self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.is_active)
            .cloned()
            .collect();
        Ok(newest_first(&active, limit))
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        Self::check(&self.fail_reads)?;
        let featured: Vec<_> = self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.is_active && l.featured)
            .cloned()
            .collect();
        Ok(newest_first(&featured, limit))
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StorageError> {
        Self::check(&self.fail_reads)?;
        Ok(self.listing(id))
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StorageError> {
        Self::check(&self.fail_reads)?;
        let owned: Vec<_> = self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.created_by == owner)
            .cloned()
            .collect();
        Ok(newest_first(&owned, i64::MAX))
    }

    async fn create(&self, owner: AccountId, input: &NewListing) -> Result<Listing, StorageError> {
        Self::check(&self.fail_inserts)?;
        let listing = input.to_listing(Uuid::new_v4(), owner, Utc::now());
        self.listings.lock().unwrap().push(listing.clone());
        Ok(listing)
    }

    async fn update_flags(
        &self,
        id: ListingId,
        flags: &ListingFlags,
    ) -> Result<Option<Listing>, StorageError> {
        let mut listings = self.listings.lock().unwrap();
        Ok(listings.iter_mut().find(|l| l.id == id).map(|l| {
            flags.apply_to(l);
            l.clone()
        }))
    }

    async fn delete(&self, id: ListingId) -> Result<bool, StorageError> {
        let mut listings = self.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() != before)
    }

    async fn count_by_owner(&self, owner: AccountId) -> Result<i64, StorageError> {
        Ok(self.owned_by(owner) as i64)
    }

    async fn reassign_owner(&self, from: AccountId, to: AccountId) -> Result<u64, StorageError> {
        let mut moved = 0;
        for listing in self.listings.lock().unwrap().iter_mut() {
            if listing.created_by == from {
                listing.created_by = to;
                moved += 1;
            }
        }
        Ok(moved)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Self::check(&self.fail_reads)
    }
}

#[async_trait]
impl SubmissionGateway for MemoryStore {
    async fn insert_customer_request(&self, input: &NewCustomerRequest) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.customer_requests.lock().unwrap().push(CustomerRequest {
            id: Uuid::new_v4(),
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            listing_type: input.listing_type,
            property_type: input.property_type,
            min_budget: input.min_budget,
            max_budget: input.max_budget,
            note: input.note.clone(),
            ip_address: input.ip_address.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_favorite(&self, input: &NewFavorite) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.favorites.lock().unwrap().push(FavoriteEntry {
            id: Uuid::new_v4(),
            listing_id: input.listing_id,
            listing_title: None,
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            ip_address: input.ip_address.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_offer(&self, input: &NewOffer) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.offers.lock().unwrap().push(OfferEntry {
            id: Uuid::new_v4(),
            listing_id: input.listing_id,
            listing_title: None,
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            offer_amount: input.offer_amount,
            ip_address: input.ip_address.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_customer_requests(&self, limit: i64) -> Result<Vec<CustomerRequest>, StorageError> {
        Self::check(&self.fail_reads)?;
        Ok(newest_first(&self.customer_requests(), limit))
    }

    async fn list_favorites(&self, limit: i64) -> Result<Vec<FavoriteEntry>, StorageError> {
        Self::check(&self.fail_reads)?;
        let mut rows = newest_first(&self.favorites(), limit);
        for row in &mut rows {
            row.listing_title = self.title_of(row.listing_id);
        }
        Ok(rows)
    }

    async fn list_offers(&self, limit: i64) -> Result<Vec<OfferEntry>, StorageError> {
        Self::check(&self.fail_reads)?;
        let mut rows = newest_first(&self.offers(), limit);
        for row in &mut rows {
            row.listing_title = self.title_of(row.listing_id);
        }
        Ok(rows)
    }
}

#[async_trait]
impl AccountGateway for MemoryStore {
    async fn find_profile(&self, id: AccountId) -> Result<Option<Profile>, StorageError> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        Ok(newest_first(&self.profiles.lock().unwrap(), i64::MAX))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, StorageError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().filter(|p| p.role == role).cloned().collect())
    }

    async fn set_role(&self, id: AccountId, role: Role) -> Result<Option<Profile>, StorageError> {
        Self::check(&self.fail_set_role)?;
        let mut profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter_mut().find(|p| p.id == id).map(|p| {
            p.role = role;
            p.clone()
        }))
    }
}

// ---------------------------------------------------------------------------
// Image host double
// ---------------------------------------------------------------------------

/// Records uploads and answers with deterministic URLs.
#[derive(Default)]
pub struct FakeImageHost {
    uploads: Mutex<Vec<ImageUpload>>,
    /// Uploads whose file name matches fail.
    fail_on: Mutex<Option<String>>,
}

impl FakeImageHost {
    pub fn fail_on(&self, file_name: &str) {
        *self.fail_on.lock().unwrap() = Some(file_name.to_string());
    }

    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, UpstreamError> {
        if self.fail_on.lock().unwrap().as_deref() == Some(image.file_name.as_str()) {
            return Err(UpstreamError::Rejected {
                status: 401,
                body: "invalid signature".to_string(),
            });
        }
        let url = format!("https://images.test/{}", image.file_name);
        self.uploads.lock().unwrap().push(image);
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Failing rate limiter
// ---------------------------------------------------------------------------

pub struct FailingLimiter;

#[async_trait]
impl RateLimitStore for FailingLimiter {
    async fn check_and_consume(
        &self,
        _rules: &[RateLimitRule],
        _now: Timestamp,
    ) -> Result<RateLimitDecision, StorageError> {
        Err(StorageError::new("connection refused: limiter-host:5432"))
    }
}
