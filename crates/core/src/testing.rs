//! In-memory gateway double shared by the unit tests of this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::account::Profile;
use crate::error::StorageError;
use crate::gateway::{AccountGateway, ListingGateway, SubmissionGateway};
use crate::listing::tests::sample_listing;
use crate::listing::{Listing, ListingFlags, NewListing};
use crate::rate_limit::{RateLimitDecision, RateLimitRule, RateLimitStore};
use crate::roles::Role;
use crate::submission::{
    CustomerRequest, FavoriteEntry, NewCustomerRequest, NewFavorite, NewOffer, OfferEntry,
};
use crate::types::{AccountId, ListingId, Timestamp};

#[derive(Default)]
pub(crate) struct FakeStore {
    listings: Mutex<Vec<Listing>>,
    profiles: Mutex<Vec<Profile>>,
    customer_requests: Mutex<Vec<NewCustomerRequest>>,
    favorites: Mutex<Vec<NewFavorite>>,
    offers: Mutex<Vec<NewOffer>>,
    fail_inserts: AtomicBool,
    fail_reassign: AtomicBool,
    fail_set_role: AtomicBool,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_listing(&self, owner: AccountId, is_active: bool) -> ListingId {
        let mut listing = sample_listing(owner);
        listing.is_active = is_active;
        let id = listing.id;
        self.listings.lock().unwrap().push(listing);
        id
    }

    pub(crate) fn add_profile(&self, role: Role) -> AccountId {
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

    pub(crate) fn role_of(&self, id: AccountId) -> Option<Role> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.role)
    }

    pub(crate) fn owned_by(&self, owner: AccountId) -> usize {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.created_by == owner)
            .count()
    }

    pub(crate) fn customer_requests(&self) -> Vec<NewCustomerRequest> {
        self.customer_requests.lock().unwrap().clone()
    }

    pub(crate) fn favorites(&self) -> Vec<NewFavorite> {
        self.favorites.lock().unwrap().clone()
    }

    pub(crate) fn offers(&self) -> Vec<NewOffer> {
        self.offers.lock().unwrap().clone()
    }

    pub(crate) fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_reassign(&self, fail: bool) {
        self.fail_reassign.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_set_role(&self, fail: bool) {
        self.fail_set_role.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::new("injected failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ListingGateway for FakeStore {
    async fn list_active(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        let listings = self.listings.lock().unwrap();
        Ok(listings
            .iter()
            .rev()
            .filter(|l| l.is_active)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        let listings = self.listings.lock().unwrap();
        Ok(listings
            .iter()
            .rev()
            .filter(|l| l.is_active && l.featured)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StorageError> {
        Ok(self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StorageError> {
        let listings = self.listings.lock().unwrap();
        Ok(listings
            .iter()
            .rev()
            .filter(|l| l.created_by == owner)
            .cloned()
            .collect())
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
        Self::check(&self.fail_reassign)?;
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
        Ok(())
    }
}

#[async_trait]
impl SubmissionGateway for FakeStore {
    async fn insert_customer_request(&self, input: &NewCustomerRequest) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.customer_requests.lock().unwrap().push(input.clone());
        Ok(())
    }

    async fn insert_favorite(&self, input: &NewFavorite) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.favorites.lock().unwrap().push(input.clone());
        Ok(())
    }

    async fn insert_offer(&self, input: &NewOffer) -> Result<(), StorageError> {
        Self::check(&self.fail_inserts)?;
        self.offers.lock().unwrap().push(input.clone());
        Ok(())
    }

    async fn list_customer_requests(&self, _limit: i64) -> Result<Vec<CustomerRequest>, StorageError> {
        Ok(Vec::new())
    }

    async fn list_favorites(&self, _limit: i64) -> Result<Vec<FavoriteEntry>, StorageError> {
        Ok(Vec::new())
    }

    async fn list_offers(&self, _limit: i64) -> Result<Vec<OfferEntry>, StorageError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl AccountGateway for FakeStore {
    async fn find_profile(&self, id: AccountId) -> Result<Option<Profile>, StorageError> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        Ok(self.profiles.lock().unwrap().clone())
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

/// A limiter whose backing store is unreachable.
pub(crate) struct FailingLimiter;

#[async_trait]
impl RateLimitStore for FailingLimiter {
    async fn check_and_consume(
        &self,
        _rules: &[RateLimitRule],
        _now: Timestamp,
    ) -> Result<RateLimitDecision, StorageError> {
        Err(StorageError::new("rate limit store unavailable"))
    }
}
