//! Storage and image-host seams.
//!
//! The HTTP layer and the pipelines only see these traits. `emlak-db`
//! implements the storage traits on Postgres and `emlak-media` implements
//! [`ImageHost`]; tests substitute in-memory doubles.

use async_trait::async_trait;

use crate::account::Profile;
use crate::error::{StorageError, UpstreamError};
use crate::listing::{Listing, ListingFlags, NewListing};
use crate::roles::Role;
use crate::submission::{
    CustomerRequest, FavoriteEntry, NewCustomerRequest, NewFavorite, NewOffer, OfferEntry,
};
use crate::types::{AccountId, ListingId};

#[async_trait]
pub trait ListingGateway: Send + Sync {
    /// Active listings, newest first, at most `limit`.
    async fn list_active(&self, limit: i64) -> Result<Vec<Listing>, StorageError>;

    /// Active featured listings, newest first, at most `limit`.
    async fn list_featured(&self, limit: i64) -> Result<Vec<Listing>, StorageError>;

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StorageError>;

    /// Every listing owned by `owner`, including inactive ones, newest first.
    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StorageError>;

    async fn create(&self, owner: AccountId, input: &NewListing) -> Result<Listing, StorageError>;

    /// Apply the set flags; returns `None` when the listing does not exist.
    async fn update_flags(
        &self,
        id: ListingId,
        flags: &ListingFlags,
    ) -> Result<Option<Listing>, StorageError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: ListingId) -> Result<bool, StorageError>;

    async fn count_by_owner(&self, owner: AccountId) -> Result<i64, StorageError>;

    /// Move every listing of `from` to `to`. Returns the number of rows moved.
    async fn reassign_owner(&self, from: AccountId, to: AccountId) -> Result<u64, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn insert_customer_request(&self, input: &NewCustomerRequest) -> Result<(), StorageError>;

    async fn insert_favorite(&self, input: &NewFavorite) -> Result<(), StorageError>;

    async fn insert_offer(&self, input: &NewOffer) -> Result<(), StorageError>;

    /// Newest first.
    async fn list_customer_requests(&self, limit: i64) -> Result<Vec<CustomerRequest>, StorageError>;

    /// Newest first, joined with listing titles.
    async fn list_favorites(&self, limit: i64) -> Result<Vec<FavoriteEntry>, StorageError>;

    /// Newest first, joined with listing titles.
    async fn list_offers(&self, limit: i64) -> Result<Vec<OfferEntry>, StorageError>;
}

#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn find_profile(&self, id: AccountId) -> Result<Option<Profile>, StorageError>;

    /// Newest first.
    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, StorageError>;

    /// Returns `None` when the profile does not exist.
    async fn set_role(&self, id: AccountId, role: Role) -> Result<Option<Profile>, StorageError>;
}

/// One file to publish.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store the image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, UpstreamError>;
}
