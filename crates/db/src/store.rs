//! Postgres implementation of the storage gateways.

use async_trait::async_trait;

use emlak_core::account::Profile;
use emlak_core::error::StorageError;
use emlak_core::gateway::{AccountGateway, ListingGateway, SubmissionGateway};
use emlak_core::listing::{Listing, ListingFlags, NewListing};
use emlak_core::roles::Role;
use emlak_core::submission::{
    CustomerRequest, FavoriteEntry, NewCustomerRequest, NewFavorite, NewOffer, OfferEntry,
};
use emlak_core::types::{AccountId, ListingId};

use crate::repositories::{ListingRepo, ProfileRepo, SubmissionRepo};
use crate::DbPool;

/// Gateway over a connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn storage(err: sqlx::Error) -> StorageError {
    StorageError::new(err)
}

/// Convert every row, failing on the first malformed one.
fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StorageError>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl ListingGateway for PgStore {
    async fn list_active(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        let rows = ListingRepo::list_active(&self.pool, limit).await.map_err(storage)?;
        convert_all(rows)
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Listing>, StorageError> {
        let rows = ListingRepo::list_featured(&self.pool, limit).await.map_err(storage)?;
        convert_all(rows)
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, StorageError> {
        ListingRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage)?
            .map(Listing::try_from)
            .transpose()
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Listing>, StorageError> {
        let rows = ListingRepo::list_by_owner(&self.pool, owner).await.map_err(storage)?;
        convert_all(rows)
    }

    async fn create(&self, owner: AccountId, input: &NewListing) -> Result<Listing, StorageError> {
        let row = ListingRepo::create(&self.pool, owner, input).await.map_err(storage)?;
        Listing::try_from(row)
    }

    async fn update_flags(
        &self,
        id: ListingId,
        flags: &ListingFlags,
    ) -> Result<Option<Listing>, StorageError> {
        ListingRepo::update_flags(&self.pool, id, flags.is_active, flags.featured)
            .await
            .map_err(storage)?
            .map(Listing::try_from)
            .transpose()
    }

    async fn delete(&self, id: ListingId) -> Result<bool, StorageError> {
        ListingRepo::delete(&self.pool, id).await.map_err(storage)
    }

    async fn count_by_owner(&self, owner: AccountId) -> Result<i64, StorageError> {
        ListingRepo::count_by_owner(&self.pool, owner).await.map_err(storage)
    }

    async fn reassign_owner(&self, from: AccountId, to: AccountId) -> Result<u64, StorageError> {
        ListingRepo::reassign_owner(&self.pool, from, to)
            .await
            .map_err(storage)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        crate::health_check(&self.pool).await.map_err(storage)
    }
}

#[async_trait]
impl SubmissionGateway for PgStore {
    async fn insert_customer_request(&self, input: &NewCustomerRequest) -> Result<(), StorageError> {
        SubmissionRepo::insert_customer_request(&self.pool, input)
            .await
            .map_err(storage)
    }

    async fn insert_favorite(&self, input: &NewFavorite) -> Result<(), StorageError> {
        SubmissionRepo::insert_favorite(&self.pool, input)
            .await
            .map_err(storage)
    }

    async fn insert_offer(&self, input: &NewOffer) -> Result<(), StorageError> {
        SubmissionRepo::insert_offer(&self.pool, input)
            .await
            .map_err(storage)
    }

    async fn list_customer_requests(&self, limit: i64) -> Result<Vec<CustomerRequest>, StorageError> {
        let rows = SubmissionRepo::list_customer_requests(&self.pool, limit)
            .await
            .map_err(storage)?;
        convert_all(rows)
    }

    async fn list_favorites(&self, limit: i64) -> Result<Vec<FavoriteEntry>, StorageError> {
        let rows = SubmissionRepo::list_favorites(&self.pool, limit)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(FavoriteEntry::from).collect())
    }

    async fn list_offers(&self, limit: i64) -> Result<Vec<OfferEntry>, StorageError> {
        let rows = SubmissionRepo::list_offers(&self.pool, limit)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(OfferEntry::from).collect())
    }
}

#[async_trait]
impl AccountGateway for PgStore {
    async fn find_profile(&self, id: AccountId) -> Result<Option<Profile>, StorageError> {
        ProfileRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage)?
            .map(Profile::try_from)
            .transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let rows = ProfileRepo::list(&self.pool).await.map_err(storage)?;
        convert_all(rows)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, StorageError> {
        let rows = ProfileRepo::list_by_role(&self.pool, role).await.map_err(storage)?;
        convert_all(rows)
    }

    async fn set_role(&self, id: AccountId, role: Role) -> Result<Option<Profile>, StorageError> {
        ProfileRepo::set_role(&self.pool, id, role)
            .await
            .map_err(storage)?
            .map(Profile::try_from)
            .transpose()
    }
}
