/// Every persisted record is keyed by a UUID issued by the storage layer.
pub type EntityId = uuid::Uuid;

/// Primary key of a listing.
pub type ListingId = EntityId;

/// Primary key of an account (same id as the external auth service's user).
pub type AccountId = EntityId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
