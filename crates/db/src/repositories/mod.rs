//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or a connection, for statements that must share a transaction)
//! as the first argument.

pub mod listing_repo;
pub mod profile_repo;
pub mod rate_limit_repo;
pub mod submission_repo;

pub use listing_repo::ListingRepo;
pub use profile_repo::ProfileRepo;
pub use rate_limit_repo::RateLimitRepo;
pub use submission_repo::SubmissionRepo;
