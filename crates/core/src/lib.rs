//! Domain logic for the listing marketplace.
//!
//! Pure modules (`geo`, `filter`, `listing`) have no I/O. Persistence and the
//! image host are reached through the traits in [`gateway`]; the pipelines in
//! [`intake`] and [`ownership`] are written against those traits only.

pub mod account;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod geo;
pub mod intake;
pub mod listing;
pub mod ownership;
pub mod rate_limit;
pub mod roles;
pub mod submission;
pub mod types;

#[cfg(test)]
mod testing;
