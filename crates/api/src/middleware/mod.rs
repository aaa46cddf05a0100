//! Authentication and authorization extractors.
//!
//! - [`auth::Session`] -- Validates the bearer token and loads the caller's profile.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaff`] -- Requires `sales-agent` or `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any account with a profile.

pub mod auth;
pub mod rbac;
