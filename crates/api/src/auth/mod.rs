//! Authentication primitives.
//!
//! - [`jwt`] -- validation of access tokens issued by the external auth service.

pub mod jwt;
