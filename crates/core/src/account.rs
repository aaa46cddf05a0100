//! Account profiles.

use serde::Serialize;

use crate::roles::Role;
use crate::types::{AccountId, Timestamp};

/// Maps an authenticated identity to its role and contact details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: AccountId,
    pub full_name: Option<String>,
    pub role: Role,
    pub whatsapp_number: Option<String>,
    pub created_at: Timestamp,
}

/// The caller of a request, as far as visibility rules are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub account_id: AccountId,
    pub role: Role,
}
