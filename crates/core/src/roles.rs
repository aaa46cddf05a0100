//! Account roles.
//!
//! The string forms must match the `profiles.role` check constraint in
//! `20260301000002_create_profiles_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SALES_AGENT: &str = "sales-agent";
pub const ROLE_CUSTOMER: &str = "customer";

/// All valid role names, in privilege order.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SALES_AGENT, ROLE_CUSTOMER];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    SalesAgent,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::SalesAgent => ROLE_SALES_AGENT,
            Role::Customer => ROLE_CUSTOMER,
        }
    }

    /// Admins and sales agents see submitted leads, favorites and offers.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::SalesAgent)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_SALES_AGENT => Ok(Role::SalesAgent),
            ROLE_CUSTOMER => Ok(Role::Customer),
            other => Err(CoreError::Validation(format!(
                "Unknown role: '{other}'. Valid roles: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}
