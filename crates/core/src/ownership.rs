//! Demoting a sales agent and handing their listings to another agent.
//!
//! The workflow is two ordered mutations: reassign listings, then change the
//! role. They are not wrapped in a transaction. If the role change fails
//! after listings moved, the caller gets [`CoreError::PartiallyApplied`] and
//! the listings stay with the destination agent.

use serde::{Deserialize, Serialize};

use crate::account::Profile;
use crate::error::CoreError;
use crate::gateway::{AccountGateway, ListingGateway};
use crate::roles::Role;
use crate::types::AccountId;

#[derive(Debug, Clone, Serialize)]
pub struct TransferPreview {
    pub account: Profile,
    pub listing_count: i64,
    /// Other sales agents who can take over the listings.
    pub candidates: Vec<Profile>,
}

/// What to do with the target's listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", content = "destination", rename_all = "kebab-case")]
pub enum TransferChoice {
    Reassign(AccountId),
    /// Demote without moving listings.
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemotionOutcome {
    pub account: Profile,
    pub moved_listings: u64,
    pub reassigned_to: Option<AccountId>,
}

pub async fn preview(
    listings: &dyn ListingGateway,
    accounts: &dyn AccountGateway,
    target: AccountId,
) -> Result<TransferPreview, CoreError> {
    let account = load_profile(accounts, target).await?;
    let listing_count = listings.count_by_owner(target).await?;
    let candidates = accounts
        .list_by_role(Role::SalesAgent)
        .await?
        .into_iter()
        .filter(|p| p.id != target)
        .collect();

    Ok(TransferPreview {
        account,
        listing_count,
        candidates,
    })
}

/// Move the target's listings (unless skipped) and demote them to customer.
///
/// When the target owns listings, `choice` is mandatory. A reassignment
/// failure aborts before the role is touched.
pub async fn demote_sales_agent(
    listings: &dyn ListingGateway,
    accounts: &dyn AccountGateway,
    target: AccountId,
    choice: Option<TransferChoice>,
) -> Result<DemotionOutcome, CoreError> {
    let account = load_profile(accounts, target).await?;
    if account.role != Role::SalesAgent {
        return Err(CoreError::Conflict(format!(
            "Account {target} is not a sales agent"
        )));
    }

    let owned = listings.count_by_owner(target).await?;
    let destination = match (owned, choice) {
        (0, _) | (_, Some(TransferChoice::Skip)) => None,
        (_, Some(TransferChoice::Reassign(destination))) => {
            validate_destination(accounts, target, destination).await?;
            Some(destination)
        }
        (n, None) => {
            return Err(CoreError::Validation(format!(
                "Account owns {n} listings; choose a destination agent or skip the transfer"
            )));
        }
    };

    let mut moved_listings = 0;
    if let Some(destination) = destination {
        moved_listings = listings.reassign_owner(target, destination).await?;
        tracing::info!(%target, %destination, moved_listings, "Listings reassigned");
    }

    let account = match accounts.set_role(target, Role::Customer).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Err(CoreError::NotFound {
                entity: "profile",
                id: target,
            })
        }
        Err(source) if moved_listings > 0 => {
            return Err(CoreError::PartiallyApplied {
                message: format!(
                    "{moved_listings} listings were already moved to the new agent, \
                     but the role change failed. Retry the role change."
                ),
                source,
            });
        }
        Err(source) => return Err(source.into()),
    };
    tracing::info!(%target, "Sales agent demoted to customer");

    Ok(DemotionOutcome {
        account,
        moved_listings,
        reassigned_to: destination,
    })
}

async fn load_profile(accounts: &dyn AccountGateway, id: AccountId) -> Result<Profile, CoreError> {
    accounts
        .find_profile(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "profile",
            id,
        })
}

async fn validate_destination(
    accounts: &dyn AccountGateway,
    target: AccountId,
    destination: AccountId,
) -> Result<(), CoreError> {
    if destination == target {
        return Err(CoreError::Validation(
            "Destination must be a different account".into(),
        ));
    }
    match accounts.find_profile(destination).await? {
        Some(profile) if profile.role == Role::SalesAgent => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "Destination {destination} is not a sales agent"
        ))),
    }
}
