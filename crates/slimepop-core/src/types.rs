//! ============================================================================
//! Error Types for the Slime Pop Economy
//! ============================================================================
//! `EconomyError` is what player-facing operations return. A blocked purchase
//! (`PurchaseUnavailable`) and a short wallet (`InsufficientCoins`) are
//! different failures and render different messages.
//!
//! `PlatformError` is what the billing, ads and cloud collaborators report.
//! Callers convert it to "nothing happened, try later".
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Failure of a player-facing economy operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EconomyError {
    #[error("Insufficient coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u64, available: u64 },

    #[error("Purchase unavailable: {0}")]
    PurchaseUnavailable(String),

    #[error("Product not owned: {0}")]
    NotOwned(String),

    #[error("Product already owned: {0}")]
    AlreadyOwned(String),

    #[error("Product cannot be bought with coins: {0}")]
    NotCoinPurchasable(String),

    #[error("Rewarded ad not ready")]
    AdNotReady,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EconomyError {
    /// Message suitable for showing to the player
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientCoins { needed, available } => format!(
                "Not enough coins. You need {} more.",
                needed.saturating_sub(*available)
            ),
            Self::PurchaseUnavailable(_) => {
                "Purchases are unavailable right now. Check your connection and try again."
                    .to_string()
            }
            Self::NotOwned(_) => "Unlock this item first.".to_string(),
            Self::AlreadyOwned(_) => "You already own this item.".to_string(),
            Self::NotCoinPurchasable(_) => "This item is a premium purchase.".to_string(),
            Self::AdNotReady => "No ad available right now. Try again later.".to_string(),
            Self::Storage(_) => "Something went wrong saving your progress.".to_string(),
        }
    }
}

impl From<anyhow::Error> for EconomyError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Failure reported by an external platform collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PlatformError {
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Platform call timed out")]
    Timeout,

    #[error("Platform rejected request: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_purchase_and_short_wallet_read_differently() {
        let offline = EconomyError::PurchaseUnavailable("offline".into());
        let short = EconomyError::InsufficientCoins {
            needed: 500,
            available: 120,
        };
        assert_ne!(offline.user_message(), short.user_message());
        assert!(short.user_message().contains("380"));
        assert!(offline.user_message().contains("unavailable"));
    }

    #[test]
    fn test_storage_from_anyhow() {
        let err: EconomyError = anyhow::anyhow!("disk full").into();
        assert_eq!(err, EconomyError::Storage("disk full".into()));
    }
}
