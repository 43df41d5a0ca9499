//! Billing data shapes and the platform port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::types::PlatformError;

/// Platform-reported state of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseState {
    Purchased,
    Pending,
    Unspecified,
}

/// One purchase as reported by the billing platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub product_ids: Vec<String>,
    pub purchase_token: String,
    pub state: PurchaseState,
    #[serde(default)]
    pub acknowledged: bool,
}

impl PurchaseRecord {
    pub fn purchased(product_id: &str, token: &str) -> Self {
        Self {
            product_ids: vec![product_id.to_string()],
            purchase_token: token.to_string(),
            state: PurchaseState::Purchased,
            acknowledged: false,
        }
    }

    pub fn is_purchased(&self) -> bool {
        self.state == PurchaseState::Purchased
    }
}

/// Live store listing for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub product_id: String,
    pub price_formatted: String,
}

/// Billing SDK boundary. Purchase-updated pushes are delivered by the host
/// to `BillingManager::on_purchases_updated`.
#[async_trait]
pub trait BillingPlatform: Send + Sync {
    async fn start_connection(&self) -> Result<(), PlatformError>;

    async fn query_product_details(
        &self,
        product_ids: &[String],
    ) -> Result<Vec<ProductDetails>, PlatformError>;

    /// Every purchase the platform currently considers owned
    async fn query_owned_purchases(&self) -> Result<Vec<PurchaseRecord>, PlatformError>;

    /// `Ok(false)` when the platform declined to open the flow
    async fn launch_purchase_flow(&self, product_id: &str) -> Result<bool, PlatformError>;

    async fn acknowledge(&self, purchase_token: &str) -> Result<(), PlatformError>;

    async fn end_connection(&self);
}

/// Non-owning handle to the screen that asked for a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterToken(pub Uuid);

impl RequesterToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequesterToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness check for requesters of deferred purchases
pub trait RequesterRegistry: Send + Sync {
    fn is_still_valid(&self, token: RequesterToken) -> bool;
}

/// Tracks which screens are still showing
#[derive(Debug, Default)]
pub struct ScreenRegistry {
    live: Mutex<HashSet<RequesterToken>>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> RequesterToken {
        let token = RequesterToken::new();
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token);
        token
    }

    pub fn dismiss(&self, token: RequesterToken) {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&token);
    }
}

impl RequesterRegistry for ScreenRegistry {
    fn is_still_valid(&self, token: RequesterToken) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&token)
    }
}
