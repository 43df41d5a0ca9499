//! ============================================================================
//! Billing Module - Platform purchases and reconciliation
//! ============================================================================
//! - `types`: purchase records, product details and the platform port
//! - `reconcile`: turns platform records into persisted ownership
//! - `manager`: connection, details cache and the pending-purchase flow
//! ============================================================================

pub mod manager;
pub mod reconcile;
pub mod types;

pub use manager::{BillingManager, PendingPurchase, PurchaseLaunch};
pub use reconcile::{reconcile_purchases, PurchaseReconciler, ReconcileDelta};
pub use types::{
    BillingPlatform, ProductDetails, PurchaseRecord, PurchaseState, RequesterRegistry,
    RequesterToken, ScreenRegistry,
};
