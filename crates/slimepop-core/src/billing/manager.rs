//! ============================================================================
//! Billing Manager - Drives the billing platform
//! ============================================================================
//! Caches live product details, launches purchase flows and feeds platform
//! results into reconciliation.
//!
//! A buy requested before details are cached parks as the single pending
//! purchase. The next successful details refresh launches it, unless its
//! requester has gone away, in which case it is dropped without retry.
//! Platform failures never touch already-granted entitlements.
//! ============================================================================

use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::reconcile::{PurchaseReconciler, ReconcileDelta};
use super::types::{BillingPlatform, ProductDetails, PurchaseRecord, RequesterRegistry, RequesterToken};
use crate::monetization::MonetizationPolicy;
use crate::types::EconomyError;

/// A buy waiting on product details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPurchase {
    pub product_id: String,
    pub requester: RequesterToken,
}

/// Result of asking for a platform purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseLaunch {
    /// The platform purchase flow is open
    Launched,
    /// Parked until product details arrive
    AwaitingDetails,
}

pub struct BillingManager<P: BillingPlatform> {
    platform: Arc<P>,
    policy: MonetizationPolicy,
    reconciler: Arc<PurchaseReconciler>,
    registry: Arc<dyn RequesterRegistry>,
    details: RwLock<HashMap<String, ProductDetails>>,
    pending: Mutex<Option<PendingPurchase>>,
    connected: AtomicBool,
}

impl<P: BillingPlatform> BillingManager<P> {
    pub fn new(
        platform: Arc<P>,
        policy: MonetizationPolicy,
        reconciler: Arc<PurchaseReconciler>,
        registry: Arc<dyn RequesterRegistry>,
    ) -> Self {
        Self {
            platform,
            policy,
            reconciler,
            registry,
            details: RwLock::new(HashMap::new()),
            pending: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Connect, fetch details and restore purchases. `false` when the
    /// platform is unavailable; nothing else changes in that case.
    pub async fn start(&self) -> Result<bool> {
        if let Err(e) = self.platform.start_connection().await {
            warn!("Billing connection failed: {}", e);
            return Ok(false);
        }
        self.connected.store(true, Ordering::SeqCst);
        info!("Billing connected");

        self.refresh_product_details().await;
        self.restore_purchases().await?;
        Ok(true)
    }

    pub async fn end(&self) {
        self.platform.end_connection().await;
        self.connected.store(false, Ordering::SeqCst);
        self.details.write().await.clear();
        *self.pending.lock().await = None;
        info!("Billing disconnected");
    }

    /// Replace the details cache from the platform, then resume a parked
    /// purchase. Returns whether a parked purchase was launched.
    pub async fn refresh_product_details(&self) -> bool {
        let ids = self.policy.billing_product_ids();
        match self.platform.query_product_details(&ids).await {
            Ok(list) => {
                let mut cache = self.details.write().await;
                cache.clear();
                for d in list {
                    cache.insert(d.product_id.clone(), d);
                }
                debug!("Cached details for {} products", cache.len());
            }
            Err(e) => {
                warn!("Product details unavailable: {}", e);
                return false;
            }
        }
        self.resume_pending().await
    }

    async fn resume_pending(&self) -> bool {
        let pending = self.pending.lock().await.take();
        let Some(pending) = pending else {
            return false;
        };

        if !self.registry.is_still_valid(pending.requester) {
            debug!("Dropping pending purchase of {}: requester gone", pending.product_id);
            return false;
        }
        if !self.has_details(&pending.product_id).await {
            debug!("Still no details for {}", pending.product_id);
            *self.pending.lock().await = Some(pending);
            return false;
        }

        match self.platform.launch_purchase_flow(&pending.product_id).await {
            Ok(true) => {
                info!("Resumed purchase flow for {}", pending.product_id);
                true
            }
            Ok(false) => {
                warn!("Platform declined purchase flow for {}", pending.product_id);
                false
            }
            Err(e) => {
                warn!("Purchase flow for {} failed: {}", pending.product_id, e);
                false
            }
        }
    }

    pub async fn has_details(&self, product_id: &str) -> bool {
        self.details.read().await.contains_key(product_id)
    }

    /// Live formatted price, if the platform has supplied one
    pub async fn formatted_price(&self, product_id: &str) -> Option<String> {
        self.details
            .read()
            .await
            .get(product_id)
            .map(|d| d.price_formatted.clone())
    }

    pub async fn pending_purchase(&self) -> Option<PendingPurchase> {
        self.pending.lock().await.clone()
    }

    /// Start a platform purchase for `product_id` on behalf of `requester`
    pub async fn request_purchase(
        &self,
        product_id: &str,
        requester: RequesterToken,
    ) -> Result<PurchaseLaunch, EconomyError> {
        if !self.policy.requires_platform_purchase(product_id) {
            return Err(EconomyError::PurchaseUnavailable(format!(
                "{} is not sold through the store",
                product_id
            )));
        }
        if !self.is_connected() {
            return Err(EconomyError::PurchaseUnavailable(
                "billing not connected".to_string(),
            ));
        }

        if !self.has_details(product_id).await {
            debug!("Parking purchase of {} until details arrive", product_id);
            *self.pending.lock().await = Some(PendingPurchase {
                product_id: product_id.to_string(),
                requester,
            });
            return Ok(PurchaseLaunch::AwaitingDetails);
        }

        match self.platform.launch_purchase_flow(product_id).await {
            Ok(true) => Ok(PurchaseLaunch::Launched),
            Ok(false) => Err(EconomyError::PurchaseUnavailable(
                "store declined the purchase".to_string(),
            )),
            Err(e) => Err(EconomyError::PurchaseUnavailable(e.to_string())),
        }
    }

    /// Query every current purchase and reconcile silently. `None` when the
    /// platform could not answer.
    pub async fn restore_purchases(&self) -> Result<Option<ReconcileDelta>> {
        match self.platform.query_owned_purchases().await {
            Ok(records) => Ok(Some(self.apply(&records, true).await?)),
            Err(e) => {
                warn!("Purchase query failed, keeping current ownership: {}", e);
                Ok(None)
            }
        }
    }

    /// Purchase-updated push from the platform
    pub async fn on_purchases_updated(&self, records: &[PurchaseRecord]) -> Result<ReconcileDelta> {
        self.apply(records, false).await
    }

    async fn apply(&self, records: &[PurchaseRecord], is_restore: bool) -> Result<ReconcileDelta> {
        let delta = self.reconciler.reconcile(records, is_restore)?;

        for token in &delta.to_acknowledge {
            if let Err(e) = self.platform.acknowledge(token).await {
                warn!("Acknowledge failed for {}, platform will redeliver: {}", token, e);
            }
        }
        Ok(delta)
    }
}
