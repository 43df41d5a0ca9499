//! ============================================================================
//! Purchase Reconciliation
//! ============================================================================
//! A platform query result is the full list of current purchases, so the
//! persisted platform-owned set is replaced, never merged. Products bought
//! with coins live in a separate ledger and survive every reconciliation.
//!
//! Replaying the same records is harmless: the second pass finds nothing
//! newly owned and emits no telemetry.
//!
//! Every publish also reverts equipped items the new snapshot no longer
//! covers, so a refund can never leave unowned content equipped.
//! ============================================================================

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::PurchaseRecord;
use crate::catalog::{REMOVE_ADS, STARTER_SKIN, STARTER_SOUND};
use crate::entitlements::{
    owned_products_from_serialized, serialize_owned_products, EntitlementResolver, Entitlements,
    EntitlementsHub,
};
use crate::store::Prefs;
use crate::telemetry::{PurchaseSource, RevenueTelemetry};

/// What a set of records means relative to what was known before
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileDelta {
    pub now_owned: BTreeSet<String>,
    pub newly_owned: BTreeSet<String>,
    /// Tokens of purchased records the platform has not seen acknowledged
    pub to_acknowledge: Vec<String>,
}

/// Pure part of reconciliation. Pending and unspecified records own nothing.
pub fn reconcile_purchases(
    fresh: &[PurchaseRecord],
    previous_owned: &BTreeSet<String>,
) -> ReconcileDelta {
    let purchased = fresh.iter().filter(|r| r.is_purchased());

    let now_owned: BTreeSet<String> = purchased
        .clone()
        .flat_map(|r| r.product_ids.iter().cloned())
        .collect();
    let newly_owned = now_owned.difference(previous_owned).cloned().collect();

    let mut to_acknowledge: Vec<String> = Vec::new();
    for record in purchased.filter(|r| !r.acknowledged) {
        if !to_acknowledge.contains(&record.purchase_token) {
            to_acknowledge.push(record.purchase_token.clone());
        }
    }

    ReconcileDelta {
        now_owned,
        newly_owned,
        to_acknowledge,
    }
}

/// Applies reconciliation results to persisted state and the entitlement hub
pub struct PurchaseReconciler {
    prefs: Prefs,
    resolver: EntitlementResolver,
    hub: EntitlementsHub,
    telemetry: RevenueTelemetry,
    guard: Mutex<()>,
}

impl PurchaseReconciler {
    pub fn new(
        prefs: Prefs,
        resolver: EntitlementResolver,
        hub: EntitlementsHub,
        telemetry: RevenueTelemetry,
    ) -> Self {
        Self {
            prefs,
            resolver,
            hub,
            telemetry,
            guard: Mutex::new(()),
        }
    }

    pub fn hub(&self) -> &EntitlementsHub {
        &self.hub
    }

    pub fn resolver(&self) -> &EntitlementResolver {
        &self.resolver
    }

    /// Products owned through the billing platform
    pub fn platform_owned(&self) -> BTreeSet<String> {
        owned_products_from_serialized(&self.prefs.owned_products_csv())
    }

    /// Products bought with coins
    pub fn coin_owned(&self) -> BTreeSet<String> {
        owned_products_from_serialized(&self.prefs.coin_products_csv())
    }

    /// Everything the player owns transactionally
    pub fn owned_products(&self) -> BTreeSet<String> {
        let mut owned = self.platform_owned();
        owned.extend(self.coin_owned());
        owned
    }

    /// Replace the platform-owned set with what `records` report and
    /// publish fresh entitlements. Telemetry only fires outside restores.
    pub fn reconcile(&self, records: &[PurchaseRecord], is_restore: bool) -> Result<ReconcileDelta> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());

        let previous = self.platform_owned();
        let delta = reconcile_purchases(records, &previous);

        self.prefs
            .set_owned_products_csv(&serialize_owned_products(&delta.now_owned))?;
        self.prefs
            .set_ads_removed(delta.now_owned.contains(REMOVE_ADS))?;

        if is_restore {
            debug!("Restored {} platform products", delta.now_owned.len());
        } else {
            for product_id in &delta.newly_owned {
                info!("Purchase confirmed: {}", product_id);
                self.telemetry
                    .track_purchase_confirmed(product_id, PurchaseSource::PlayBilling, None);
            }
        }

        self.publish_locked();
        Ok(delta)
    }

    /// Record a coin purchase in the ledger and publish
    pub fn grant_coin_purchase(&self, product_id: &str) -> Result<Entitlements> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());

        let mut ledger = self.coin_owned();
        if ledger.insert(product_id.to_string()) {
            self.prefs
                .set_coin_products_csv(&serialize_owned_products(&ledger))?;
            debug!("Coin ledger now holds {} products", ledger.len());
        }
        Ok(self.publish_locked())
    }

    /// Re-resolve from persisted ownership, e.g. after a cloud restore
    pub fn refresh_entitlements(&self) -> Entitlements {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        self.publish_locked()
    }

    /// Fall back to the starters for equipped items no longer owned.
    /// Returns whether anything changed.
    pub fn enforce_equipped_ownership(&self) -> Result<bool> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        self.revert_unowned_equipment(&self.hub.current())
    }

    fn publish_locked(&self) -> Entitlements {
        let entitlements = self.resolver.resolve(&self.owned_products());
        if let Err(e) = self.revert_unowned_equipment(&entitlements) {
            warn!("Failed to revert unowned equipment: {}", e);
        }
        self.hub.publish(entitlements.clone());
        entitlements
    }

    fn revert_unowned_equipment(&self, ent: &Entitlements) -> Result<bool> {
        let mut changed = false;

        let skin = self.prefs.equipped_skin();
        if !ent.owns_content(&skin) {
            info!("Equipped skin {} no longer owned, reverting", skin);
            self.prefs.set_equipped_skin(STARTER_SKIN)?;
            changed = true;
        }
        let sound = self.prefs.equipped_sound();
        if !ent.owns_content(&sound) {
            info!("Equipped sound {} no longer owned, reverting", sound);
            self.prefs.set_equipped_sound(STARTER_SOUND)?;
            changed = true;
        }
        Ok(changed)
    }
}
