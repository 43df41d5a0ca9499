//! ============================================================================
//! Entitlement Resolver
//! ============================================================================
//! Turns the owned-products set into the content the player may use:
//! - starter skin and sound are always owned
//! - owned skins and sounds count directly
//! - owned bundles add their grants
//!
//! Resolution is pure. The resulting snapshot is published through
//! `EntitlementsHub`, which swaps whole snapshots and never mutates one.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::catalog::{Catalog, ProductCategory, REMOVE_ADS, STARTER_SKIN, STARTER_SOUND};

/// Immutable view of what the player owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    pub ads_removed: bool,
    pub owned_products: BTreeSet<String>,
    pub owned_content: BTreeSet<String>,
}

impl Default for Entitlements {
    /// Nothing purchased: starters only
    fn default() -> Self {
        Self {
            ads_removed: false,
            owned_products: BTreeSet::new(),
            owned_content: [STARTER_SKIN, STARTER_SOUND]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Entitlements {
    pub fn owns_content(&self, id: &str) -> bool {
        self.owned_content.contains(id)
    }

    pub fn owns_product(&self, id: &str) -> bool {
        self.owned_products.contains(id)
    }

    /// Ownership as the shop sees it: content through `owned_content`,
    /// bundles and ad removal through `owned_products`
    pub fn owns(&self, product_id: &str) -> bool {
        match ProductCategory::of(product_id) {
            Some(c) if c.is_content() => self.owns_content(product_id),
            _ => self.owns_product(product_id),
        }
    }
}

/// Expands owned products into entitlements against a catalog
#[derive(Debug, Clone)]
pub struct EntitlementResolver {
    catalog: Arc<Catalog>,
}

impl EntitlementResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Garbage IDs are carried in `owned_products` but grant nothing
    pub fn resolve(&self, owned_products: &BTreeSet<String>) -> Entitlements {
        let mut owned_content = Entitlements::default().owned_content;

        for id in owned_products {
            match ProductCategory::of(id) {
                Some(ProductCategory::Skin) | Some(ProductCategory::Sound) => {
                    owned_content.insert(id.clone());
                }
                Some(ProductCategory::Bundle) => {
                    owned_content.extend(self.catalog.grants_for(id).iter().cloned());
                }
                Some(ProductCategory::RemoveAds) | None => {}
            }
        }

        Entitlements {
            ads_removed: owned_products.contains(REMOVE_ADS),
            owned_products: owned_products.clone(),
            owned_content,
        }
    }
}

/// Parse a comma-joined product list. Blank tokens are dropped.
pub fn owned_products_from_serialized(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn serialize_owned_products(owned: &BTreeSet<String>) -> String {
    owned.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Process-wide entitlement snapshot with change notification
#[derive(Debug, Clone)]
pub struct EntitlementsHub {
    tx: Arc<watch::Sender<Arc<Entitlements>>>,
}

impl Default for EntitlementsHub {
    fn default() -> Self {
        Self::new(Entitlements::default())
    }
}

impl EntitlementsHub {
    pub fn new(initial: Entitlements) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot
    pub fn current(&self) -> Arc<Entitlements> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replace the snapshot and wake subscribers
    pub fn publish(&self, next: Entitlements) {
        debug!(
            "Publishing entitlements: {} products, {} content, ads_removed={}",
            next.owned_products.len(),
            next.owned_content.len(),
            next.ads_removed
        );
        self.tx.send_replace(Arc::new(next));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Entitlements>> {
        self.tx.subscribe()
    }
}
