//! ============================================================================
//! Monetization Policy - Which price source applies to a product
//! ============================================================================
//! - `remove_ads` and bundles are always platform purchases
//! - skins and sounds follow their catalog flag while platform SKUs for
//!   content are enabled, and are coin items otherwise
//! - unknown IDs are neither
//!
//! Platform prices are live data owned by the billing layer. This policy
//! only answers static questions and never caches a platform price.
//! ============================================================================

use std::sync::Arc;

use crate::catalog::{Catalog, ProductCategory, REMOVE_ADS};
use crate::config::MonetizationConfig;

const REMOVE_ADS_SUBTITLE: &str = "Permanently disable all interstitial and banner ads.";

/// Price source policy over a catalog
#[derive(Debug, Clone)]
pub struct MonetizationPolicy {
    catalog: Arc<Catalog>,
    config: MonetizationConfig,
}

impl MonetizationPolicy {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(catalog, MonetizationConfig::default())
    }

    pub fn with_config(catalog: Arc<Catalog>, config: MonetizationConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &MonetizationConfig {
        &self.config
    }

    /// Whether a product is bought through the billing platform
    pub fn requires_platform_purchase(&self, product_id: &str) -> bool {
        match ProductCategory::of(product_id) {
            Some(ProductCategory::RemoveAds) => true,
            Some(ProductCategory::Bundle) => self.catalog.find_bundle(product_id).is_some(),
            Some(ProductCategory::Skin) => {
                self.config.platform_skus_for_content
                    && self
                        .catalog
                        .find_skin(product_id)
                        .map(|s| s.requires_platform_purchase)
                        .unwrap_or(false)
            }
            Some(ProductCategory::Sound) => {
                self.config.platform_skus_for_content
                    && self
                        .catalog
                        .find_sound(product_id)
                        .map(|s| s.requires_platform_purchase)
                        .unwrap_or(false)
            }
            None => false,
        }
    }

    /// Static coin price. `None` for platform items and unknown IDs.
    pub fn coin_price(&self, product_id: &str) -> Option<u32> {
        if self.requires_platform_purchase(product_id) {
            return None;
        }

        if let Some(skin) = self.catalog.find_skin(product_id) {
            return Some(Self::effective_price(
                skin.coin_price,
                skin.requires_platform_purchase,
                self.config.default_premium_skin_coins,
            ));
        }
        if let Some(sound) = self.catalog.find_sound(product_id) {
            return Some(Self::effective_price(
                sound.coin_price,
                sound.requires_platform_purchase,
                self.config.default_premium_sound_coins,
            ));
        }
        None
    }

    fn effective_price(listed: u32, premium: bool, premium_default: u32) -> u32 {
        if listed > 0 {
            listed
        } else if premium {
            premium_default
        } else {
            0
        }
    }

    /// "Free" or "<n> Coins". `None` means ask the billing layer.
    pub fn price_label(&self, product_id: &str) -> Option<String> {
        match self.coin_price(product_id)? {
            0 => Some("Free".to_string()),
            n => Some(format!("{} Coins", n)),
        }
    }

    pub fn subtitle_for(&self, product_id: &str) -> String {
        let premium = self.requires_platform_purchase(product_id);
        match ProductCategory::of(product_id) {
            Some(ProductCategory::Skin) if premium => "Premium Purchase".to_string(),
            Some(ProductCategory::Skin) => "Gameplay Unlock".to_string(),
            Some(ProductCategory::Sound) if premium => "ASMR Soundscape (Premium)".to_string(),
            Some(ProductCategory::Sound) => "ASMR Soundscape Unlock".to_string(),
            Some(ProductCategory::Bundle) => self.catalog.bundle_description(product_id),
            Some(ProductCategory::RemoveAds) => REMOVE_ADS_SUBTITLE.to_string(),
            None => String::new(),
        }
    }

    /// Product IDs whose details must be fetched from the billing platform
    pub fn billing_product_ids(&self) -> Vec<String> {
        let mut ids = vec![REMOVE_ADS.to_string()];
        if self.config.platform_skus_for_content {
            ids.extend(
                self.catalog
                    .skins()
                    .iter()
                    .filter(|s| s.requires_platform_purchase)
                    .map(|s| s.id.clone()),
            );
            ids.extend(
                self.catalog
                    .sounds()
                    .iter()
                    .filter(|s| s.requires_platform_purchase)
                    .map(|s| s.id.clone()),
            );
        }
        ids.extend(self.catalog.bundles().iter().map(|b| b.bundle_id.clone()));
        ids
    }
}
