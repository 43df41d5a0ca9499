//! ============================================================================
//! Revenue Telemetry - Local funnel counters
//! ============================================================================
//! Counts shop impressions, buy clicks, equip clicks and confirmed purchases
//! per (event, variant, category, product). Recording never fails the
//! caller: store errors are logged and dropped.
//! ============================================================================

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::catalog::ProductCategory;
use crate::store::KeyValueStore;

const COUNT_PREFIX: &str = "telemetry:event_count_";
const LAST_CLICK_PREFIX: &str = "telemetry:last_click_variant_";
const UNKNOWN_VARIANT: &str = "UNKNOWN";

/// How a purchase was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseSource {
    Coins,
    PlayBilling,
}

impl PurchaseSource {
    fn event_name(&self) -> &'static str {
        match self {
            Self::Coins => "purchase_coins",
            Self::PlayBilling => "purchase_play_billing",
        }
    }
}

/// One decoded counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounter {
    pub event: String,
    pub variant: String,
    pub category: String,
    pub product_id: String,
    pub count: u64,
}

/// Clones share one counter guard
#[derive(Clone)]
pub struct RevenueTelemetry {
    kv: Arc<dyn KeyValueStore>,
    guard: Arc<Mutex<()>>,
}

impl RevenueTelemetry {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn track_impression(&self, product_id: &str, variant: &str) {
        self.record("impression", product_id, variant);
    }

    /// Also remembers the variant so a later confirmation can be attributed
    pub fn track_buy_click(&self, product_id: &str, variant: &str) {
        let key = format!("{}{}", LAST_CLICK_PREFIX, product_id);
        if let Err(e) = self.kv.put(&key, normalize_variant(variant).as_bytes()) {
            warn!("Failed to remember click variant for {}: {}", product_id, e);
        }
        self.record("buy_click", product_id, variant);
    }

    pub fn track_equip_click(&self, product_id: &str, variant: &str) {
        self.record("equip_click", product_id, variant);
    }

    pub fn track_purchase_confirmed(
        &self,
        product_id: &str,
        source: PurchaseSource,
        variant_hint: Option<&str>,
    ) {
        let variant = match variant_hint {
            Some(v) => v.to_string(),
            None => self.last_click_variant(product_id),
        };
        self.record(source.event_name(), product_id, &variant);
    }

    pub fn last_click_variant(&self, product_id: &str) -> String {
        let key = format!("{}{}", LAST_CLICK_PREFIX, product_id);
        match self.kv.get(&key) {
            Ok(Some(bytes)) => normalize_variant(&String::from_utf8_lossy(&bytes)),
            _ => UNKNOWN_VARIANT.to_string(),
        }
    }

    /// Current count of one counter
    pub fn count(&self, event: &str, product_id: &str, variant: &str) -> u64 {
        let key = counter_key(event, &normalize_variant(variant), product_id);
        self.read_count(&key)
    }

    /// Every counter, ordered by key
    pub fn counters(&self) -> Result<Vec<TelemetryCounter>> {
        let mut out = Vec::new();
        for key in self.kv.keys_with_prefix(COUNT_PREFIX)? {
            let rest = &key[COUNT_PREFIX.len()..];
            let parts: Vec<&str> = rest.splitn(4, '|').collect();
            if let [event, variant, category, product_id] = parts.as_slice() {
                out.push(TelemetryCounter {
                    event: event.to_string(),
                    variant: variant.to_string(),
                    category: category.to_string(),
                    product_id: product_id.to_string(),
                    count: self.read_count(&key),
                });
            }
        }
        Ok(out)
    }

    fn record(&self, event: &str, product_id: &str, variant: &str) {
        if let Err(e) = self.increment(event, product_id, variant) {
            warn!("Dropping telemetry event {} for {}: {}", event, product_id, e);
        }
    }

    fn increment(&self, event: &str, product_id: &str, variant: &str) -> Result<()> {
        let variant = normalize_variant(variant);
        let key = counter_key(event, &variant, product_id);
        let next = {
            let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
            let next = self.read_count(&key).saturating_add(1);
            self.kv.put(&key, &next.to_le_bytes())?;
            next
        };

        info!(
            "event={} sku={} category={} variant={} count={}",
            event,
            product_id,
            category_label(product_id),
            variant,
            next
        );
        Ok(())
    }

    fn read_count(&self, key: &str) -> u64 {
        match self.kv.get(key) {
            Ok(Some(bytes)) => <[u8; 8]>::try_from(bytes.as_slice())
                .map(u64::from_le_bytes)
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// Upper-case and trim; blank becomes `UNKNOWN`
pub fn normalize_variant(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        UNKNOWN_VARIANT.to_string()
    } else {
        v.to_uppercase()
    }
}

fn category_label(product_id: &str) -> &'static str {
    ProductCategory::of(product_id)
        .map(|c| c.as_str())
        .unwrap_or("other")
}

fn counter_key(event: &str, variant: &str, product_id: &str) -> String {
    format!(
        "{}{}|{}|{}|{}",
        COUNT_PREFIX,
        event,
        variant,
        category_label(product_id),
        product_id
    )
}
