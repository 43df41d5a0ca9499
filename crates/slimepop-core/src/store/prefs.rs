//! ============================================================================
//! Prefs - Typed facade over the key-value port
//! ============================================================================
//! Owns every persisted key. Values are bincode-encoded. Reads never fail:
//! a missing key, an undecodable value or a store error yields the default
//! (with a warning for the latter two). Writes propagate store errors.
//! ============================================================================

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::KeyValueStore;
use crate::catalog::{STARTER_SKIN, STARTER_SOUND};
use crate::progression::{DailyRecord, QuestRecord};

const K_COINS: &str = "coins";
const K_SOUND_ENABLED: &str = "sound_enabled";
const K_EQUIPPED_SKIN: &str = "equipped_skin_id";
const K_EQUIPPED_SOUND: &str = "equipped_sound_id";

const K_ADS_REMOVED: &str = "ads_removed";
const K_OWNED_PRODUCTS: &str = "owned_products_csv";
const K_COIN_PRODUCTS: &str = "coin_products_csv";

const K_DAILY: &str = "daily_record";

const K_BOOST_UNTIL_MS: &str = "boost_until_ms";
const K_POPS_SINCE_INTERSTITIAL: &str = "pops_since_interstitial";
const K_LAST_INTERSTITIAL_MS: &str = "last_interstitial_ms";

const K_LAUNCH_COUNT: &str = "launch_count";
const K_UPSELL_LAST: &str = "upsell_last_iso";

const K_TOTAL_POPS: &str = "total_pops";
const K_TOTAL_HOLD_MS: &str = "total_hold_ms";

const K_REVIEW_LAST: &str = "review_last_iso";
const K_SHOP_VARIANT: &str = "shop_variant";

// Quests
const K_QUEST: &str = "quest_record";
const K_LEGACY_QUEST_DATE: &str = "quest_date";
const K_LEGACY_QUEST_PROGRESS: &str = "quest_progress_csv";
const K_LEGACY_QUEST_CLAIMED: &str = "quest_claimed_csv";

/// Typed access to persisted economy state
#[derive(Clone)]
pub struct Prefs {
    kv: Arc<dyn KeyValueStore>,
}

impl Prefs {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.kv.get(key) {
            Ok(Some(bytes)) => match bincode::deserialize(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Discarding malformed value for {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read {}: {} - using default", key, e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", key, e))?;
        self.kv.put(key, &bytes)
    }

    // ========================================================================
    // Wallet & equipment
    // ========================================================================

    pub fn coins(&self) -> u64 {
        self.read(K_COINS).unwrap_or(0)
    }

    pub fn set_coins(&self, v: u64) -> Result<()> {
        self.write(K_COINS, &v)
    }

    pub fn sound_enabled(&self) -> bool {
        self.read(K_SOUND_ENABLED).unwrap_or(true)
    }

    pub fn set_sound_enabled(&self, v: bool) -> Result<()> {
        self.write(K_SOUND_ENABLED, &v)
    }

    pub fn equipped_skin(&self) -> String {
        self.read(K_EQUIPPED_SKIN).unwrap_or_else(|| STARTER_SKIN.to_string())
    }

    pub fn set_equipped_skin(&self, id: &str) -> Result<()> {
        self.write(K_EQUIPPED_SKIN, id)
    }

    pub fn equipped_sound(&self) -> String {
        self.read(K_EQUIPPED_SOUND).unwrap_or_else(|| STARTER_SOUND.to_string())
    }

    pub fn set_equipped_sound(&self, id: &str) -> Result<()> {
        self.write(K_EQUIPPED_SOUND, id)
    }

    // ========================================================================
    // Ownership
    // ========================================================================

    pub fn ads_removed(&self) -> bool {
        self.read(K_ADS_REMOVED).unwrap_or(false)
    }

    pub fn set_ads_removed(&self, v: bool) -> Result<()> {
        self.write(K_ADS_REMOVED, &v)
    }

    /// Platform-owned products, comma-joined
    pub fn owned_products_csv(&self) -> String {
        self.read(K_OWNED_PRODUCTS).unwrap_or_default()
    }

    pub fn set_owned_products_csv(&self, csv: &str) -> Result<()> {
        self.write(K_OWNED_PRODUCTS, csv)
    }

    /// Products bought with coins, comma-joined
    pub fn coin_products_csv(&self) -> String {
        self.read(K_COIN_PRODUCTS).unwrap_or_default()
    }

    pub fn set_coin_products_csv(&self, csv: &str) -> Result<()> {
        self.write(K_COIN_PRODUCTS, csv)
    }

    // ========================================================================
    // Progression
    // ========================================================================

    pub fn daily_record(&self) -> DailyRecord {
        self.read(K_DAILY).unwrap_or_default()
    }

    pub fn set_daily_record(&self, record: &DailyRecord) -> Result<()> {
        self.write(K_DAILY, record)
    }

    pub fn quest_record(&self) -> Option<QuestRecord> {
        self.read(K_QUEST)
    }

    pub fn set_quest_record(&self, record: &QuestRecord) -> Result<()> {
        self.write(K_QUEST, record)
    }

    /// Slot strings written by older builds: (date, `q0=..` progress, `q0=..` claimed)
    pub fn legacy_quest_strings(&self) -> Option<(String, String, String)> {
        let date: String = self.read(K_LEGACY_QUEST_DATE)?;
        let progress = self.read(K_LEGACY_QUEST_PROGRESS).unwrap_or_default();
        let claimed = self.read(K_LEGACY_QUEST_CLAIMED).unwrap_or_default();
        Some((date, progress, claimed))
    }

    pub fn set_legacy_quest_strings(&self, date: &str, progress: &str, claimed: &str) -> Result<()> {
        self.write(K_LEGACY_QUEST_DATE, date)?;
        self.write(K_LEGACY_QUEST_PROGRESS, progress)?;
        self.write(K_LEGACY_QUEST_CLAIMED, claimed)
    }

    pub fn clear_legacy_quest_strings(&self) -> Result<()> {
        self.kv.remove(K_LEGACY_QUEST_DATE)?;
        self.kv.remove(K_LEGACY_QUEST_PROGRESS)?;
        self.kv.remove(K_LEGACY_QUEST_CLAIMED)?;
        Ok(())
    }

    pub fn total_pops(&self) -> u64 {
        self.read(K_TOTAL_POPS).unwrap_or(0)
    }

    pub fn set_total_pops(&self, v: u64) -> Result<()> {
        self.write(K_TOTAL_POPS, &v)
    }

    pub fn total_hold_ms(&self) -> u64 {
        self.read(K_TOTAL_HOLD_MS).unwrap_or(0)
    }

    pub fn set_total_hold_ms(&self, v: u64) -> Result<()> {
        self.write(K_TOTAL_HOLD_MS, &v)
    }

    // ========================================================================
    // Ads
    // ========================================================================

    pub fn boost_until_ms(&self) -> i64 {
        self.read(K_BOOST_UNTIL_MS).unwrap_or(0)
    }

    pub fn set_boost_until_ms(&self, v: i64) -> Result<()> {
        self.write(K_BOOST_UNTIL_MS, &v)
    }

    pub fn pops_since_interstitial(&self) -> u32 {
        self.read(K_POPS_SINCE_INTERSTITIAL).unwrap_or(0)
    }

    pub fn set_pops_since_interstitial(&self, v: u32) -> Result<()> {
        self.write(K_POPS_SINCE_INTERSTITIAL, &v)
    }

    pub fn last_interstitial_ms(&self) -> i64 {
        self.read(K_LAST_INTERSTITIAL_MS).unwrap_or(0)
    }

    pub fn set_last_interstitial_ms(&self, v: i64) -> Result<()> {
        self.write(K_LAST_INTERSTITIAL_MS, &v)
    }

    // ========================================================================
    // Engagement
    // ========================================================================

    pub fn launch_count(&self) -> u32 {
        self.read(K_LAUNCH_COUNT).unwrap_or(0)
    }

    pub fn set_launch_count(&self, v: u32) -> Result<()> {
        self.write(K_LAUNCH_COUNT, &v)
    }

    pub fn upsell_last_iso(&self) -> Option<String> {
        self.read(K_UPSELL_LAST)
    }

    pub fn set_upsell_last_iso(&self, iso: &str) -> Result<()> {
        self.write(K_UPSELL_LAST, iso)
    }

    pub fn review_last_iso(&self) -> Option<String> {
        self.read(K_REVIEW_LAST)
    }

    pub fn set_review_last_iso(&self, iso: &str) -> Result<()> {
        self.write(K_REVIEW_LAST, iso)
    }

    pub fn shop_variant(&self) -> Option<String> {
        self.read(K_SHOP_VARIANT)
    }

    pub fn set_shop_variant(&self, v: &str) -> Result<()> {
        self.write(K_SHOP_VARIANT, v)
    }

    pub fn clear_shop_variant(&self) -> Result<()> {
        self.kv.remove(K_SHOP_VARIANT)?;
        Ok(())
    }
}
