//! ============================================================================
//! Economy Configuration
//! ============================================================================
//! Every tunable number of the economy lives here. Missing fields in a
//! config file take their defaults, so a file only needs the overrides.
//!
//! Lookup order: explicit path, then `SLIMEPOP_CONFIG`, then defaults.
//! ============================================================================

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::progression::{QuestDef, QuestKind};

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "SLIMEPOP_CONFIG";

/// Number of daily quest slots
pub const QUEST_SLOTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub monetization: MonetizationConfig,
    pub quests: QuestConfig,
    pub daily: DailyRewardConfig,
    pub ads: AdPacingConfig,
    pub engagement: EngagementConfig,
}

/// Price source selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationConfig {
    /// Sell premium skins and sounds through the billing platform
    pub platform_skus_for_content: bool,
    /// Coin price of a premium skin when platform SKUs are off
    pub default_premium_skin_coins: u32,
    /// Coin price of a premium sound when platform SKUs are off
    pub default_premium_sound_coins: u32,
    /// Upper bound (inclusive) of the "STARTER DEAL" coin band
    pub starter_deal_max_coins: u32,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            platform_skus_for_content: true,
            default_premium_skin_coins: 12_000,
            default_premium_sound_coins: 3_500,
            starter_deal_max_coins: 3_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    pub slots: Vec<QuestDef>,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                QuestDef::new("Pop 25 times", QuestKind::Pops, 25, 80),
                QuestDef::new("Pop 60 times", QuestKind::Pops, 60, 160),
                QuestDef::new("Hold total 10 seconds", QuestKind::HoldMillis, 10_000, 140),
            ],
        }
    }
}

/// Daily reward table: `base + per_streak_day * min(streak, max_streak_tiers)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRewardConfig {
    pub base_reward: u64,
    pub per_streak_day: u64,
    pub max_streak_tiers: u32,
}

impl Default for DailyRewardConfig {
    fn default() -> Self {
        Self {
            base_reward: 120,
            per_streak_day: 25,
            max_streak_tiers: 7,
        }
    }
}

impl DailyRewardConfig {
    pub fn reward_for(&self, streak: u32) -> u64 {
        let tiers = u64::from(streak.min(self.max_streak_tiers));
        self.base_reward
            .saturating_add(self.per_streak_day.saturating_mul(tiers))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdPacingConfig {
    pub interstitial_every_pops: u32,
    pub interstitial_cooldown_ms: i64,
    pub boost_duration_ms: i64,
    pub boost_multiplier: u64,
}

impl Default for AdPacingConfig {
    fn default() -> Self {
        Self {
            interstitial_every_pops: 3,
            interstitial_cooldown_ms: 90_000,
            boost_duration_ms: 60_000,
            boost_multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub review_min_streak: u32,
    pub review_min_total_pops: u64,
    pub review_cooldown_days: i64,
    pub upsell_launch_milestones: Vec<u32>,
    pub upsell_cadence_days: i64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            review_min_streak: 3,
            review_min_total_pops: 200,
            review_cooldown_days: 30,
            upsell_launch_milestones: vec![2, 5, 10],
            upsell_cadence_days: 7,
        }
    }
}

impl EconomyConfig {
    /// Read a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        config.validate()?;
        info!("Loaded economy config from {}", path.display());
        Ok(config)
    }

    /// Explicit path, else `SLIMEPOP_CONFIG`, else defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .filter(|p| !p.trim().is_empty());

        match path {
            Some(p) => Self::from_json_file(p),
            None => {
                debug!("No economy config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Exactly three quest slots, targets positive and strictly increasing
    /// within each kind
    pub fn validate(&self) -> Result<()> {
        let slots = &self.quests.slots;
        if slots.len() != QUEST_SLOTS {
            bail!("Expected {} quest slots, found {}", QUEST_SLOTS, slots.len());
        }
        for kind in [QuestKind::Pops, QuestKind::HoldMillis] {
            let targets: Vec<u64> = slots
                .iter()
                .filter(|q| q.kind == kind)
                .map(|q| q.target)
                .collect();
            if targets.iter().any(|&t| t == 0) {
                bail!("Quest targets must be positive");
            }
            if targets.windows(2).any(|w| w[0] >= w[1]) {
                bail!("Quest targets of the same kind must increase");
            }
        }
        if self.ads.interstitial_every_pops == 0 {
            bail!("interstitial_every_pops must be at least 1");
        }
        if self.ads.boost_multiplier == 0 {
            bail!("boost_multiplier must be at least 1");
        }
        Ok(())
    }
}
