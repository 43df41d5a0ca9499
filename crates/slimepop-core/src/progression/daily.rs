//! ============================================================================
//! Daily Reward & Streak
//! ============================================================================
//! One claim per calendar day. Claiming the day after the previous claim
//! extends the streak, any gap restarts it at 1. The reward grows with the
//! streak up to a capped tier.
//!
//! The ad bonus pays the day's reward again, at most once per day and only
//! after the daily claim.
//! ============================================================================

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::clock::Clock;
use crate::config::DailyRewardConfig;
use crate::store::Prefs;

/// Persisted streak state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub last_claim_date: Option<NaiveDate>,
    pub streak: u32,
    pub ad_bonus_date: Option<NaiveDate>,
}

impl DailyRecord {
    pub fn claimed_on(&self, day: NaiveDate) -> bool {
        self.last_claim_date == Some(day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DailyClaim {
    Claimed { streak: u32, reward: u64 },
    AlreadyClaimed { streak: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AdBonusClaim {
    Granted { reward: u64 },
    DailyNotClaimed,
    AlreadyClaimed,
}

/// Apply a daily claim for `today`. Returns the updated record.
pub fn claim_daily(
    record: &DailyRecord,
    today: NaiveDate,
    rewards: &DailyRewardConfig,
) -> (DailyRecord, DailyClaim) {
    if record.claimed_on(today) {
        return (
            record.clone(),
            DailyClaim::AlreadyClaimed {
                streak: record.streak,
            },
        );
    }

    let yesterday = today - Duration::days(1);
    let streak = if record.last_claim_date == Some(yesterday) {
        record.streak.saturating_add(1)
    } else {
        1
    };

    let next = DailyRecord {
        last_claim_date: Some(today),
        streak,
        ad_bonus_date: record.ad_bonus_date,
    };
    (
        next,
        DailyClaim::Claimed {
            streak,
            reward: rewards.reward_for(streak),
        },
    )
}

/// Apply the once-per-day ad bonus for `today`
pub fn claim_ad_bonus(
    record: &DailyRecord,
    today: NaiveDate,
    rewards: &DailyRewardConfig,
) -> (DailyRecord, AdBonusClaim) {
    if !record.claimed_on(today) {
        return (record.clone(), AdBonusClaim::DailyNotClaimed);
    }
    if record.ad_bonus_date == Some(today) {
        return (record.clone(), AdBonusClaim::AlreadyClaimed);
    }

    let next = DailyRecord {
        ad_bonus_date: Some(today),
        ..record.clone()
    };
    (
        next,
        AdBonusClaim::Granted {
            reward: rewards.reward_for(record.streak),
        },
    )
}

/// Daily claims against persisted state
pub struct DailyRewards {
    prefs: Prefs,
    clock: Arc<dyn Clock>,
    config: DailyRewardConfig,
    guard: Mutex<()>,
}

impl DailyRewards {
    pub fn new(prefs: Prefs, clock: Arc<dyn Clock>, config: DailyRewardConfig) -> Self {
        Self {
            prefs,
            clock,
            config,
            guard: Mutex::new(()),
        }
    }

    pub fn record(&self) -> DailyRecord {
        self.prefs.daily_record()
    }

    pub fn is_ready(&self) -> bool {
        !self.record().claimed_on(self.clock.today())
    }

    /// Ad bonus is on offer: daily claimed today, bonus not yet taken
    pub fn ad_bonus_available(&self) -> bool {
        let today = self.clock.today();
        let record = self.record();
        record.claimed_on(today) && record.ad_bonus_date != Some(today)
    }

    /// Reward the next claim would pay
    pub fn preview_reward(&self) -> u64 {
        let (_, claim) = claim_daily(&self.record(), self.clock.today(), &self.config);
        match claim {
            DailyClaim::Claimed { reward, .. } => reward,
            DailyClaim::AlreadyClaimed { .. } => 0,
        }
    }

    pub fn claim(&self) -> Result<DailyClaim> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let (next, claim) = claim_daily(&self.record(), self.clock.today(), &self.config);
        if let DailyClaim::Claimed { streak, reward } = claim {
            self.prefs.set_daily_record(&next)?;
            info!("Daily claimed: streak {} reward {}", streak, reward);
        }
        Ok(claim)
    }

    pub fn claim_ad_bonus(&self) -> Result<AdBonusClaim> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let (next, claim) = claim_ad_bonus(&self.record(), self.clock.today(), &self.config);
        if let AdBonusClaim::Granted { reward } = claim {
            self.prefs.set_daily_record(&next)?;
            info!("Daily ad bonus granted: {}", reward);
        }
        Ok(claim)
    }
}
