//! ============================================================================
//! Ads - Platform port, interstitial pacing and the rewarded coin boost
//! ============================================================================
//! An interstitial is due once enough pops have passed AND the cooldown
//! since the last one has elapsed. Nothing is counted or shown once ads are
//! removed. The rewarded boost multiplies pop coins for a fixed window.
//! ============================================================================

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::clock::Clock;
use crate::config::AdPacingConfig;
use crate::store::Prefs;
use crate::types::PlatformError;

/// Outcome of offering a rewarded ad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardedOutcome {
    Rewarded,
    NotReady,
}

/// Ad SDK boundary
#[async_trait]
pub trait AdPlatform: Send + Sync {
    /// `Ok(true)` if an interstitial was shown
    async fn show_interstitial_if_ready(&self) -> Result<bool, PlatformError>;

    async fn show_rewarded(&self) -> Result<RewardedOutcome, PlatformError>;
}

/// Persisted interstitial pacing and boost window
pub struct AdPacing {
    prefs: Prefs,
    clock: Arc<dyn Clock>,
    config: AdPacingConfig,
    guard: Mutex<()>,
}

impl AdPacing {
    pub fn new(prefs: Prefs, clock: Arc<dyn Clock>, config: AdPacingConfig) -> Self {
        Self {
            prefs,
            clock,
            config,
            guard: Mutex::new(()),
        }
    }

    /// Count a pop. Returns whether an interstitial is due now; the counter
    /// restarts when it is.
    pub fn on_pop(&self, ads_removed: bool) -> Result<bool> {
        if ads_removed {
            return Ok(false);
        }
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());

        let count = self.prefs.pops_since_interstitial().saturating_add(1);
        let elapsed = self.clock.now_millis() - self.prefs.last_interstitial_ms();
        let due = count >= self.config.interstitial_every_pops
            && elapsed >= self.config.interstitial_cooldown_ms;

        self.prefs
            .set_pops_since_interstitial(if due { 0 } else { count })?;
        if due {
            debug!("Interstitial due after {} pops", count);
        }
        Ok(due)
    }

    pub fn mark_interstitial_shown(&self) -> Result<()> {
        self.prefs.set_last_interstitial_ms(self.clock.now_millis())
    }

    pub fn boost_until_ms(&self) -> i64 {
        self.prefs.boost_until_ms()
    }

    pub fn boost_active(&self, ads_removed: bool) -> bool {
        !ads_removed && self.clock.now_millis() < self.prefs.boost_until_ms()
    }

    pub fn coin_multiplier(&self, ads_removed: bool) -> u64 {
        if self.boost_active(ads_removed) {
            self.config.boost_multiplier
        } else {
            1
        }
    }

    /// Start a boost window from now. Returns its end.
    pub fn activate_boost(&self) -> Result<i64> {
        let until = self.clock.now_millis() + self.config.boost_duration_ms;
        self.prefs.set_boost_until_ms(until)?;
        debug!("Coin boost active until {}", until);
        Ok(until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn pacing() -> (Arc<FixedClock>, AdPacing) {
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            1_000_000,
        ));
        let pacing = AdPacing::new(
            Prefs::new(Arc::new(MemoryStore::new())),
            clock.clone(),
            AdPacingConfig::default(),
        );
        (clock, pacing)
    }

    #[test]
    fn test_interstitial_every_third_pop() {
        let (_, pacing) = pacing();
        let due: Vec<bool> = (0..6).map(|_| pacing.on_pop(false).unwrap()).collect();
        assert_eq!(due, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_cooldown_holds_back_interstitial() {
        let (clock, pacing) = pacing();
        pacing.mark_interstitial_shown().unwrap();

        let due: Vec<bool> = (0..4).map(|_| pacing.on_pop(false).unwrap()).collect();
        assert_eq!(due, vec![false; 4]);

        clock.advance_millis(90_000);
        assert!(pacing.on_pop(false).unwrap());
    }

    #[test]
    fn test_ads_removed_never_due() {
        let (_, pacing) = pacing();
        for _ in 0..10 {
            assert!(!pacing.on_pop(true).unwrap());
        }
    }

    #[test]
    fn test_boost_window() {
        let (clock, pacing) = pacing();
        assert_eq!(pacing.coin_multiplier(false), 1);

        pacing.activate_boost().unwrap();
        assert_eq!(pacing.coin_multiplier(false), 2);
        assert_eq!(pacing.coin_multiplier(true), 1);

        clock.advance_millis(60_000);
        assert_eq!(pacing.coin_multiplier(false), 1);
    }
}
