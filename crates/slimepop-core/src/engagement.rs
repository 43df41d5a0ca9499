//! Review and ad-removal upsell prompts.
//!
//! Both decisions record "shown today" when they return true.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::clock::{day_key, parse_day_key, Clock};
use crate::config::EngagementConfig;
use crate::store::Prefs;

pub struct EngagementPrompts {
    prefs: Prefs,
    clock: Arc<dyn Clock>,
    config: EngagementConfig,
}

impl EngagementPrompts {
    pub fn new(prefs: Prefs, clock: Arc<dyn Clock>, config: EngagementConfig) -> Self {
        Self {
            prefs,
            clock,
            config,
        }
    }

    /// Ask for a review at a streak or pop milestone, at most once per cooldown
    pub fn should_ask_for_review(&self, streak: u32, total_pops: u64) -> Result<bool> {
        let milestone =
            streak >= self.config.review_min_streak || total_pops >= self.config.review_min_total_pops;
        if !milestone {
            return Ok(false);
        }

        let today = self.clock.today();
        let last = self.prefs.review_last_iso().and_then(|s| parse_day_key(&s));
        if !days_since_at_least(last, today, self.config.review_cooldown_days) {
            return Ok(false);
        }

        self.prefs.set_review_last_iso(&day_key(today))?;
        debug!("Review prompt due (streak {}, pops {})", streak, total_pops);
        Ok(true)
    }

    /// Count a launch and decide on the remove-ads reminder. Launches are
    /// not counted once ads are removed.
    pub fn on_launch(&self, ads_removed: bool) -> Result<bool> {
        if ads_removed {
            return Ok(false);
        }
        let launches = self.prefs.launch_count().saturating_add(1);
        self.prefs.set_launch_count(launches)?;

        let today = self.clock.today();
        let by_launch = self.config.upsell_launch_milestones.contains(&launches);
        let last = self.prefs.upsell_last_iso().and_then(|s| parse_day_key(&s));
        let by_cadence = days_since_at_least(last, today, self.config.upsell_cadence_days);

        if !(by_launch || by_cadence) {
            return Ok(false);
        }
        self.prefs.set_upsell_last_iso(&day_key(today))?;
        debug!("Remove-ads reminder due on launch {}", launches);
        Ok(true)
    }
}

/// Never shown, or shown at least `days` ago
fn days_since_at_least(last: Option<NaiveDate>, today: NaiveDate, days: i64) -> bool {
    match last {
        None => true,
        Some(last) => (today - last).num_days() >= days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn prompts() -> (Arc<FixedClock>, EngagementPrompts) {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 0));
        let prompts = EngagementPrompts::new(
            Prefs::new(Arc::new(MemoryStore::new())),
            clock.clone(),
            EngagementConfig::default(),
        );
        (clock, prompts)
    }

    #[test]
    fn test_review_needs_milestone_and_cooldown() {
        let (clock, prompts) = prompts();
        assert!(!prompts.should_ask_for_review(2, 199).unwrap());
        assert!(prompts.should_ask_for_review(3, 0).unwrap());
        assert!(!prompts.should_ask_for_review(10, 1_000).unwrap());

        clock.advance_days(29);
        assert!(!prompts.should_ask_for_review(10, 1_000).unwrap());
        clock.advance_days(1);
        assert!(prompts.should_ask_for_review(0, 200).unwrap());
    }

    #[test]
    fn test_upsell_schedule() {
        let (clock, prompts) = prompts();
        // Launch 1: never shown before
        assert!(prompts.on_launch(false).unwrap());
        // Launch 2: milestone
        assert!(prompts.on_launch(false).unwrap());
        // Launches 3 and 4 on the same day: nothing
        assert!(!prompts.on_launch(false).unwrap());
        assert!(!prompts.on_launch(false).unwrap());
        // Launch 5: milestone
        assert!(prompts.on_launch(false).unwrap());

        clock.advance_days(7);
        assert!(prompts.on_launch(false).unwrap());
    }

    #[test]
    fn test_no_upsell_when_ads_removed() {
        let (_, prompts) = prompts();
        assert!(!prompts.on_launch(true).unwrap());
        assert!(prompts.on_launch(false).unwrap());
    }
}
