//! ============================================================================
//! Economy Session - One player's economy, wired together
//! ============================================================================
//! The session owns the persisted state of a single player and is the only
//! place coins change hands:
//! - pops earn coins and feed quests and ad pacing
//! - coin purchases, equips and reward claims
//! - shop listing with sticky variant assignment and impressions
//! - cloud restore and entitlement re-resolution
//!
//! Platform purchases go through `BillingManager`, which shares this
//! session's reconciler.
//! ============================================================================

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::ads::{AdPacing, AdPlatform, RewardedOutcome};
use crate::billing::PurchaseReconciler;
use crate::catalog::{Catalog, ProductCategory};
use crate::clock::Clock;
use crate::cloud::{apply_snapshot, snapshot_from, CloudSnapshot, CloudStorage, CloudSync};
use crate::config::EconomyConfig;
use crate::engagement::EngagementPrompts;
use crate::entitlements::{EntitlementResolver, Entitlements, EntitlementsHub};
use crate::monetization::MonetizationPolicy;
use crate::progression::{AdBonusClaim, DailyClaim, DailyRewards, Quest, QuestBook};
use crate::shop::{
    catalog_items, filter_items, Merchandiser, ShopItem, ShopTab, Variant, VariantAssigner,
};
use crate::store::{KeyValueStore, Prefs};
use crate::telemetry::{PurchaseSource, RevenueTelemetry};
use crate::types::EconomyError;

/// Result of one pop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopOutcome {
    pub earned: u64,
    pub coins: u64,
    pub quests_ready: usize,
    pub interstitial_due: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestClaimSummary {
    pub claimed: Vec<Quest>,
    pub coins_awarded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BoostOutcome {
    Activated { until_ms: i64 },
    /// Ad-free players never get the boost
    AdsRemoved,
}

/// Ranked shop page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopView {
    pub variant: Variant,
    pub items: Vec<ShopItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestProgress {
    pub quest: Quest,
    pub progress: u64,
    pub claimed: bool,
    pub ready: bool,
}

/// Snapshot for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EconomyStatus {
    pub coins: u64,
    pub equipped_skin: String,
    pub equipped_sound: String,
    pub ads_removed: bool,
    pub owned_products: BTreeSet<String>,
    pub owned_content: usize,
    pub daily_ready: bool,
    pub daily_streak: u32,
    pub quests: Vec<QuestProgress>,
    pub boost_active: bool,
    pub total_pops: u64,
    pub total_hold_ms: u64,
    pub shop_variant: Option<Variant>,
}

pub struct EconomySession {
    catalog: Arc<Catalog>,
    config: EconomyConfig,
    prefs: Prefs,
    policy: MonetizationPolicy,
    reconciler: Arc<PurchaseReconciler>,
    telemetry: RevenueTelemetry,
    quests: QuestBook,
    daily: DailyRewards,
    ads: AdPacing,
    engagement: EngagementPrompts,
    variants: VariantAssigner,
    merchandiser: Merchandiser,
    wallet: Mutex<()>,
    stats: Mutex<()>,
}

impl EconomySession {
    /// Open a session over the shipped catalog
    pub fn open(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: EconomyConfig) -> Self {
        Self::open_with_catalog(kv, clock, config, Catalog::standard())
    }

    pub fn open_with_catalog(
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: EconomyConfig,
        catalog: Arc<Catalog>,
    ) -> Self {
        let prefs = Prefs::new(kv.clone());
        let telemetry = RevenueTelemetry::new(kv);
        let resolver = EntitlementResolver::new(catalog.clone());
        let reconciler = Arc::new(PurchaseReconciler::new(
            prefs.clone(),
            resolver,
            EntitlementsHub::default(),
            telemetry.clone(),
        ));

        let session = Self {
            policy: MonetizationPolicy::with_config(catalog.clone(), config.monetization.clone()),
            quests: QuestBook::new(prefs.clone(), clock.clone(), &config.quests.slots),
            daily: DailyRewards::new(prefs.clone(), clock.clone(), config.daily.clone()),
            ads: AdPacing::new(prefs.clone(), clock.clone(), config.ads.clone()),
            engagement: EngagementPrompts::new(prefs.clone(), clock, config.engagement.clone()),
            variants: VariantAssigner::new(prefs.clone()),
            merchandiser: Merchandiser::new(config.monetization.starter_deal_max_coins),
            catalog,
            config,
            prefs,
            reconciler,
            telemetry,
            wallet: Mutex::new(()),
            stats: Mutex::new(()),
        };

        session.reconciler.refresh_entitlements();
        if let Err(e) = session.enforce_equipped_ownership() {
            warn!("Failed to check equipped items: {}", e);
        }
        session
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    pub fn policy(&self) -> &MonetizationPolicy {
        &self.policy
    }

    pub fn telemetry(&self) -> &RevenueTelemetry {
        &self.telemetry
    }

    pub fn quests(&self) -> &QuestBook {
        &self.quests
    }

    pub fn daily(&self) -> &DailyRewards {
        &self.daily
    }

    /// Shared with `BillingManager`
    pub fn reconciler(&self) -> Arc<PurchaseReconciler> {
        Arc::clone(&self.reconciler)
    }

    pub fn entitlements(&self) -> Arc<Entitlements> {
        self.reconciler.hub().current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Entitlements>> {
        self.reconciler.hub().subscribe()
    }

    pub fn coins(&self) -> u64 {
        self.prefs.coins()
    }

    pub fn add_coins(&self, amount: u64) -> Result<u64> {
        let _wallet = self.wallet.lock().unwrap_or_else(|e| e.into_inner());
        let next = self.prefs.coins().saturating_add(amount);
        self.prefs.set_coins(next)?;
        Ok(next)
    }

    // ========================================================================
    // Play
    // ========================================================================

    /// One pop worth `base_coins`, held for `hold_ms`
    pub fn record_pop(&self, base_coins: u64, hold_ms: u64) -> Result<PopOutcome> {
        let ads_removed = self.entitlements().ads_removed;
        let earned = base_coins.saturating_mul(self.ads.coin_multiplier(ads_removed));
        let coins = self.add_coins(earned)?;

        {
            let _stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
            self.prefs.set_total_pops(self.prefs.total_pops().saturating_add(1))?;
            if hold_ms > 0 {
                self.prefs
                    .set_total_hold_ms(self.prefs.total_hold_ms().saturating_add(hold_ms))?;
            }
        }

        self.quests.record_activity(1, hold_ms)?;
        let quests_ready = self.quests.ready().len();
        let interstitial_due = self.ads.on_pop(ads_removed)?;

        Ok(PopOutcome {
            earned,
            coins,
            quests_ready,
            interstitial_due,
        })
    }

    /// Show a due interstitial. Returns whether one was shown.
    pub async fn show_interstitial<A: AdPlatform>(&self, platform: &A) -> bool {
        if self.entitlements().ads_removed {
            return false;
        }
        match platform.show_interstitial_if_ready().await {
            Ok(true) => {
                if let Err(e) = self.ads.mark_interstitial_shown() {
                    warn!("Failed to record interstitial: {}", e);
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Interstitial unavailable: {}", e);
                false
            }
        }
    }

    /// Watch a rewarded ad for a temporary coin multiplier
    pub async fn activate_boost<A: AdPlatform>(
        &self,
        platform: &A,
    ) -> Result<BoostOutcome, EconomyError> {
        if self.entitlements().ads_removed {
            return Ok(BoostOutcome::AdsRemoved);
        }
        self.watch_rewarded(platform).await?;
        let until_ms = self.ads.activate_boost()?;
        Ok(BoostOutcome::Activated { until_ms })
    }

    async fn watch_rewarded<A: AdPlatform>(&self, platform: &A) -> Result<(), EconomyError> {
        match platform.show_rewarded().await {
            Ok(RewardedOutcome::Rewarded) => Ok(()),
            Ok(RewardedOutcome::NotReady) => Err(EconomyError::AdNotReady),
            Err(e) => {
                warn!("Rewarded ad failed: {}", e);
                Err(EconomyError::AdNotReady)
            }
        }
    }

    // ========================================================================
    // Purchases & equipment
    // ========================================================================

    /// Buy a coin-priced item
    pub fn buy_with_coins(
        &self,
        product_id: &str,
        variant_hint: Option<&str>,
    ) -> Result<Arc<Entitlements>, EconomyError> {
        if self.policy.requires_platform_purchase(product_id) {
            return Err(EconomyError::NotCoinPurchasable(product_id.to_string()));
        }
        let price = self
            .policy
            .coin_price(product_id)
            .ok_or_else(|| EconomyError::NotCoinPurchasable(product_id.to_string()))?;

        // Ownership check, debit and ledger grant happen under one wallet hold
        {
            let _wallet = self.wallet.lock().unwrap_or_else(|e| e.into_inner());
            if self.entitlements().owns(product_id) {
                return Err(EconomyError::AlreadyOwned(product_id.to_string()));
            }
            let available = self.prefs.coins();
            let needed = u64::from(price);
            if available < needed {
                return Err(EconomyError::InsufficientCoins { needed, available });
            }
            self.prefs.set_coins(available - needed)?;

            if let Err(e) = self.reconciler.grant_coin_purchase(product_id) {
                warn!("Grant of {} failed, refunding {} coins: {}", product_id, needed, e);
                self.prefs.set_coins(available)?;
                return Err(e.into());
            }
        }

        self.telemetry
            .track_purchase_confirmed(product_id, PurchaseSource::Coins, variant_hint);
        info!("Bought {} for {} coins", product_id, price);
        Ok(self.entitlements())
    }

    pub fn equip_skin(&self, skin_id: &str) -> Result<(), EconomyError> {
        self.equip(skin_id, ProductCategory::Skin)
    }

    pub fn equip_sound(&self, sound_id: &str) -> Result<(), EconomyError> {
        self.equip(sound_id, ProductCategory::Sound)
    }

    fn equip(&self, id: &str, category: ProductCategory) -> Result<(), EconomyError> {
        if ProductCategory::of(id) != Some(category) || !self.entitlements().owns_content(id) {
            return Err(EconomyError::NotOwned(id.to_string()));
        }
        match category {
            ProductCategory::Skin => self.prefs.set_equipped_skin(id)?,
            _ => self.prefs.set_equipped_sound(id)?,
        }
        let variant = self.variants.assigned().map(|v| v.as_str()).unwrap_or("");
        self.telemetry.track_equip_click(id, variant);
        Ok(())
    }

    /// Fall back to the starters for equipped items no longer owned.
    /// Returns whether anything changed.
    pub fn enforce_equipped_ownership(&self) -> Result<bool> {
        self.reconciler.enforce_equipped_ownership()
    }

    /// Re-read persisted ownership after an outside change, e.g. a
    /// platform reconciliation
    pub fn refresh_entitlements(&self) -> Result<Arc<Entitlements>> {
        self.reconciler.refresh_entitlements();
        self.enforce_equipped_ownership()?;
        Ok(self.entitlements())
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    pub fn claim_ready_quests(&self) -> Result<QuestClaimSummary> {
        let claimed = self.quests.claim_ready()?;
        let coins_awarded: u64 = claimed.iter().map(|q| q.reward).sum();
        if coins_awarded > 0 {
            self.add_coins(coins_awarded)?;
        }
        Ok(QuestClaimSummary {
            claimed,
            coins_awarded,
        })
    }

    pub fn claim_daily(&self) -> Result<DailyClaim> {
        let claim = self.daily.claim()?;
        if let DailyClaim::Claimed { reward, .. } = claim {
            self.add_coins(reward)?;
        }
        Ok(claim)
    }

    /// Watch a rewarded ad to collect today's reward a second time
    pub async fn claim_daily_ad_bonus<A: AdPlatform>(
        &self,
        platform: &A,
    ) -> Result<AdBonusClaim, EconomyError> {
        if self.entitlements().ads_removed {
            return Err(EconomyError::AdNotReady);
        }
        if !self.daily.ad_bonus_available() {
            return Ok(self.daily.claim_ad_bonus()?);
        }

        self.watch_rewarded(platform).await?;
        let claim = self.daily.claim_ad_bonus()?;
        if let AdBonusClaim::Granted { reward } = claim {
            self.add_coins(reward)?;
        }
        Ok(claim)
    }

    // ========================================================================
    // Shop
    // ========================================================================

    /// Ranked, badged shop page. Counts an impression per listed item.
    pub fn shop(&self, tab: ShopTab, query: &str) -> Result<ShopView> {
        let variant = self.variants.current_or_assign()?;
        let items = filter_items(catalog_items(tab, &self.catalog, &self.policy), query);
        let items = self.merchandiser.rank_and_badge(
            items,
            variant,
            &self.entitlements(),
            |id| self.policy.coin_price(id),
            |id| self.policy.requires_platform_purchase(id),
        );
        for item in &items {
            self.telemetry.track_impression(&item.product_id, variant.as_str());
        }
        Ok(ShopView { variant, items })
    }

    pub fn track_buy_click(&self, product_id: &str) -> Result<()> {
        let variant = self.variants.current_or_assign()?;
        self.telemetry.track_buy_click(product_id, variant.as_str());
        Ok(())
    }

    pub fn shop_variant(&self) -> Option<Variant> {
        self.variants.assigned()
    }

    pub fn force_shop_variant(&self, variant: Variant) -> Result<()> {
        self.variants.force(variant)
    }

    pub fn reset_shop_variant(&self) -> Result<()> {
        self.variants.reset()
    }

    // ========================================================================
    // Engagement
    // ========================================================================

    /// Count a launch; `true` when the remove-ads reminder should show
    pub fn on_launch(&self) -> Result<bool> {
        self.engagement.on_launch(self.entitlements().ads_removed)
    }

    pub fn should_ask_for_review(&self) -> Result<bool> {
        let streak = self.daily.record().streak;
        self.engagement
            .should_ask_for_review(streak, self.prefs.total_pops())
    }

    // ========================================================================
    // Cloud
    // ========================================================================

    pub fn cloud_snapshot(&self) -> CloudSnapshot {
        snapshot_from(&self.prefs)
    }

    /// Apply a snapshot (last write wins) and re-resolve
    pub fn apply_cloud_snapshot(&self, snapshot: &CloudSnapshot) -> Result<Arc<Entitlements>> {
        apply_snapshot(&self.prefs, snapshot)?;
        self.refresh_entitlements()
    }

    pub async fn restore_from_cloud<S: CloudStorage>(&self, sync: &CloudSync<S>) -> Result<bool> {
        if !sync.restore().await? {
            return Ok(false);
        }
        self.refresh_entitlements()?;
        Ok(true)
    }

    pub fn status(&self) -> EconomyStatus {
        let ent = self.entitlements();
        let quest_state = self.quests.state();
        let quests = self
            .quests
            .quests()
            .iter()
            .map(|q| QuestProgress {
                quest: q.clone(),
                progress: quest_state.progress[q.idx],
                claimed: quest_state.claimed[q.idx],
                ready: quest_state.can_claim(q),
            })
            .collect();

        EconomyStatus {
            coins: self.prefs.coins(),
            equipped_skin: self.prefs.equipped_skin(),
            equipped_sound: self.prefs.equipped_sound(),
            ads_removed: ent.ads_removed,
            owned_products: ent.owned_products.clone(),
            owned_content: ent.owned_content.len(),
            daily_ready: self.daily.is_ready(),
            daily_streak: self.daily.record().streak,
            quests,
            boost_active: self.ads.boost_active(ent.ads_removed),
            total_pops: self.prefs.total_pops(),
            total_hold_ms: self.prefs.total_hold_ms(),
            shop_variant: self.variants.assigned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::PurchaseRecord;
    use crate::catalog::{STARTER_SKIN, STARTER_SOUND};
    use crate::clock::{parse_day_key, FixedClock};
    use crate::shop::Badge;
    use crate::store::MemoryStore;
    use crate::types::PlatformError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockAds {
        ready: AtomicBool,
    }

    impl MockAds {
        fn ready() -> Self {
            Self {
                ready: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl AdPlatform for MockAds {
        async fn show_interstitial_if_ready(&self) -> Result<bool, PlatformError> {
            Ok(self.ready.load(Ordering::SeqCst))
        }

        async fn show_rewarded(&self) -> Result<RewardedOutcome, PlatformError> {
            if self.ready.load(Ordering::SeqCst) {
                Ok(RewardedOutcome::Rewarded)
            } else {
                Err(PlatformError::Unavailable("no fill".into()))
            }
        }
    }

    fn session() -> (Arc<FixedClock>, EconomySession) {
        let clock = Arc::new(FixedClock::new(parse_day_key("2024-01-01").unwrap(), 1_000_000));
        let session = EconomySession::open(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            EconomyConfig::default(),
        );
        (clock, session)
    }

    #[test]
    fn test_new_player() {
        let (_, s) = session();
        let status = s.status();
        assert_eq!(status.coins, 0);
        assert_eq!(status.equipped_skin, STARTER_SKIN);
        assert_eq!(status.owned_content, 2);
        assert!(status.daily_ready);
        assert_eq!(status.quests.len(), 3);
    }

    #[test]
    fn test_pops_earn_and_progress() {
        let (_, s) = session();
        let mut last = None;
        for _ in 0..25 {
            last = Some(s.record_pop(2, 100).unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.coins, 50);
        assert_eq!(last.quests_ready, 1);

        let summary = s.claim_ready_quests().unwrap();
        assert_eq!(summary.coins_awarded, 80);
        assert_eq!(s.coins(), 130);
        assert_eq!(s.status().total_hold_ms, 2_500);
    }

    #[test]
    fn test_coin_purchase_paths() {
        let (_, s) = session();
        let err = s.buy_with_coins("skin_002", None).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientCoins {
                needed: 300,
                available: 0
            }
        );

        s.add_coins(1_000).unwrap();
        s.buy_with_coins("skin_002", Some("control")).unwrap();
        assert_eq!(s.coins(), 700);
        assert!(s.entitlements().owns_content("skin_002"));
        assert_eq!(
            s.telemetry().count("purchase_coins", "skin_002", "CONTROL"),
            1
        );

        assert_eq!(
            s.buy_with_coins("skin_002", None).unwrap_err(),
            EconomyError::AlreadyOwned("skin_002".into())
        );
        assert_eq!(
            s.buy_with_coins("skin_020", None).unwrap_err(),
            EconomyError::NotCoinPurchasable("skin_020".into())
        );
        assert_eq!(
            s.buy_with_coins("remove_ads", None).unwrap_err(),
            EconomyError::NotCoinPurchasable("remove_ads".into())
        );
        assert_eq!(s.coins(), 700);
    }

    #[test]
    fn test_equip_requires_ownership() {
        let (_, s) = session();
        assert_eq!(
            s.equip_skin("skin_030").unwrap_err(),
            EconomyError::NotOwned("skin_030".into())
        );
        assert!(s.equip_sound("skin_001").is_err());

        s.reconciler()
            .reconcile(&[PurchaseRecord::purchased("bundle_03", "t1")], false)
            .unwrap();
        s.equip_skin("skin_006").unwrap();
        assert_eq!(s.status().equipped_skin, "skin_006");
    }

    #[test]
    fn test_refund_reverts_equipped_item() {
        let (_, s) = session();
        s.reconciler()
            .reconcile(&[PurchaseRecord::purchased("sound_020", "t1")], false)
            .unwrap();
        s.equip_sound("sound_020").unwrap();

        s.reconciler().reconcile(&[], false).unwrap();
        assert_eq!(s.status().equipped_sound, STARTER_SOUND);
        assert!(!s.enforce_equipped_ownership().unwrap());
    }

    #[test]
    fn test_daily_claim_pays_once() {
        let (clock, s) = session();
        assert!(matches!(s.claim_daily().unwrap(), DailyClaim::Claimed { streak: 1, .. }));
        assert!(matches!(s.claim_daily().unwrap(), DailyClaim::AlreadyClaimed { .. }));
        assert_eq!(s.coins(), 145);

        clock.advance_days(1);
        assert_eq!(
            s.claim_daily().unwrap(),
            DailyClaim::Claimed {
                streak: 2,
                reward: 170
            }
        );
        assert_eq!(s.coins(), 315);
    }

    #[tokio::test]
    async fn test_daily_ad_bonus() {
        let (_, s) = session();
        let ads = MockAds::ready();

        assert_eq!(
            s.claim_daily_ad_bonus(&ads).await.unwrap(),
            AdBonusClaim::DailyNotClaimed
        );
        s.claim_daily().unwrap();
        assert_eq!(
            s.claim_daily_ad_bonus(&ads).await.unwrap(),
            AdBonusClaim::Granted { reward: 145 }
        );
        assert_eq!(
            s.claim_daily_ad_bonus(&ads).await.unwrap(),
            AdBonusClaim::AlreadyClaimed
        );
        assert_eq!(s.coins(), 290);
    }

    #[tokio::test]
    async fn test_boost_doubles_pop_coins() {
        let (clock, s) = session();
        let ads = MockAds::ready();

        assert!(matches!(
            s.activate_boost(&ads).await.unwrap(),
            BoostOutcome::Activated { .. }
        ));
        assert_eq!(s.record_pop(1, 0).unwrap().earned, 2);

        clock.advance_millis(60_000);
        assert_eq!(s.record_pop(1, 0).unwrap().earned, 1);

        ads.ready.store(false, Ordering::SeqCst);
        assert_eq!(
            s.activate_boost(&ads).await.unwrap_err(),
            EconomyError::AdNotReady
        );
    }

    #[tokio::test]
    async fn test_ads_removed_disables_ad_features() {
        let (_, s) = session();
        s.reconciler()
            .reconcile(&[PurchaseRecord::purchased("remove_ads", "t1")], false)
            .unwrap();
        let ads = MockAds::ready();

        assert_eq!(s.activate_boost(&ads).await.unwrap(), BoostOutcome::AdsRemoved);
        assert!(!s.show_interstitial(&ads).await);
        for _ in 0..5 {
            assert!(!s.record_pop(1, 0).unwrap().interstitial_due);
        }
        assert!(!s.on_launch().unwrap());
    }

    #[test]
    fn test_shop_uses_sticky_variant() {
        let (_, s) = session();
        s.force_shop_variant(Variant::ValueStack).unwrap();
        let view = s.shop(ShopTab::Skins, "").unwrap();
        assert_eq!(view.variant, Variant::ValueStack);
        assert_eq!(view.items.len(), 50);
        assert_eq!(view.items.last().unwrap().badge, Some(Badge::Owned));
        assert_eq!(
            s.telemetry().count("impression", "skin_002", "VALUE_STACK"),
            1
        );

        let view = s.shop(ShopTab::Special, "pack 0").unwrap();
        assert_eq!(view.items.len(), 9);
    }

    #[test]
    fn test_cloud_snapshot_restore() {
        let (_, s) = session();
        s.add_coins(600).unwrap();
        s.buy_with_coins("skin_003", None).unwrap();
        s.equip_skin("skin_003").unwrap();
        let snap = s.cloud_snapshot();

        let (_, other) = session();
        let ent = other.apply_cloud_snapshot(&snap).unwrap();
        assert!(ent.owns_content("skin_003"));
        assert_eq!(other.coins(), 100);
        assert_eq!(other.status().equipped_skin, "skin_003");
    }

    #[test]
    fn test_concurrent_pops_keep_every_count() {
        let (_, s) = session();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        s.record_pop(1, 1).unwrap();
                    }
                });
            }
        });
        let status = s.status();
        assert_eq!(status.coins, 1_600);
        assert_eq!(status.total_pops, 1_600);
        assert_eq!(status.total_hold_ms, 1_600);
    }

    #[test]
    fn test_concurrent_buys_debit_once() {
        for _ in 0..50 {
            let (_, s) = session();
            s.add_coins(1_000).unwrap();

            let results: Vec<_> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..4)
                    .map(|_| scope.spawn(|| s.buy_with_coins("skin_002", None)))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == EconomyError::AlreadyOwned("skin_002".into())));
            assert_eq!(s.coins(), 700);
        }
    }

    #[test]
    fn test_concurrent_buys_and_rewards_balance() {
        let (_, s) = session();
        s.add_coins(5_000).unwrap();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for id in ["skin_002", "skin_003", "skin_004"] {
                    s.buy_with_coins(id, None).unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..100 {
                    s.add_coins(10).unwrap();
                }
            });
        });
        // 5000 + 1000 earned - (300 + 500 + 800) spent
        assert_eq!(s.coins(), 4_400);
    }
}
