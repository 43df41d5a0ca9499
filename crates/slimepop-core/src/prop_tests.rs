//! Property-based tests for the economy invariants.
//!
//! Case count is configurable via PROPTEST_CASES.

#[cfg(test)]
mod prop_tests {
    use crate::billing::{reconcile_purchases, PurchaseReconciler, PurchaseRecord, PurchaseState};
    use crate::catalog::{grants_for_ordinal, Catalog, STARTER_SKIN, STARTER_SOUND};
    use crate::clock::FixedClock;
    use crate::config::{DailyRewardConfig, QuestConfig};
    use crate::entitlements::{EntitlementResolver, EntitlementsHub};
    use crate::monetization::MonetizationPolicy;
    use crate::progression::{claim_daily, DailyClaim, DailyRecord, QuestBook};
    use crate::shop::{catalog_items, Badge, Merchandiser, ShopTab, Variant};
    use crate::store::{MemoryStore, Prefs};
    use crate::telemetry::RevenueTelemetry;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Arc;

    fn product_id() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..=60).prop_map(|n| format!("skin_{:03}", n)),
            (1u32..=60).prop_map(|n| format!("sound_{:03}", n)),
            (1u32..=25).prop_map(|n| format!("bundle_{:02}", n)),
            Just("remove_ads".to_string()),
            "[a-z_]{0,12}",
        ]
    }

    fn owned_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set(product_id(), 0..12)
    }

    fn record() -> impl Strategy<Value = PurchaseRecord> {
        (
            prop::collection::vec(product_id(), 1..3),
            "[a-z0-9]{4}",
            prop_oneof![
                Just(PurchaseState::Purchased),
                Just(PurchaseState::Pending),
                Just(PurchaseState::Unspecified),
            ],
            any::<bool>(),
        )
            .prop_map(|(product_ids, purchase_token, state, acknowledged)| PurchaseRecord {
                product_ids,
                purchase_token,
                state,
                acknowledged,
            })
    }

    fn variant() -> impl Strategy<Value = Variant> {
        prop_oneof![
            Just(Variant::PremiumFirst),
            Just(Variant::ValueStack),
            Just(Variant::Control),
        ]
    }

    fn tab() -> impl Strategy<Value = ShopTab> {
        prop_oneof![Just(ShopTab::Skins), Just(ShopTab::Sounds), Just(ShopTab::Special)]
    }

    // =====================================================================
    // Entitlements
    // =====================================================================

    proptest! {
        #[test]
        fn starters_always_owned(owned in owned_set()) {
            let ent = EntitlementResolver::new(Catalog::standard()).resolve(&owned);
            prop_assert!(ent.owned_content.contains(STARTER_SKIN));
            prop_assert!(ent.owned_content.contains(STARTER_SOUND));
        }

        #[test]
        fn resolve_is_referentially_transparent(owned in owned_set()) {
            let resolver = EntitlementResolver::new(Catalog::standard());
            prop_assert_eq!(resolver.resolve(&owned), resolver.resolve(&owned));
        }

        #[test]
        fn bundle_grants_distinct_and_at_least_three(i in 0u32..=10_000) {
            let grants = grants_for_ordinal(i);
            let distinct: HashSet<&String> = grants.iter().collect();
            prop_assert!(grants.len() >= 3);
            prop_assert_eq!(distinct.len(), grants.len());
        }
    }

    // =====================================================================
    // Reconciliation
    // =====================================================================

    proptest! {
        #[test]
        fn replay_finds_nothing_new(records in prop::collection::vec(record(), 0..8)) {
            let first = reconcile_purchases(&records, &BTreeSet::new());
            let second = reconcile_purchases(&records, &first.now_owned);
            prop_assert_eq!(&first.now_owned, &second.now_owned);
            prop_assert!(second.newly_owned.is_empty());
        }

        #[test]
        fn restore_of_known_products_is_silent(records in prop::collection::vec(record(), 0..8)) {
            let kv = Arc::new(MemoryStore::new());
            let telemetry = RevenueTelemetry::new(kv.clone());
            let reconciler = PurchaseReconciler::new(
                Prefs::new(kv),
                EntitlementResolver::new(Catalog::standard()),
                EntitlementsHub::default(),
                telemetry.clone(),
            );

            reconciler.reconcile(&records, true).unwrap();
            reconciler.reconcile(&records, true).unwrap();
            reconciler.reconcile(&records, false).unwrap();
            prop_assert!(telemetry.counters().unwrap().is_empty());
        }
    }

    // =====================================================================
    // Merchandising
    // =====================================================================

    proptest! {
        #[test]
        fn owned_items_sink_and_badge_alone(
            owned in owned_set(),
            variant in variant(),
            tab in tab()
        ) {
            let catalog = Catalog::standard();
            let policy = MonetizationPolicy::new(catalog.clone());
            let ent = EntitlementResolver::new(catalog.clone()).resolve(&owned);
            let ranked = Merchandiser::default().rank_and_badge(
                catalog_items(tab, &catalog, &policy),
                variant,
                &ent,
                |id| policy.coin_price(id),
                |id| policy.requires_platform_purchase(id),
            );

            let mut seen_owned = false;
            for item in &ranked {
                let is_owned = ent.owns(&item.product_id);
                prop_assert_eq!(is_owned, item.badge == Some(Badge::Owned));
                if is_owned {
                    seen_owned = true;
                } else {
                    prop_assert!(!seen_owned, "unowned {} ranked below an owned item", item.product_id);
                }
            }
        }
    }

    // =====================================================================
    // Progression
    // =====================================================================

    proptest! {
        #[test]
        fn quest_progress_monotonic_and_claim_terminal(
            ops in prop::collection::vec((0u64..30, 0u64..3_000, any::<bool>()), 1..40)
        ) {
            let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 0));
            let book = QuestBook::new(
                Prefs::new(Arc::new(MemoryStore::new())),
                clock,
                &QuestConfig::default().slots,
            );
            let quests = book.quests().to_vec();
            let mut prev = book.state();

            for (pops, hold, claim) in ops {
                let state = book.record_activity(pops, hold).unwrap();
                for q in &quests {
                    prop_assert!(state.progress[q.idx] >= prev.progress[q.idx]);
                    prop_assert_eq!(
                        state.can_claim(q),
                        !state.claimed[q.idx] && state.progress[q.idx] >= q.target
                    );
                    if prev.claimed[q.idx] {
                        prop_assert!(state.claimed[q.idx]);
                        prop_assert!(!state.can_claim(q));
                    }
                }
                if claim {
                    book.claim_ready().unwrap();
                }
                prev = book.state();
            }
        }

        #[test]
        fn streak_follows_calendar(gaps in prop::collection::vec(1i64..4, 1..20)) {
            let rewards = DailyRewardConfig::default();
            let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let (mut record, _) = claim_daily(&DailyRecord::default(), day, &rewards);
            let mut expected = 1u32;

            for gap in gaps {
                day = day + Duration::days(gap);
                expected = if gap == 1 { expected + 1 } else { 1 };

                let (next, claim) = claim_daily(&record, day, &rewards);
                prop_assert_eq!(
                    claim,
                    DailyClaim::Claimed { streak: expected, reward: rewards.reward_for(expected) }
                );

                let (again, repeat) = claim_daily(&next, day, &rewards);
                prop_assert_eq!(repeat, DailyClaim::AlreadyClaimed { streak: expected });
                prop_assert_eq!(&again, &next);
                record = next;
            }
        }
    }
}
