//! ============================================================================
//! Shop Merchandising - Badges and ranking per experiment variant
//! ============================================================================
//! Badge precedence (first match wins):
//!   OWNED > TOP UPGRADE > BEST SELLER > STARTER DEAL > PREMIUM
//!
//! Score = unowned bonus + ad-removal weight + featured bonus + variant term.
//! Sorted by score descending, ties by original position.
//! ============================================================================

use std::collections::HashMap;

use super::types::{Badge, ShopItem, ShopTab, Variant};
use crate::catalog::{Catalog, ProductCategory, REMOVE_ADS};
use crate::entitlements::Entitlements;
use crate::monetization::MonetizationPolicy;

const UNOWNED_BONUS: i64 = 10_000;
const REMOVE_ADS_PREMIUM_FIRST: i64 = 9_000;
const REMOVE_ADS_DEFAULT: i64 = 3_000;
const FEATURED_BONUS: i64 = 5_000;

const PREMIUM_FIRST_PLATFORM: i64 = 3_200;
const PREMIUM_FIRST_COIN_CEILING: i64 = 4_000;
const VALUE_STACK_FREE: i64 = 3_000;
const VALUE_STACK_COIN_CEILING: i64 = 6_000;
const VALUE_STACK_PLATFORM: i64 = 600;
const CONTROL_DECAY_START: i64 = 2_000;

/// Default "STARTER DEAL" band is 1..=3500 coins
pub const STARTER_DEAL_MAX_COINS: u32 = 3_500;

const FEATURED_SKINS: [&str; 8] = [
    "skin_043", "skin_028", "skin_011", "skin_041", "skin_037", "skin_042", "skin_020", "skin_030",
];

const FEATURED_SOUNDS: [&str; 8] = [
    "sound_005", "sound_012", "sound_020", "sound_028", "sound_037", "sound_043", "sound_049",
    "sound_050",
];

/// Ranking rules: featured allowlist and the starter-deal band
#[derive(Debug, Clone)]
pub struct Merchandiser {
    featured: HashMap<String, i64>,
    starter_deal_max_coins: u32,
}

impl Default for Merchandiser {
    fn default() -> Self {
        Self::new(STARTER_DEAL_MAX_COINS)
    }
}

impl Merchandiser {
    pub fn new(starter_deal_max_coins: u32) -> Self {
        let featured = FEATURED_SKINS
            .iter()
            .chain(FEATURED_SOUNDS.iter())
            .enumerate()
            .map(|(i, id)| (id.to_string(), i as i64))
            .collect();
        Self {
            featured,
            starter_deal_max_coins,
        }
    }

    /// Position in the featured allowlist
    pub fn featured_position(&self, product_id: &str) -> Option<i64> {
        self.featured.get(product_id).copied()
    }

    /// Badge every item and order by score. Lookups are total: unknown
    /// prices count as absent and unknown platform status as false.
    pub fn rank_and_badge<C, R>(
        &self,
        items: Vec<ShopItem>,
        variant: Variant,
        entitlements: &Entitlements,
        coin_price: C,
        requires_platform_purchase: R,
    ) -> Vec<ShopItem>
    where
        C: Fn(&str) -> Option<u32>,
        R: Fn(&str) -> bool,
    {
        let mut scored: Vec<(i64, usize, ShopItem)> = items
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                let owned = entitlements.owns(&item.product_id);
                let coin = coin_price(&item.product_id);
                let platform = requires_platform_purchase(&item.product_id);

                item.badge = self.badge_for(&item.product_id, owned, variant, coin, platform);
                let score = self.score_for(&item.product_id, index, owned, variant, coin, platform);
                (score, index, item)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, item)| item).collect()
    }

    fn badge_for(
        &self,
        product_id: &str,
        owned: bool,
        variant: Variant,
        coin: Option<u32>,
        platform: bool,
    ) -> Option<Badge> {
        if owned {
            return Some(Badge::Owned);
        }
        if product_id == REMOVE_ADS {
            return Some(Badge::TopUpgrade);
        }
        if self.featured.contains_key(product_id) {
            return Some(Badge::BestSeller);
        }
        if variant == Variant::ValueStack {
            if let Some(c) = coin {
                if (1..=self.starter_deal_max_coins).contains(&c) {
                    return Some(Badge::StarterDeal);
                }
            }
        }
        if platform {
            return Some(Badge::Premium);
        }
        None
    }

    fn score_for(
        &self,
        product_id: &str,
        index: usize,
        owned: bool,
        variant: Variant,
        coin: Option<u32>,
        platform: bool,
    ) -> i64 {
        let mut score = 0;
        if !owned {
            score += UNOWNED_BONUS;
        }
        if product_id == REMOVE_ADS {
            score += if variant == Variant::PremiumFirst {
                REMOVE_ADS_PREMIUM_FIRST
            } else {
                REMOVE_ADS_DEFAULT
            };
        }
        if let Some(pos) = self.featured_position(product_id) {
            score += FEATURED_BONUS - pos;
        }

        let coin = coin.map(i64::from);
        match variant {
            Variant::PremiumFirst => {
                if platform {
                    score += PREMIUM_FIRST_PLATFORM;
                }
                if let Some(c) = coin.filter(|&c| c > 0) {
                    score += (PREMIUM_FIRST_COIN_CEILING - c).max(0) / 3;
                }
            }
            Variant::ValueStack => {
                match coin {
                    Some(0) => score += VALUE_STACK_FREE,
                    Some(c) => score += (VALUE_STACK_COIN_CEILING - c).max(0),
                    None => {}
                }
                if platform {
                    score += VALUE_STACK_PLATFORM;
                }
            }
            Variant::Control => {
                score += (CONTROL_DECAY_START - index as i64).max(0);
            }
        }
        score
    }
}

/// Unranked rows for a tab, in catalog order
pub fn catalog_items(tab: ShopTab, catalog: &Catalog, policy: &MonetizationPolicy) -> Vec<ShopItem> {
    let item = |id: &str, category: ProductCategory| ShopItem {
        product_id: id.to_string(),
        category,
        title: catalog.title_for(id),
        subtitle: policy.subtitle_for(id),
        badge: None,
    };

    match tab {
        ShopTab::Skins => catalog
            .skins()
            .iter()
            .map(|s| item(&s.id, ProductCategory::Skin))
            .collect(),
        ShopTab::Sounds => catalog
            .sounds()
            .iter()
            .map(|s| item(&s.id, ProductCategory::Sound))
            .collect(),
        ShopTab::Special => std::iter::once(item(REMOVE_ADS, ProductCategory::RemoveAds))
            .chain(
                catalog
                    .bundles()
                    .iter()
                    .map(|b| item(&b.bundle_id, ProductCategory::Bundle)),
            )
            .collect(),
    }
}

/// Case-insensitive match on title or product ID; blank query keeps all
pub fn filter_items(items: Vec<ShopItem>, query: &str) -> Vec<ShopItem> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|i| i.title.to_lowercase().contains(&q) || i.product_id.to_lowercase().contains(&q))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::EntitlementResolver;
    use std::collections::BTreeSet;

    fn ids(items: &[ShopItem]) -> Vec<&str> {
        items.iter().map(|i| i.product_id.as_str()).collect()
    }

    fn rank(tab: ShopTab, variant: Variant, ent: &Entitlements) -> Vec<ShopItem> {
        let catalog = Catalog::standard();
        let policy = MonetizationPolicy::new(catalog.clone());
        let items = catalog_items(tab, &catalog, &policy);
        Merchandiser::default().rank_and_badge(
            items,
            variant,
            ent,
            |id| policy.coin_price(id),
            |id| policy.requires_platform_purchase(id),
        )
    }

    fn find<'a>(items: &'a [ShopItem], id: &str) -> &'a ShopItem {
        items.iter().find(|i| i.product_id == id).unwrap()
    }

    #[test]
    fn test_control_keeps_catalog_order_and_sinks_owned() {
        let ranked = rank(ShopTab::Sounds, Variant::Control, &Entitlements::default());
        // sound_001 is owned; featured sounds lead in allowlist order
        assert_eq!(&ids(&ranked)[..3], &["sound_005", "sound_012", "sound_020"]);
        assert_eq!(ranked.last().unwrap().product_id, "sound_001");
        assert_eq!(ranked.last().unwrap().badge, Some(Badge::Owned));
    }

    #[test]
    fn test_remove_ads_tops_special_tab() {
        for variant in Variant::ALL {
            let ranked = rank(ShopTab::Special, variant, &Entitlements::default());
            assert_eq!(ranked[0].product_id, REMOVE_ADS);
            assert_eq!(ranked[0].badge, Some(Badge::TopUpgrade));
            assert_eq!(ranked[1].product_id, "bundle_01");
            assert_eq!(ranked[1].badge, Some(Badge::Premium));
            assert_eq!(ranked.len(), 21);
        }
    }

    #[test]
    fn test_value_stack_badges() {
        let ranked = rank(ShopTab::Skins, Variant::ValueStack, &Entitlements::default());
        assert_eq!(find(&ranked, "skin_002").badge, Some(Badge::StarterDeal));
        assert_eq!(find(&ranked, "skin_010").badge, Some(Badge::StarterDeal));
        assert_eq!(find(&ranked, "skin_012").badge, None);
        assert_eq!(find(&ranked, "skin_013").badge, Some(Badge::Premium));
        assert_eq!(find(&ranked, "skin_011").badge, Some(Badge::BestSeller));
        assert_eq!(find(&ranked, "skin_001").badge, Some(Badge::Owned));

        // Featured coin skin 11 (15998) beats the cheapest coin skin (15700)
        assert_eq!(ranked[0].product_id, "skin_011");
        assert_eq!(ranked[1].product_id, "skin_002");
    }

    #[test]
    fn test_premium_first_prefers_platform_items() {
        let ranked = rank(ShopTab::Skins, Variant::PremiumFirst, &Entitlements::default());
        // Featured premium skins first, then other premium, then coin skins
        assert_eq!(ranked[0].product_id, "skin_043");
        let first_coin = ranked
            .iter()
            .position(|i| i.badge.is_none())
            .unwrap();
        assert!(ranked[..first_coin]
            .iter()
            .all(|i| i.badge == Some(Badge::Premium) || i.badge == Some(Badge::BestSeller)));
        // No STARTER DEAL outside the value variant
        assert!(ranked.iter().all(|i| i.badge != Some(Badge::StarterDeal)));
    }

    #[test]
    fn test_owned_featured_item_badged_owned_only() {
        let owned: BTreeSet<String> = ["skin_043".to_string()].into_iter().collect();
        let ent = EntitlementResolver::new(Catalog::standard()).resolve(&owned);
        let ranked = rank(ShopTab::Skins, Variant::PremiumFirst, &ent);
        assert_eq!(find(&ranked, "skin_043").badge, Some(Badge::Owned));
        assert_ne!(ranked[0].product_id, "skin_043");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let ranked = rank(ShopTab::Special, Variant::ValueStack, &Entitlements::default());
        let bundles: Vec<&str> = ids(&ranked)[1..].to_vec();
        let mut sorted = bundles.clone();
        sorted.sort();
        assert_eq!(bundles, sorted);
    }

    #[test]
    fn test_filter_items() {
        let catalog = Catalog::standard();
        let policy = MonetizationPolicy::new(catalog.clone());
        let items = catalog_items(ShopTab::Skins, &catalog, &policy);

        assert_eq!(filter_items(items.clone(), "  ").len(), 50);
        let hits = filter_items(items.clone(), "ROSE QUARTZ");
        assert_eq!(ids(&hits), vec!["skin_002"]);
        let hits = filter_items(items, "skin_05");
        assert_eq!(ids(&hits), vec!["skin_050"]);
    }

    #[test]
    fn test_unknown_lookups_are_safe() {
        let items = vec![ShopItem {
            product_id: "mystery".into(),
            category: ProductCategory::Skin,
            title: "Mystery".into(),
            subtitle: String::new(),
            badge: None,
        }];
        let ranked = Merchandiser::default().rank_and_badge(
            items,
            Variant::ValueStack,
            &Entitlements::default(),
            |_| None,
            |_| false,
        );
        assert_eq!(ranked[0].badge, None);
    }
}
