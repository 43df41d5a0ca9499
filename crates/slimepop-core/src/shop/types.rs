//! Shop view models.

use serde::{Deserialize, Serialize};

use crate::catalog::ProductCategory;

/// Badge shown on a shop tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    Owned,
    TopUpgrade,
    BestSeller,
    StarterDeal,
    Premium,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owned => "OWNED",
            Self::TopUpgrade => "TOP UPGRADE",
            Self::BestSeller => "BEST SELLER",
            Self::StarterDeal => "STARTER DEAL",
            Self::Premium => "PREMIUM",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display-only shop row, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub product_id: String,
    pub category: ProductCategory,
    pub title: String,
    pub subtitle: String,
    pub badge: Option<Badge>,
}

/// Shop ranking experiment arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Variant {
    PremiumFirst,
    ValueStack,
    Control,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::PremiumFirst, Variant::ValueStack, Variant::Control];

    /// Case-insensitive; unknown strings yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "PREMIUM_FIRST" => Some(Self::PremiumFirst),
            "VALUE_STACK" => Some(Self::ValueStack),
            "CONTROL" => Some(Self::Control),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PremiumFirst => "PREMIUM_FIRST",
            Self::ValueStack => "VALUE_STACK",
            Self::Control => "CONTROL",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shop page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopTab {
    Skins,
    Sounds,
    /// Ad removal and bundles
    Special,
}

impl ShopTab {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "skins" | "skin" => Some(Self::Skins),
            "sounds" | "sound" => Some(Self::Sounds),
            "special" | "bundles" => Some(Self::Special),
            _ => None,
        }
    }
}
