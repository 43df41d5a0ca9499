//! ============================================================================
//! Catalog Types - Product identifiers, categories and content definitions
//! ============================================================================
//! Product IDs are opaque strings namespaced by prefix. The exact forms
//! (`skin_%03d`, `sound_%03d`, `bundle_%02d`, `remove_ads`) are shared with
//! the billing platform and must not change.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// The single ad-removal product
pub const REMOVE_ADS: &str = "remove_ads";

/// Always-owned starter skin, also the fallback for unknown skin IDs
pub const STARTER_SKIN: &str = "skin_001";

/// Always-owned starter sound, also the fallback for unknown sound IDs
pub const STARTER_SOUND: &str = "sound_001";

pub const SKIN_COUNT: u32 = 50;
pub const SOUND_COUNT: u32 = 50;
pub const BUNDLE_COUNT: u32 = 20;

const SKIN_PREFIX: &str = "skin_";
const SOUND_PREFIX: &str = "sound_";
const BUNDLE_PREFIX: &str = "bundle_";

/// Category of a product, derived from its ID prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Skin,
    Sound,
    Bundle,
    RemoveAds,
}

impl ProductCategory {
    /// Classify a product ID. Garbage IDs belong to no category.
    pub fn of(product_id: &str) -> Option<Self> {
        if product_id == REMOVE_ADS {
            Some(Self::RemoveAds)
        } else if product_id.starts_with(SKIN_PREFIX) {
            Some(Self::Skin)
        } else if product_id.starts_with(SOUND_PREFIX) {
            Some(Self::Sound)
        } else if product_id.starts_with(BUNDLE_PREFIX) {
            Some(Self::Bundle)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skin => "skin",
            Self::Sound => "sound",
            Self::Bundle => "bundle",
            Self::RemoveAds => "remove_ads",
        }
    }

    /// Skins and sounds are content; bundles and ad removal are not
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Skin | Self::Sound)
    }
}

pub fn skin_id(n: u32) -> String {
    format!("{}{:03}", SKIN_PREFIX, n)
}

pub fn sound_id(n: u32) -> String {
    format!("{}{:03}", SOUND_PREFIX, n)
}

pub fn bundle_id(n: u32) -> String {
    format!("{}{:02}", BUNDLE_PREFIX, n)
}

/// Parse the numeric suffix of a product ID (`skin_017` -> 17)
pub fn numeric_suffix(product_id: &str) -> Option<u32> {
    let (_, digits) = product_id.rsplit_once('_')?;
    digits.parse().ok()
}

/// 24-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
    pub fn red(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn green(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn blue(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn hex(&self) -> String {
        format!("#{:06X}", self.0 & 0xFF_FFFF)
    }

    /// Interpolate toward white. 0.0 leaves the colour unchanged, 1.0 is white.
    pub fn lighten(&self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        let lerp = |c: u8| -> u32 {
            let c = c as f32;
            (c + (255.0 - c) * f).clamp(0.0, 255.0) as u32
        };
        Rgb((lerp(self.red()) << 16) | (lerp(self.green()) << 8) | lerp(self.blue()))
    }
}

/// A slime skin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDef {
    pub id: String,
    pub display_name: String,
    pub base_color: Rgb,
    pub highlight_color: Rgb,
    /// Strong glow styles render with a shadow layer
    pub is_glowing: bool,
    /// 0 means not a gameplay unlock (free or platform-only)
    pub coin_price: u32,
    pub requires_platform_purchase: bool,
}

/// An ambient soundscape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDef {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub requires_platform_purchase: bool,
    pub coin_price: u32,
}

/// A composite product granting several content items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDef {
    pub bundle_id: String,
    /// Ordered, distinct, never fewer than three entries
    pub granted_product_ids: Vec<String>,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(ProductCategory::of("skin_001"), Some(ProductCategory::Skin));
        assert_eq!(ProductCategory::of("sound_050"), Some(ProductCategory::Sound));
        assert_eq!(ProductCategory::of("bundle_07"), Some(ProductCategory::Bundle));
        assert_eq!(ProductCategory::of("remove_ads"), Some(ProductCategory::RemoveAds));
        assert_eq!(ProductCategory::of("coins_9999"), None);
        assert_eq!(ProductCategory::of(""), None);
    }

    #[test]
    fn test_id_formats() {
        assert_eq!(skin_id(7), "skin_007");
        assert_eq!(sound_id(42), "sound_042");
        assert_eq!(bundle_id(3), "bundle_03");
        assert_eq!(numeric_suffix("skin_017"), Some(17));
        assert_eq!(numeric_suffix("bundle_20"), Some(20));
        assert_eq!(numeric_suffix("skin_x"), None);
    }

    #[test]
    fn test_rgb_hex_and_lighten() {
        let c = Rgb(0x70DB93);
        assert_eq!(c.hex(), "#70DB93");
        assert_eq!(c.lighten(0.0), c);
        assert_eq!(c.lighten(1.0), Rgb(0xFFFFFF));
        assert_eq!(Rgb(0x000000).lighten(0.5).red(), 127);
    }
}
