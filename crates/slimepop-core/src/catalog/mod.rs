//! ============================================================================
//! Catalog Module - Static registries of skins, sounds and bundles
//! ============================================================================
//! The catalog is built once and shared read-only. Components receive it as
//! an `Arc<Catalog>` instead of reaching for global state, so tests can hand
//! in a reduced catalog.
//!
//! Lookups by ID never fail: unknown skins and sounds fall back to the first
//! entry of their list, unknown bundles grant nothing.
//! ============================================================================

mod bundles;
mod skins;
mod sounds;
mod types;

pub use bundles::{grants_for_ordinal, GRANTS_PER_BUNDLE};
pub use types::{
    bundle_id, numeric_suffix, skin_id, sound_id, BundleDef, ProductCategory, Rgb, SkinDef,
    SoundDef, BUNDLE_COUNT, REMOVE_ADS, SKIN_COUNT, SOUND_COUNT, STARTER_SKIN, STARTER_SOUND,
};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static STANDARD: Lazy<Arc<Catalog>> = Lazy::new(|| {
    Arc::new(Catalog::new(
        skins::standard_skins(),
        sounds::standard_sounds(),
        bundles::standard_bundles(),
    ))
});

/// Read-only content registry
#[derive(Debug)]
pub struct Catalog {
    skins: Vec<SkinDef>,
    sounds: Vec<SoundDef>,
    bundles: Vec<BundleDef>,
    skin_index: HashMap<String, usize>,
    sound_index: HashMap<String, usize>,
    bundle_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog. Skin and sound lists must be non-empty: index 0 is
    /// the fallback entry.
    pub fn new(skins: Vec<SkinDef>, sounds: Vec<SoundDef>, bundles: Vec<BundleDef>) -> Self {
        assert!(!skins.is_empty(), "catalog needs at least one skin");
        assert!(!sounds.is_empty(), "catalog needs at least one sound");

        let skin_index = skins.iter().enumerate().map(|(i, s)| (s.id.clone(), i)).collect();
        let sound_index = sounds.iter().enumerate().map(|(i, s)| (s.id.clone(), i)).collect();
        let bundle_index = bundles
            .iter()
            .enumerate()
            .map(|(i, b)| (b.bundle_id.clone(), i))
            .collect();

        Self {
            skins,
            sounds,
            bundles,
            skin_index,
            sound_index,
            bundle_index,
        }
    }

    /// The shipped catalog: 50 skins, 50 sounds, 20 bundles
    pub fn standard() -> Arc<Catalog> {
        Arc::clone(&STANDARD)
    }

    pub fn skins(&self) -> &[SkinDef] {
        &self.skins
    }

    pub fn sounds(&self) -> &[SoundDef] {
        &self.sounds
    }

    pub fn bundles(&self) -> &[BundleDef] {
        &self.bundles
    }

    pub fn find_skin(&self, id: &str) -> Option<&SkinDef> {
        self.skin_index.get(id).map(|&i| &self.skins[i])
    }

    pub fn find_sound(&self, id: &str) -> Option<&SoundDef> {
        self.sound_index.get(id).map(|&i| &self.sounds[i])
    }

    pub fn find_bundle(&self, id: &str) -> Option<&BundleDef> {
        self.bundle_index.get(id).map(|&i| &self.bundles[i])
    }

    /// Skin by ID, falling back to the first skin
    pub fn skin_by_id(&self, id: &str) -> &SkinDef {
        self.find_skin(id).unwrap_or(&self.skins[0])
    }

    /// Sound by ID, falling back to the first sound
    pub fn sound_by_id(&self, id: &str) -> &SoundDef {
        self.find_sound(id).unwrap_or(&self.sounds[0])
    }

    /// Content granted by a bundle; empty for unknown bundle IDs
    pub fn grants_for(&self, bundle_id: &str) -> &[String] {
        self.find_bundle(bundle_id)
            .map(|b| b.granted_product_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn bundle_display_name(&self, bundle_id: &str) -> String {
        self.find_bundle(bundle_id)
            .map(|b| b.display_name.clone())
            .unwrap_or_else(|| bundle_id.to_string())
    }

    /// One bullet line per granted item
    pub fn bundle_description(&self, bundle_id: &str) -> String {
        self.grants_for(bundle_id)
            .iter()
            .map(|id| format!("• {}", self.content_label(id)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Human-readable name for any product ID
    pub fn title_for(&self, product_id: &str) -> String {
        match ProductCategory::of(product_id) {
            Some(ProductCategory::Skin) => self.skin_by_id(product_id).display_name.clone(),
            Some(ProductCategory::Sound) => self.sound_by_id(product_id).display_name.clone(),
            Some(ProductCategory::Bundle) => self.bundle_display_name(product_id),
            Some(ProductCategory::RemoveAds) => "Remove Ads".to_string(),
            None => product_id.to_string(),
        }
    }

    fn content_label(&self, id: &str) -> String {
        match ProductCategory::of(id) {
            Some(ProductCategory::Skin) => format!("Skin: {}", self.skin_by_id(id).display_name),
            Some(ProductCategory::Sound) => format!("Sound: {}", self.sound_by_id(id).display_name),
            _ => id.to_string(),
        }
    }

    /// Every product ID: ad removal, skins, sounds, bundles
    pub fn all_product_ids(&self) -> Vec<String> {
        std::iter::once(REMOVE_ADS.to_string())
            .chain(self.skins.iter().map(|s| s.id.clone()))
            .chain(self.sounds.iter().map(|s| s.id.clone()))
            .chain(self.bundles.iter().map(|b| b.bundle_id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_sizes() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.skins().len(), SKIN_COUNT as usize);
        assert_eq!(catalog.sounds().len(), SOUND_COUNT as usize);
        assert_eq!(catalog.bundles().len(), BUNDLE_COUNT as usize);
        assert_eq!(catalog.all_product_ids().len(), 121);
    }

    #[test]
    fn test_id_formats_match_billing() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.skins()[0].id, STARTER_SKIN);
        assert_eq!(catalog.skins()[49].id, "skin_050");
        assert_eq!(catalog.sounds()[0].id, STARTER_SOUND);
        assert_eq!(catalog.bundles()[19].bundle_id, "bundle_20");
    }

    #[test]
    fn test_unknown_ids_fall_back_to_first_entry() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.skin_by_id("skin_999").id, STARTER_SKIN);
        assert_eq!(catalog.skin_by_id("garbage").id, STARTER_SKIN);
        assert_eq!(catalog.sound_by_id("").id, STARTER_SOUND);
        assert!(catalog.grants_for("bundle_99").is_empty());
        assert_eq!(catalog.bundle_display_name("bundle_99"), "bundle_99");
    }

    #[test]
    fn test_starters_are_free() {
        let catalog = Catalog::standard();
        let skin = catalog.skin_by_id(STARTER_SKIN);
        assert_eq!(skin.coin_price, 0);
        assert!(!skin.requires_platform_purchase);
        assert!(!catalog.sound_by_id(STARTER_SOUND).requires_platform_purchase);
    }

    #[test]
    fn test_bundle_description() {
        let catalog = Catalog::standard();
        let desc = catalog.bundle_description("bundle_01");
        assert_eq!(
            desc,
            "• Skin: Velvet Mint\n• Skin: Rose Quartz\n• Sound: Soft Rain"
        );
    }

    #[test]
    fn test_titles() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.title_for("skin_043"), "Sunrise Gold");
        assert_eq!(catalog.title_for("sound_012"), "Bubble Wrap");
        assert_eq!(catalog.title_for("bundle_02"), "Relax Pack 02");
        assert_eq!(catalog.title_for(REMOVE_ADS), "Remove Ads");
    }
}
