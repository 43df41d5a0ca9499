//! Sticky shop experiment assignment.

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use super::types::Variant;
use crate::store::Prefs;

/// Assigns a variant on first shop visit and reuses it until reset
#[derive(Clone)]
pub struct VariantAssigner {
    prefs: Prefs,
}

impl VariantAssigner {
    pub fn new(prefs: Prefs) -> Self {
        Self { prefs }
    }

    /// Stored variant, if one is assigned and still recognised
    pub fn assigned(&self) -> Option<Variant> {
        self.prefs.shop_variant().and_then(|raw| Variant::parse(&raw))
    }

    pub fn current_or_assign(&self) -> Result<Variant> {
        self.current_or_assign_with(&mut rand::thread_rng())
    }

    pub fn current_or_assign_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Variant> {
        if let Some(v) = self.assigned() {
            return Ok(v);
        }
        let v = Variant::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Variant::Control);
        self.prefs.set_shop_variant(v.as_str())?;
        info!("Assigned shop variant {}", v);
        Ok(v)
    }

    /// Pin a variant, e.g. for QA
    pub fn force(&self, variant: Variant) -> Result<()> {
        self.prefs.set_shop_variant(variant.as_str())
    }

    pub fn reset(&self) -> Result<()> {
        info!("Cleared shop variant assignment");
        self.prefs.clear_shop_variant()
    }
}
