//! ============================================================================
//! Shop Module - Catalog slices, merchandising and experiment assignment
//! ============================================================================

mod merchandising;
mod types;
mod variant;

pub use merchandising::{catalog_items, filter_items, Merchandiser, STARTER_DEAL_MAX_COINS};
pub use types::{Badge, ShopItem, ShopTab, Variant};
pub use variant::VariantAssigner;
