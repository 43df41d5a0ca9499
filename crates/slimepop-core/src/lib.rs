//! ============================================================================
//! SLIMEPOP-CORE: The Slime Pop economy
//! ============================================================================
//! Everything that decides what a player owns, what things cost and what
//! they earn:
//! - content catalog and deterministic bundle grants
//! - entitlement resolution from owned products
//! - monetization policy (platform billing vs. coins)
//! - purchase reconciliation against the billing platform
//! - shop merchandising with A/B variants
//! - daily quests and the daily reward streak
//!
//! Billing, ads and cloud save are async ports; persistence is a generic
//! key-value store with in-memory and redb adapters.
//! ============================================================================

pub mod ads;
pub mod billing;
pub mod catalog;
pub mod clock;
pub mod cloud;
pub mod config;
pub mod engagement;
pub mod entitlements;
pub mod monetization;
pub mod progression;
pub mod session;
pub mod shop;
pub mod store;
pub mod telemetry;
pub mod types;

mod prop_tests;

// Re-export main types for convenience
pub use types::*;
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EconomyConfig;
pub use entitlements::{EntitlementResolver, Entitlements, EntitlementsHub};
pub use monetization::MonetizationPolicy;
pub use session::EconomySession;
pub use store::{KeyValueStore, MemoryStore, Prefs, RedbStore};
