//! ============================================================================
//! Progression Module - Daily quests and the daily reward streak
//! ============================================================================
//! Both are keyed by the local calendar date and reset lazily on first
//! access in a new day. Neither pays coins itself.
//! ============================================================================

mod daily;
mod quests;

pub use daily::{claim_ad_bonus, claim_daily, AdBonusClaim, DailyClaim, DailyRecord, DailyRewards};
pub use quests::{
    parse_slot_counters, parse_slot_flags, Quest, QuestBook, QuestDef, QuestKind, QuestRecord,
    QuestState,
};
