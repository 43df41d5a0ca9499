//! ============================================================================
//! Daily Quests
//! ============================================================================
//! Three slots per day. Pop events feed every `Pops` slot, hold time feeds
//! every `HoldMillis` slot. State resets lazily: the first read on a new
//! calendar day starts from zero.
//!
//! The in-memory state is authoritative between writes. Every update is a
//! read-modify-write of the whole record under one lock, so rapid updates
//! are never lost.
//!
//! Claiming marks a slot done. Paying the reward is the caller's job.
//! ============================================================================

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::clock::{day_key, parse_day_key, Clock};
use crate::config::QUEST_SLOTS;
use crate::store::Prefs;

/// What a quest slot counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Pops,
    HoldMillis,
}

/// Configured quest slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDef {
    pub title: String,
    pub kind: QuestKind,
    pub target: u64,
    pub reward: u64,
}

impl QuestDef {
    pub fn new(title: &str, kind: QuestKind, target: u64, reward: u64) -> Self {
        Self {
            title: title.to_string(),
            kind,
            target,
            reward,
        }
    }
}

/// A quest slot for today
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub idx: usize,
    pub title: String,
    pub kind: QuestKind,
    pub target: u64,
    pub reward: u64,
}

/// One day's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestState {
    pub date: NaiveDate,
    pub progress: [u64; QUEST_SLOTS],
    pub claimed: [bool; QUEST_SLOTS],
}

impl QuestState {
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            progress: [0; QUEST_SLOTS],
            claimed: [false; QUEST_SLOTS],
        }
    }

    pub fn can_claim(&self, quest: &Quest) -> bool {
        !self.claimed[quest.idx] && self.progress[quest.idx] >= quest.target
    }

    fn add(&mut self, quests: &[Quest], kind: QuestKind, amount: u64) {
        for q in quests.iter().filter(|q| q.kind == kind) {
            self.progress[q.idx] = self.progress[q.idx].saturating_add(amount);
        }
    }

    fn to_record(self) -> QuestRecord {
        QuestRecord {
            date: day_key(self.date),
            progress: self.progress,
            claimed: self.claimed,
        }
    }
}

/// Persisted form of `QuestState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub date: String,
    pub progress: [u64; QUEST_SLOTS],
    pub claimed: [bool; QUEST_SLOTS],
}

/// Parse `q0=3,q1=3,q2=1500`. Bad tokens and unknown slots are skipped.
pub fn parse_slot_counters(csv: &str) -> [u64; QUEST_SLOTS] {
    let mut out = [0; QUEST_SLOTS];
    for (idx, value) in slot_pairs(csv) {
        if let Ok(v) = value.parse() {
            out[idx] = v;
        }
    }
    out
}

/// Parse `q0=1,q1=0,q2=0`. Only `1` counts as claimed.
pub fn parse_slot_flags(csv: &str) -> [bool; QUEST_SLOTS] {
    let mut out = [false; QUEST_SLOTS];
    for (idx, value) in slot_pairs(csv) {
        if let Ok(v) = value.parse::<i64>() {
            out[idx] = v == 1;
        }
    }
    out
}

fn slot_pairs(csv: &str) -> impl Iterator<Item = (usize, &str)> {
    csv.split(',').filter_map(|token| {
        let (key, value) = token.split_once('=')?;
        if value.contains('=') {
            return None;
        }
        let idx: usize = key.trim().strip_prefix('q')?.parse().ok()?;
        (idx < QUEST_SLOTS).then(|| (idx, value.trim()))
    })
}

/// Today's quests backed by persisted state
pub struct QuestBook {
    prefs: Prefs,
    clock: Arc<dyn Clock>,
    quests: Vec<Quest>,
    state: Mutex<Option<QuestState>>,
}

impl QuestBook {
    /// `defs` must hold exactly `QUEST_SLOTS` entries; extra ones are ignored
    pub fn new(prefs: Prefs, clock: Arc<dyn Clock>, defs: &[QuestDef]) -> Self {
        let quests = defs
            .iter()
            .take(QUEST_SLOTS)
            .enumerate()
            .map(|(idx, d)| Quest {
                idx,
                title: d.title.clone(),
                kind: d.kind,
                target: d.target,
                reward: d.reward,
            })
            .collect();
        Self {
            prefs,
            clock,
            quests,
            state: Mutex::new(None),
        }
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// Today's state, resetting if the day changed
    pub fn state(&self) -> QuestState {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.current_locked(&mut guard)
    }

    pub fn record_pops(&self, pops: u64) -> Result<QuestState> {
        self.record_activity(pops, 0)
    }

    pub fn record_hold_ms(&self, hold_ms: u64) -> Result<QuestState> {
        self.record_activity(0, hold_ms)
    }

    /// Apply pops and hold time in one update
    pub fn record_activity(&self, pops: u64, hold_ms: u64) -> Result<QuestState> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.current_locked(&mut guard);
        if pops > 0 {
            state.add(&self.quests, QuestKind::Pops, pops);
        }
        if hold_ms > 0 {
            state.add(&self.quests, QuestKind::HoldMillis, hold_ms);
        }
        *guard = Some(state);
        self.prefs.set_quest_record(&state.to_record())?;
        Ok(state)
    }

    /// Quests completed but not yet claimed
    pub fn ready(&self) -> Vec<Quest> {
        let state = self.state();
        self.quests
            .iter()
            .filter(|q| state.can_claim(q))
            .cloned()
            .collect()
    }

    /// Mark one quest claimed. `false` when it was not claimable.
    pub fn claim(&self, quest: &Quest) -> Result<bool> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.current_locked(&mut guard);
        if !state.can_claim(quest) {
            return Ok(false);
        }
        state.claimed[quest.idx] = true;
        *guard = Some(state);
        self.prefs.set_quest_record(&state.to_record())?;
        info!("Quest {} claimed: {}", quest.idx, quest.title);
        Ok(true)
    }

    /// Claim everything claimable, returning what was claimed
    pub fn claim_ready(&self) -> Result<Vec<Quest>> {
        let mut claimed = Vec::new();
        for quest in self.ready() {
            if self.claim(&quest)? {
                claimed.push(quest);
            }
        }
        Ok(claimed)
    }

    fn current_locked(&self, cached: &mut Option<QuestState>) -> QuestState {
        let today = self.clock.today();
        if let Some(state) = cached.filter(|s| s.date == today) {
            return state;
        }
        let state = self.load(today);
        *cached = Some(state);
        state
    }

    fn load(&self, today: NaiveDate) -> QuestState {
        if let Some(record) = self.prefs.quest_record() {
            if parse_day_key(&record.date) == Some(today) {
                return QuestState {
                    date: today,
                    progress: record.progress,
                    claimed: record.claimed,
                };
            }
        } else if let Some(state) = self.migrate_legacy(today) {
            return state;
        }

        debug!("Starting quest day {}", today);
        let state = QuestState::fresh(today);
        if let Err(e) = self.prefs.set_quest_record(&state.to_record()) {
            warn!("Failed to persist quest reset: {}", e);
        }
        state
    }

    fn migrate_legacy(&self, today: NaiveDate) -> Option<QuestState> {
        let (date, progress, claimed) = self.prefs.legacy_quest_strings()?;
        if let Err(e) = self.prefs.clear_legacy_quest_strings() {
            warn!("Failed to clear legacy quest keys: {}", e);
        }
        if parse_day_key(&date) != Some(today) {
            return None;
        }

        let state = QuestState {
            date: today,
            progress: parse_slot_counters(&progress),
            claimed: parse_slot_flags(&claimed),
        };
        info!("Migrated legacy quest state for {}", date);
        if let Err(e) = self.prefs.set_quest_record(&state.to_record()) {
            warn!("Failed to persist migrated quest state: {}", e);
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::QuestConfig;
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        parse_day_key(s).unwrap()
    }

    fn book(today: &str) -> (Arc<FixedClock>, Prefs, QuestBook) {
        let clock = Arc::new(FixedClock::new(date(today), 0));
        let prefs = Prefs::new(Arc::new(MemoryStore::new()));
        let book = QuestBook::new(prefs.clone(), clock.clone(), &QuestConfig::default().slots);
        (clock, prefs, book)
    }

    #[test]
    fn test_claimable_scenario() {
        let (_, _, book) = book("2024-01-01");
        let state = QuestState {
            date: date("2024-01-01"),
            progress: [25, 60, 9_999],
            claimed: [false; 3],
        };
        let q = book.quests();
        assert!(state.can_claim(&q[0]));
        assert!(state.can_claim(&q[1]));
        assert!(!state.can_claim(&q[2]));
    }

    #[test]
    fn test_pops_and_hold_feed_their_slots() {
        let (_, _, book) = book("2024-01-01");
        book.record_pops(3).unwrap();
        let state = book.record_hold_ms(1_500).unwrap();
        assert_eq!(state.progress, [3, 3, 1_500]);
    }

    #[test]
    fn test_claim_is_terminal_for_the_day() {
        let (_, _, book) = book("2024-01-01");
        book.record_pops(30).unwrap();
        let q0 = book.quests()[0].clone();

        assert_eq!(book.ready(), vec![q0.clone()]);
        assert!(book.claim(&q0).unwrap());
        assert!(!book.claim(&q0).unwrap());
        book.record_pops(100).unwrap();
        assert!(!book.state().can_claim(&q0));

        let claimed = book.claim_ready().unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].idx, 1);
    }

    #[test]
    fn test_lazy_daily_reset() {
        let (clock, _, book) = book("2024-01-01");
        book.record_activity(70, 12_000).unwrap();
        book.claim_ready().unwrap();

        clock.advance_days(1);
        let state = book.state();
        assert_eq!(state.date, date("2024-01-02"));
        assert_eq!(state.progress, [0; 3]);
        assert_eq!(state.claimed, [false; 3]);
    }

    #[test]
    fn test_state_survives_reopen() {
        let (clock, prefs, book) = book("2024-01-01");
        book.record_pops(10).unwrap();
        drop(book);

        let reopened = QuestBook::new(prefs, clock, &QuestConfig::default().slots);
        assert_eq!(reopened.state().progress, [10, 10, 0]);
    }

    #[test]
    fn test_stale_record_resets() {
        let (_, prefs, book) = book("2024-01-05");
        prefs
            .set_quest_record(&QuestRecord {
                date: "2024-01-04".into(),
                progress: [99, 99, 99],
                claimed: [true; 3],
            })
            .unwrap();
        assert_eq!(book.state(), QuestState::fresh(date("2024-01-05")));
    }

    #[test]
    fn test_malformed_record_date_resets() {
        let (_, prefs, book) = book("2024-01-05");
        prefs
            .set_quest_record(&QuestRecord {
                date: "yesterday-ish".into(),
                progress: [5, 5, 5],
                claimed: [false; 3],
            })
            .unwrap();
        assert_eq!(book.state().progress, [0; 3]);
    }

    #[test]
    fn test_legacy_strings_migrate() {
        let (_, prefs, book) = book("2024-01-05");
        prefs
            .set_legacy_quest_strings("2024-01-05", "q0=3,q1=3,q2=1500", "q0=1,q1=0,q2=0")
            .unwrap();

        let state = book.state();
        assert_eq!(state.progress, [3, 3, 1_500]);
        assert_eq!(state.claimed, [true, false, false]);
        assert!(prefs.legacy_quest_strings().is_none());
        assert!(prefs.quest_record().is_some());
    }

    #[test]
    fn test_slot_parsing_is_tolerant() {
        assert_eq!(parse_slot_counters(""), [0; 3]);
        assert_eq!(parse_slot_counters("q0=x,q1=7,q9=4,junk,q2=1=2"), [0, 7, 0]);
        assert_eq!(parse_slot_counters(" q2 = 40 , q0=1"), [1, 0, 40]);
        assert_eq!(parse_slot_flags("q0=1,q1=2,q2=true"), [true, false, false]);
    }
}
