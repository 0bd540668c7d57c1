//! Local leaderboard
//!
//! Persisted as JSON under a single storage key:
//! `{ "playerScoresList": [ { "name": "...", "score": 0 }, ... ] }`
//!
//! Append-only: every submission adds an entry, duplicate names included.
//! A missing or unreadable document is treated as an empty leaderboard.

use serde::{Deserialize, Serialize};

use crate::consts::SCORES_KEY;
use crate::platform::storage::{KeyValueStore, StorageError};
use crate::ui::ScoreListView;

/// One submitted result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Persisted document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "playerScoresList", default)]
    pub entries: Vec<ScoreEntry>,
}

impl Scores {
    /// Parse a stored document. Absent, empty or corrupt input yields an
    /// empty list.
    pub fn parse(json: Option<&str>) -> Self {
        let Some(json) = json.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Scores>(json) {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!("Discarding unreadable leaderboard data: {err}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|source| StorageError::Serialize {
            key: SCORES_KEY.to_string(),
            source,
        })
    }
}

/// Owns the leaderboard cache and its backing storage
pub struct LeaderboardStore {
    storage: Box<dyn KeyValueStore>,
    /// Current in-memory order (storage order until sorted)
    entries: Vec<ScoreEntry>,
}

impl LeaderboardStore {
    /// Open the store and load whatever is persisted
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let entries = Scores::parse(storage.get_string(SCORES_KEY).as_deref()).entries;
        log::info!("Loaded {} leaderboard entries", entries.len());
        Self { storage, entries }
    }

    /// Append a result and persist the full list.
    ///
    /// Re-reads storage first so entries written by another session are kept.
    /// A failed write is logged; the entry stays in the in-memory cache.
    pub fn set_score(&mut self, name: &str, score: u32) {
        let mut scores = Scores::parse(self.storage.get_string(SCORES_KEY).as_deref());
        scores.entries.push(ScoreEntry::new(name, score));

        match scores.to_json() {
            Ok(json) => {
                self.storage.set_string(SCORES_KEY, &json);
                if let Err(err) = self.storage.save() {
                    log::error!("Failed to save leaderboard: {err}");
                } else {
                    log::info!("Leaderboard saved ({} entries)", scores.entries.len());
                }
            }
            Err(err) => log::error!("Failed to encode leaderboard: {err}"),
        }

        self.entries = scores.entries;
    }

    /// Score of the first entry named `name`, or 0
    pub fn get_score(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.score)
            .unwrap_or(0)
    }

    /// Highest score first; equal scores keep their relative order
    pub fn sort_by_score(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    }

    /// Name ascending, byte-wise (case-sensitive)
    pub fn sort_by_name(&mut self) {
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Owned copy of the current order
    pub fn snapshot(&self) -> Vec<ScoreEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }
}

impl std::fmt::Debug for LeaderboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// Presents leaderboard rows on a list widget
pub struct LeaderboardView {
    list: Box<dyn ScoreListView>,
    shown: bool,
}

impl LeaderboardView {
    pub fn new(list: Box<dyn ScoreListView>) -> Self {
        Self { list, shown: false }
    }

    /// Render one row per entry, in order
    pub fn show(&mut self, entries: &[ScoreEntry]) {
        for entry in entries {
            self.list.push_row(&entry.name, entry.score);
        }
        self.shown = true;
    }

    /// Remove every rendered row
    pub fn clear(&mut self) {
        self.list.clear();
        self.shown = false;
    }

    /// Clear then redraw (after a sort)
    pub fn refresh(&mut self, entries: &[ScoreEntry]) {
        self.clear();
        self.show(entries);
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::ListRecorder;
    use crate::platform::storage::MemoryStore;
    use proptest::prelude::*;

    fn store_with(entries: &[(&str, u32)]) -> LeaderboardStore {
        let mut store = LeaderboardStore::open(Box::new(MemoryStore::new()));
        for (name, score) in entries {
            store.set_score(name, *score);
        }
        store
    }

    fn names(store: &LeaderboardStore) -> Vec<&str> {
        store.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_wire_format() {
        let store = store_with(&[("Ada", 1)]);
        let json = store.storage().get_string(SCORES_KEY).unwrap();
        assert_eq!(json, r#"{"playerScoresList":[{"name":"Ada","score":1}]}"#);
    }

    #[test]
    fn test_roundtrip_through_storage() {
        let store = store_with(&[("X", 5), ("Y", 2)]);
        let json = store.storage().get_string(SCORES_KEY).unwrap();

        let reopened = LeaderboardStore::open(Box::new(MemoryStore::with_value(SCORES_KEY, &json)));
        assert_eq!(reopened.get_score("X"), 5);
        assert_eq!(reopened.entries(), store.entries());
    }

    #[test]
    fn test_unknown_name_scores_zero() {
        let store = store_with(&[("Ada", 3)]);
        assert_eq!(store.get_score("unknown"), 0);
    }

    #[test]
    fn test_duplicates_append_and_first_wins() {
        let store = store_with(&[("Ada", 3), ("Ada", 9)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_score("Ada"), 3);
    }

    #[test]
    fn test_corrupt_storage_reads_as_empty() {
        for raw in ["", "not json", "{\"playerScoresList\": 7}", "null"] {
            let store = LeaderboardStore::open(Box::new(MemoryStore::with_value(SCORES_KEY, raw)));
            assert!(store.is_empty(), "input {raw:?} should load empty");
        }
        // Missing list field is also empty
        let store = LeaderboardStore::open(Box::new(MemoryStore::with_value(SCORES_KEY, "{}")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_score_recovers_from_corrupt_storage() {
        let mut store =
            LeaderboardStore::open(Box::new(MemoryStore::with_value(SCORES_KEY, "{broken")));
        store.set_score("Ada", 4);
        assert_eq!(store.get_score("Ada"), 4);
        let json = store.storage().get_string(SCORES_KEY).unwrap();
        assert_eq!(Scores::parse(Some(&json)).entries, vec![ScoreEntry::new("Ada", 4)]);
    }

    #[test]
    fn test_sort_by_score_is_stable() {
        let mut store = store_with(&[("A", 3), ("B", 9), ("C", 9)]);
        store.sort_by_score();
        assert_eq!(names(&store), ["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_name() {
        let mut store = store_with(&[("Bob", 1), ("Amy", 2)]);
        store.sort_by_name();
        assert_eq!(names(&store), ["Amy", "Bob"]);

        // Case-sensitive: uppercase sorts before lowercase
        let mut store = store_with(&[("amy", 1), ("Bob", 2)]);
        store.sort_by_name();
        assert_eq!(names(&store), ["Bob", "amy"]);
    }

    #[test]
    fn test_view_refresh_redraws_in_order() {
        let list = ListRecorder::new();
        let mut view = LeaderboardView::new(Box::new(list.clone()));
        let mut store = store_with(&[("A", 3), ("B", 9)]);

        view.show(store.entries());
        assert_eq!(list.names(), ["A", "B"]);

        store.sort_by_score();
        view.refresh(store.entries());
        assert_eq!(list.rows(), vec![("B".to_string(), 9), ("A".to_string(), 3)]);
        assert_eq!(list.clears(), 1);

        view.clear();
        assert!(list.rows().is_empty());
        assert!(!view.is_shown());
    }

    proptest! {
        #[test]
        fn prop_sort_by_score_descending_and_stable(scores in prop::collection::vec(0u32..5, 0..30)) {
            let mut store = LeaderboardStore::open(Box::new(MemoryStore::new()));
            for (i, score) in scores.iter().enumerate() {
                store.set_score(&format!("p{i:02}"), *score);
            }
            store.sort_by_score();
            for pair in store.entries().windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    // Insertion index encoded in the name
                    prop_assert!(pair[0].name < pair[1].name);
                }
            }
        }
    }
}
