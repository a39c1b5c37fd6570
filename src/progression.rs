//! Named save slots and the storage-facing persistence layer.
//!
//! The core never blocks on persistence: storage is a caller-supplied
//! key/value collaborator, and every failure on the way in or out is logged
//! and absorbed so gameplay continues on in-memory state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GameState, Millis};

/// Raised by storage backends. Always absorbed by [`load`]/[`save`]; never
/// surfaced to gameplay code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("storage backend failure: {0}")]
pub struct StorageError(pub String);

/// Key/value JSON storage collaborator (AsyncStorage, localStorage, a flat
/// file, ...).
pub trait ProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage key of the multi-progression envelope.
pub const PROGRESSIONS_KEY: &str = "memorito:progressions:v1";
/// Storage key of the legacy single-state format, migrated away on first load.
pub const LEGACY_STATE_KEY: &str = "memorito:game:v1";

/// An independent, named save slot wrapping its own full game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub id: String,
    pub name: String,
    pub created_at: Millis,
    pub last_played: Millis,
    pub game_state: GameState,
}

/// Top-level persisted envelope: every save slot plus which one is active.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSet {
    pub progressions: Vec<Progression>,
    pub active_progression_id: Option<String>,
}

/// Per-slot totals for progression pickers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSummary {
    pub id: String,
    pub name: String,
    pub current_level: u32,
    pub completed_levels: u32,
    pub last_played: Millis,
    pub total_moves: u32,
    pub total_time: Millis,
}

impl ProgressionSet {
    pub fn active(&self) -> Option<&Progression> {
        let id = self.active_progression_id.as_deref()?;
        self.progressions.iter().find(|p| p.id == id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Progression> {
        let id = self.active_progression_id.as_deref()?;
        self.progressions.iter_mut().find(|p| p.id == id)
    }

    /// Creates a fresh slot, makes it active, and returns its id.
    pub fn create(&mut self, name: &str, now_ms: Millis) -> String {
        let mut id = now_ms.to_string();
        while self.progressions.iter().any(|p| p.id == id) {
            id.push('0');
        }

        self.progressions.push(Progression {
            id: id.clone(),
            name: name.to_string(),
            created_at: now_ms,
            last_played: now_ms,
            game_state: GameState::new(),
        });
        self.active_progression_id = Some(id.clone());
        log::debug!("created progression {id:?} ({name})");
        id
    }

    /// Switches the active slot, stamping its `last_played`. Returns false
    /// when no slot has that id.
    pub fn switch(&mut self, id: &str, now_ms: Millis) -> bool {
        let Some(target) = self.progressions.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        target.last_played = now_ms;
        self.active_progression_id = Some(id.to_string());
        true
    }

    /// Deletes a slot. Deleting the active one falls back to the most
    /// recently played remaining slot, or to none.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.progressions.len();
        self.progressions.retain(|p| p.id != id);
        if self.progressions.len() == before {
            return false;
        }

        if self.active_progression_id.as_deref() == Some(id) {
            self.active_progression_id = self
                .progressions
                .iter()
                .max_by_key(|p| p.last_played)
                .map(|p| p.id.clone());
        }
        true
    }

    pub fn summaries(&self) -> Vec<ProgressionSummary> {
        self.progressions
            .iter()
            .map(|progression| {
                let state = &progression.game_state;
                ProgressionSummary {
                    id: progression.id.clone(),
                    name: progression.name.clone(),
                    current_level: state.current_level,
                    completed_levels: state
                        .levels
                        .iter()
                        .filter(|level| level.is_completed)
                        .count() as u32,
                    last_played: progression.last_played,
                    total_moves: state.levels.iter().map(|level| level.moves).sum(),
                    total_time: state
                        .levels
                        .iter()
                        .filter_map(|level| level.time_spent)
                        .sum(),
                }
            })
            .collect()
    }
}

/// Wraps a legacy single-state save into a one-slot set named "Main Game".
pub fn migrate_legacy(state: GameState, now_ms: Millis) -> ProgressionSet {
    let id = format!("migrated-{now_ms}");
    ProgressionSet {
        active_progression_id: Some(id.clone()),
        progressions: vec![Progression {
            id,
            name: "Main Game".to_string(),
            created_at: now_ms,
            last_played: now_ms,
            game_state: state,
        }],
    }
}

/// Loads the progression set, migrating the legacy single-state format when
/// only that exists. Storage and decode failures yield the empty default.
pub fn load<T: ProgressStore>(store: &mut T, now_ms: Millis) -> ProgressionSet {
    match store.get(PROGRESSIONS_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(set) => return set,
            Err(err) => {
                log::warn!("discarding unreadable progression data: {err}");
                return ProgressionSet::default();
            }
        },
        Ok(None) => {}
        Err(err) => {
            log::warn!("storage unavailable, starting fresh: {err}");
            return ProgressionSet::default();
        }
    }

    match store.get(LEGACY_STATE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<GameState>(&json) {
            Ok(state) => {
                log::debug!("migrating legacy game state into a progression");
                let set = migrate_legacy(state, now_ms);
                if let Err(err) = store.remove(LEGACY_STATE_KEY) {
                    log::warn!("failed to drop legacy save: {err}");
                }
                save(store, &set);
                set
            }
            Err(err) => {
                log::warn!("discarding unreadable legacy game state: {err}");
                ProgressionSet::default()
            }
        },
        Ok(None) => ProgressionSet::default(),
        Err(err) => {
            log::warn!("storage unavailable, starting fresh: {err}");
            ProgressionSet::default()
        }
    }
}

/// Fire-and-forget save: failures are logged and gameplay continues.
pub fn save<T: ProgressStore>(store: &mut T, set: &ProgressionSet) {
    match serde_json::to_string(set) {
        Ok(json) => {
            if let Err(err) = store.set(PROGRESSIONS_KEY, &json) {
                log::warn!("failed to persist progressions: {err}");
            }
        }
        Err(err) => log::warn!("failed to encode progressions: {err}"),
    }
}

/// Clears persisted progress in both formats.
pub fn clear<T: ProgressStore>(store: &mut T) {
    for key in [PROGRESSIONS_KEY, LEGACY_STATE_KEY] {
        if let Err(err) = store.remove(key) {
            log::warn!("failed to clear {key}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelGenerator;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        entries: HashMap<String, String>,
        fail: bool,
    }

    impl ProgressStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail {
                return Err(StorageError("disk on fire".to_string()));
            }
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError("disk on fire".to_string()));
            }
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError("disk on fire".to_string()));
            }
            self.entries.remove(key);
            Ok(())
        }
    }

    #[test]
    fn create_switch_delete_track_the_active_slot() {
        let mut set = ProgressionSet::default();

        let first = set.create("First", 1_000);
        let second = set.create("Second", 2_000);
        assert_eq!(set.active_progression_id.as_deref(), Some(second.as_str()));

        assert!(set.switch(&first, 3_000));
        assert_eq!(set.active().unwrap().name, "First");
        assert_eq!(set.active().unwrap().last_played, 3_000);

        // deleting the active slot falls back to the most recently played
        assert!(set.delete(&first));
        assert_eq!(set.active_progression_id.as_deref(), Some(second.as_str()));

        assert!(set.delete(&second));
        assert_eq!(set.active_progression_id, None);
        assert!(!set.delete("nope"));
    }

    #[test]
    fn save_then_load_round_trips_the_envelope() {
        let generator = LevelGenerator::new(5);
        let mut set = ProgressionSet::default();
        set.create("Main", 1_000);
        set.active_mut()
            .unwrap()
            .game_state
            .start_level(1, &generator, 1_500)
            .unwrap();

        let mut store = MemoryStore::default();
        save(&mut store, &set);
        let loaded = load(&mut store, 2_000);

        // the runtime-only epoch is not persisted, so compare wire forms
        assert_eq!(
            serde_json::to_string(&loaded).unwrap(),
            serde_json::to_string(&set).unwrap()
        );
        assert_eq!(loaded.active().unwrap().game_state.current_level, 1);
    }

    #[test]
    fn persisted_envelope_uses_the_storage_layout() {
        let mut set = ProgressionSet::default();
        set.create("Main", 1_000);

        let json = serde_json::to_string(&set).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("progressions").is_some());
        assert!(value.get("activeProgressionId").is_some());
        let state = &value["progressions"][0]["gameState"];
        for key in ["currentLevel", "levels", "selectedCards", "moves", "startTime"] {
            assert!(state.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn legacy_single_state_is_migrated_into_main_game() {
        let generator = LevelGenerator::new(5);
        let mut state = GameState::new();
        state.start_level(2, &generator, 500).unwrap();
        let legacy_json = serde_json::to_string(&state).unwrap();

        let mut store = MemoryStore::default();
        store.set(LEGACY_STATE_KEY, &legacy_json).unwrap();

        let set = load(&mut store, 9_000);

        assert_eq!(set.progressions.len(), 1);
        assert_eq!(set.progressions[0].name, "Main Game");
        assert_eq!(set.active().unwrap().game_state.current_level, 2);
        // the legacy key is gone and the new envelope is persisted
        assert_eq!(store.get(LEGACY_STATE_KEY).unwrap(), None);
        assert!(store.get(PROGRESSIONS_KEY).unwrap().is_some());

        // subsequent loads no longer migrate
        let again = load(&mut store, 10_000);
        assert_eq!(again.progressions[0].id, set.progressions[0].id);
    }

    #[test]
    fn storage_failure_degrades_to_the_empty_default() {
        let mut store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };

        let set = load(&mut store, 1_000);
        assert_eq!(set, ProgressionSet::default());

        // saving into a broken store must not panic either
        save(&mut store, &set);
        clear(&mut store);
    }

    #[test]
    fn unreadable_data_degrades_to_the_empty_default() {
        let mut store = MemoryStore::default();
        store.set(PROGRESSIONS_KEY, "not json").unwrap();

        assert_eq!(load(&mut store, 1_000), ProgressionSet::default());
    }

    #[test]
    fn summaries_total_each_slot_independently() {
        let generator = LevelGenerator::new(5);
        let mut set = ProgressionSet::default();
        set.create("Empty", 1_000);
        let busy = set.create("Busy", 2_000);
        assert!(set.switch(&busy, 2_500));

        let state = &mut set.active_mut().unwrap().game_state;
        state.start_level(1, &generator, 3_000).unwrap();
        let index = state.levels.iter().position(|l| l.id == 1).unwrap();
        state.levels[index].record_completion(4, 8_000);

        let summaries = set.summaries();
        assert_eq!(summaries.len(), 2);
        let empty = summaries.iter().find(|s| s.name == "Empty").unwrap();
        assert_eq!(empty.completed_levels, 0);
        assert_eq!(empty.total_moves, 0);
        let busy = summaries.iter().find(|s| s.name == "Busy").unwrap();
        assert_eq!(busy.completed_levels, 1);
        assert_eq!(busy.total_moves, 4);
        assert_eq!(busy.total_time, 8_000);
    }
}
