//! Selection and match state machine.
//!
//! Per pair the machine walks `idle -> one-selected -> resolving ->
//! {matched | mismatched} -> idle`. The resolving step is deferred: instead
//! of arming a timer itself, [`GameState::select_card`] hands the caller a
//! [`Resolution`] tagged with the level and epoch it belongs to, and the
//! caller feeds it back through [`GameState::resolve`] once its delay has
//! elapsed. A resolution whose tag no longer matches the live state is
//! stale and gets ignored, so timers that outlive a `start_level` or
//! `reset_game` cannot resurrect a discarded level.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Delay before a confirmed pair flips to matched.
pub const MATCH_DELAY: Duration = Duration::from_millis(500);
/// Delay before a failed pair hides again.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);

/// How a two-card comparison will settle once its delay elapses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionKind {
    Match,
    Mismatch,
}

/// A deferred comparison outcome.
///
/// The caller schedules this after `delay` and hands it back via
/// [`GameState::resolve`]; the `level` and `epoch` tags make it
/// self-invalidating once the state has moved on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub kind: ResolutionKind,
    pub cards: [Pos; 2],
    pub level: u32,
    pub epoch: u64,
    pub delay: Duration,
}

/// Immediate effect of a [`GameState::select_card`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A guard rejected the selection; nothing changed.
    NoChange,
    /// First card of a pair turned face-up.
    Revealed,
    /// Second card turned face-up; the caller must schedule the resolution
    /// after its delay.
    Pending(Resolution),
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Effect of applying a scheduled resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The resolution referred to an abandoned level or epoch; ignored.
    Stale,
    /// Mismatched pair hidden again.
    Hidden,
    /// Pair confirmed matched.
    Matched,
    /// Pair confirmed matched and it was the last one; the level completed.
    Completed,
}

/// Per-level completion progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub completed: u32,
    pub total: u32,
}

/// Reducer-style action surface: every mutation the UI can dispatch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    StartLevel(u32),
    SelectCard(Pos),
    Resolve(Resolution),
    ResetGame,
}

/// What an applied action did, reported back to the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    None,
    Select(SelectOutcome),
    Resolve(ResolveOutcome),
}

/// Full play state of one progression.
///
/// `levels` is sparse: only levels visited so far exist. The `epoch` counter
/// is bumped on every `start_level`/`reset_game` and is deliberately not
/// persisted; in-flight resolutions from before a reload are meaningless.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_level: u32,
    pub levels: Vec<Level>,
    pub selected_cards: Vec<Card>,
    pub moves: u32,
    pub start_time: Option<Millis>,
    #[serde(skip)]
    epoch: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            current_level: 1,
            levels: Vec::new(),
            selected_cards: Vec::new(),
            moves: 0,
            start_time: None,
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current(&self) -> Option<&Level> {
        self.level_by_id(self.current_level)
    }

    pub fn level_by_id(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    fn current_index(&self) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.id == self.current_level)
    }

    /// Single entry point for all mutations: `(state, action) -> effect`.
    pub fn apply<S: SymbolSource>(
        &mut self,
        action: Action,
        generator: &LevelGenerator<S>,
        now_ms: Millis,
    ) -> Result<Effect> {
        match action {
            Action::StartLevel(n) => {
                self.start_level(n, generator, now_ms)?;
                Ok(Effect::None)
            }
            Action::SelectCard(pos) => Ok(Effect::Select(self.select_card(pos)?)),
            Action::Resolve(resolution) => Ok(Effect::Resolve(self.resolve(resolution, now_ms))),
            Action::ResetGame => {
                self.reset_game();
                Ok(Effect::None)
            }
        }
    }

    /// Makes level `n` current, resetting the move counter and selection and
    /// stamping a fresh start time.
    ///
    /// A completed level is retained as-is; an in-progress one is
    /// regenerated, discarding its progress. Bumps the epoch so pending
    /// resolutions against the previous level go stale.
    pub fn start_level<S: SymbolSource>(
        &mut self,
        n: u32,
        generator: &LevelGenerator<S>,
        now_ms: Millis,
    ) -> Result<()> {
        let keep = self
            .level_by_id(n)
            .is_some_and(|level| level.is_completed);
        if !keep {
            let fresh = generator.generate(n)?;
            match self.levels.iter_mut().find(|level| level.id == n) {
                Some(slot) => *slot = fresh,
                None => self.levels.push(fresh),
            }
        }

        self.current_level = n;
        self.selected_cards.clear();
        self.moves = 0;
        self.start_time = Some(now_ms);
        self.epoch += 1;
        log::debug!("started level {n} (epoch {})", self.epoch);
        Ok(())
    }

    /// Reveals the card at `pos` on the current level, if the selection
    /// guards allow it.
    ///
    /// Rejected (as `NoChange`) when the card is matched, already face-up,
    /// already selected, or when two cards are selected — the latter also
    /// covers the delay window before a pending resolution lands, so a third
    /// card can never be revealed mid-comparison.
    pub fn select_card(&mut self, pos: Pos) -> Result<SelectOutcome> {
        use SelectOutcome::*;

        if self.selected_cards.len() >= 2 {
            return Ok(NoChange);
        }

        let Some(index) = self.current_index() else {
            return Ok(NoChange);
        };
        let level = &mut self.levels[index];
        if level.is_completed {
            return Ok(NoChange);
        }

        let pos = level.validate_pos(pos)?;
        if !level.card_at(pos).is_selectable() {
            return Ok(NoChange);
        }
        if self.selected_cards.iter().any(|card| card.pos() == pos) {
            return Ok(NoChange);
        }

        // immediate, synchronous reveal
        level.card_mut(pos).is_revealed = true;
        self.selected_cards.push(level.card_at(pos).clone());

        if self.selected_cards.len() < 2 {
            return Ok(Revealed);
        }

        self.moves += 1;
        let first = &self.selected_cards[0];
        let second = &self.selected_cards[1];
        let kind = if first.symbol == second.symbol {
            ResolutionKind::Match
        } else {
            ResolutionKind::Mismatch
        };
        let delay = match kind {
            ResolutionKind::Match => MATCH_DELAY,
            ResolutionKind::Mismatch => MISMATCH_DELAY,
        };
        log::trace!(
            "comparing {:?} and {:?}: {kind:?}",
            first.pos(),
            second.pos()
        );

        Ok(Pending(Resolution {
            kind,
            cards: [first.pos(), second.pos()],
            level: self.current_level,
            epoch: self.epoch,
            delay,
        }))
    }

    /// Applies a scheduled resolution.
    ///
    /// A resolution tagged with a different epoch or level refers to stale
    /// state (the level was restarted, reset, or switched away from while
    /// the delay ran) and is ignored.
    pub fn resolve(&mut self, resolution: Resolution, now_ms: Millis) -> ResolveOutcome {
        use ResolveOutcome::*;

        if resolution.epoch != self.epoch || resolution.level != self.current_level {
            log::debug!(
                "ignoring stale resolution for level {} (epoch {}, current epoch {})",
                resolution.level,
                resolution.epoch,
                self.epoch
            );
            return Stale;
        }
        let Some(index) = self.current_index() else {
            return Stale;
        };
        let level = &mut self.levels[index];
        if resolution.cards.iter().any(|&pos| !level.grid_size.contains(pos)) {
            return Stale;
        }

        match resolution.kind {
            ResolutionKind::Match => {
                for pos in resolution.cards {
                    let card = level.card_mut(pos);
                    card.is_matched = true;
                }
                self.selected_cards.clear();

                if level.all_matched() {
                    let time_spent = now_ms.saturating_sub(self.start_time.unwrap_or(now_ms));
                    level.record_completion(self.moves, time_spent);
                    log::debug!(
                        "level {} completed in {} moves, {time_spent}ms",
                        level.id,
                        self.moves
                    );
                    Completed
                } else {
                    Matched
                }
            }
            ResolutionKind::Mismatch => {
                for pos in resolution.cards {
                    level.card_mut(pos).is_revealed = false;
                }
                self.selected_cards.clear();
                Hidden
            }
        }
    }

    /// Clears all progress and returns to the initial empty state.
    pub fn reset_game(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self::new();
        self.epoch = epoch;
        log::debug!("game state reset (epoch {epoch})");
    }

    pub fn level_progress(&self) -> LevelProgress {
        let completed = self
            .levels
            .iter()
            .filter(|level| level.is_completed)
            .count() as u32;
        let total = self.current_level.max(self.levels.len() as u32);
        LevelProgress { completed, total }
    }
}
