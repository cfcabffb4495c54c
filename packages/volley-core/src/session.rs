//! # session
//!
//! `MatchSession` owns the live `MatchState`, its undo history and the id
//! source. Every operator action goes through here so that undo participation
//! and the rotation-report trigger are applied in one place.
//!
//! ## Undo policy
//! - every operator action that changes the state is one undo step, view
//!   toggles included
//! - `reset_match`, `full_reset` and `rotate_teams` collapse the history to
//!   their own result
//! - clock ticks replace the current state without touching the history
//! - the rotation report is folded into the step that ended the match and
//!   rebuilt by every later roster edit
//!
//! Each method returns `true` when the state changed and should be persisted
//! and published.

use tracing::{debug, info};

use crate::history::UndoStack;
use crate::ids::{IdSource, UuidIds};
use crate::model::{MatchConfig, MatchState, Team, TeamId};
use crate::roster::{self, RotationPlan};
use crate::scoring::{self, TeamNames};

pub struct MatchSession {
    state: MatchState,
    history: UndoStack,
    /// What a full reset returns to.
    initial: MatchState,
    ids: Box<dyn IdSource>,
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new(MatchState::default(), Box::new(UuidIds))
    }
}

impl MatchSession {
    pub fn new(initial: MatchState, ids: Box<dyn IdSource>) -> Self {
        Self {
            state: initial.clone(),
            history: UndoStack::new(initial.clone()),
            initial,
            ids,
        }
    }

    /// Continue from a previously saved state with a fresh history.
    pub fn resume(mut self, saved: MatchState) -> Self {
        let saved = roster::refresh_rotation_report(&saved).unwrap_or(saved);
        self.history.reset_to(saved.clone());
        self.state = saved;
        self
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.depth()
    }

    /// The substitution `rotate_teams` would apply right now.
    pub fn rotation_plan(&self) -> Option<RotationPlan> {
        roster::plan_rotation(&self.state)
    }

    fn settle(next: MatchState) -> MatchState {
        roster::refresh_rotation_report(&next).unwrap_or(next)
    }

    fn commit(&mut self, next: Option<MatchState>) -> bool {
        let Some(next) = next else {
            return false;
        };
        let next = Self::settle(next);
        self.history.push(next.clone());
        self.state = next;
        debug!("Committed step (history depth {})", self.history.depth());
        true
    }

    fn collapse(&mut self, next: MatchState) -> bool {
        let next = Self::settle(next);
        self.history.reset_to(next.clone());
        self.state = next;
        true
    }

    // ─── Scoring ─────────────────────────────────────────────────────────────

    pub fn add_point(&mut self, team: TeamId) -> bool {
        let next = scoring::add_point(&self.state, team);
        self.commit(next)
    }

    pub fn subtract_point(&mut self, team: TeamId) -> bool {
        let next = scoring::subtract_point(&self.state, team);
        self.commit(next)
    }

    pub fn use_timeout(&mut self, team: TeamId) -> bool {
        let next = scoring::use_timeout(&self.state, team);
        self.commit(next)
    }

    pub fn toggle_service(&mut self) -> bool {
        let next = scoring::toggle_service(&self.state);
        self.commit(Some(next))
    }

    pub fn toggle_sides(&mut self) -> bool {
        let next = scoring::toggle_sides(&self.state);
        self.commit(Some(next))
    }

    pub fn set_team_names(&mut self, names: &TeamNames) -> bool {
        let next = scoring::set_team_names(&self.state, names);
        self.commit(Some(next))
    }

    /// One second of match clock. Not an undo step.
    pub fn tick(&mut self) -> bool {
        match scoring::tick(&self.state) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo().cloned() else {
            return false;
        };
        debug!("Undo (history depth {})", self.history.depth());
        self.state = Self::settle(previous);
        true
    }

    pub fn reset_match(&mut self, config: Option<MatchConfig>, names: Option<&TeamNames>) -> bool {
        let next = scoring::reset_match(&self.state, config, names);
        self.collapse(next)
    }

    /// Drop everything, rosters included, and return to the initial state.
    pub fn full_reset(&mut self) -> bool {
        info!("Full reset");
        let initial = self.initial.clone();
        self.collapse(initial)
    }

    // ─── Rosters ─────────────────────────────────────────────────────────────

    pub fn generate_teams(&mut self, names_text: &str) -> bool {
        let next = roster::generate_teams(&self.state, names_text, self.ids.as_mut());
        self.commit(Some(next))
    }

    pub fn update_rosters(&mut self, team_a: Option<Team>, team_b: Option<Team>, queue: Vec<Team>) -> bool {
        let next = roster::update_rosters(&self.state, team_a, team_b, queue);
        self.commit(Some(next))
    }

    pub fn clear_rosters(&mut self) -> bool {
        let next = roster::clear_rosters(&self.state);
        self.commit(Some(next))
    }

    pub fn update_team_name(&mut self, team_id: &str, name: &str) -> bool {
        let next = roster::update_team_name(&self.state, team_id, name);
        self.commit(next)
    }

    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let next = roster::remove_player(&self.state, player_id);
        self.commit(next)
    }

    pub fn move_player(&mut self, player_id: &str, target_team_id: &str) -> bool {
        let next = roster::move_player(&self.state, player_id, target_team_id);
        self.commit(next)
    }

    pub fn toggle_player_lock(&mut self, team_id: &str, player_id: &str) -> bool {
        let next = roster::toggle_player_lock(&self.state, team_id, player_id);
        self.commit(next)
    }

    pub fn rotate_teams(&mut self) -> bool {
        match roster::rotate_teams(&self.state) {
            Some(next) => self.collapse(next),
            None => false,
        }
    }
}
