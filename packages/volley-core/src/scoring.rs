//! # scoring
//!
//! Point-by-point state machine. Every transition is a pure function of the
//! previous state; `None` means the guard rejected the input and nothing changed.
//!
//! ```text
//! pre-match -> in-set -> [deuce-pending -> sudden-death] -> set-complete
//!                 ^                                              |
//!                 +---------------- next set --------------------+
//!                                                                |
//!                                                      match-complete
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{
    DeuceType, MatchConfig, MatchState, SetRecord, TeamId, MAX_TIMEOUTS_PER_SET,
    MIN_LEAD_TO_WIN, SUDDEN_DEATH_TARGET,
};

/// Replacement display names supplied by the settings surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamNames {
    pub team_a_name: String,
    pub team_b_name: String,
}

// ─── Points ───────────────────────────────────────────────────────────────────

/// Award a rally to `team`, resolving set and match wins.
pub fn add_point(state: &MatchState, team: TeamId) -> Option<MatchState> {
    if state.is_match_over {
        return None;
    }

    // The clock starts on the first point of a fresh match and never restarts
    // on its own after that.
    let timer_running = state.is_timer_running || state.match_duration_seconds == 0;

    let (score_a, score_b) = match team {
        TeamId::A => (state.score_a + 1, state.score_b),
        TeamId::B => (state.score_a, state.score_b + 1),
    };
    let target = state.set_target();

    if state.config.deuce_type == DeuceType::SuddenDeath3pt {
        if state.in_sudden_death {
            if score_a >= SUDDEN_DEATH_TARGET {
                return Some(handle_set_win(state, TeamId::A, score_a, score_b, timer_running));
            }
            if score_b >= SUDDEN_DEATH_TARGET {
                return Some(handle_set_win(state, TeamId::B, score_a, score_b, timer_running));
            }
            return Some(MatchState {
                score_a,
                score_b,
                is_timer_running: timer_running,
                serving_team: Some(team),
                ..state.clone()
            });
        }

        let deuce_at = target.saturating_sub(1);
        if score_a == deuce_at && score_b == deuce_at {
            info!("Set {}: {deuce_at}-{deuce_at}, entering sudden death", state.current_set);
            return Some(MatchState {
                score_a: 0,
                score_b: 0,
                in_sudden_death: true,
                is_timer_running: timer_running,
                serving_team: Some(team),
                ..state.clone()
            });
        }
    }

    match standard_winner(score_a, score_b, target) {
        Some(winner) => Some(handle_set_win(state, winner, score_a, score_b, timer_running)),
        None => {
            debug!("Point {team}: {score_a}-{score_b}");
            Some(MatchState {
                score_a,
                score_b,
                is_timer_running: timer_running,
                serving_team: Some(team),
                ..state.clone()
            })
        }
    }
}

/// A side takes the set once it reaches `target` with a lead of at least two.
pub fn standard_winner(score_a: u32, score_b: u32, target: u32) -> Option<TeamId> {
    if score_a >= target && score_a >= score_b + MIN_LEAD_TO_WIN {
        return Some(TeamId::A);
    }
    if score_b >= target && score_b >= score_a + MIN_LEAD_TO_WIN {
        return Some(TeamId::B);
    }
    None
}

/// Close out the current set for `winner` with the given final score.
pub fn handle_set_win(
    state: &MatchState,
    winner: TeamId,
    final_score_a: u32,
    final_score_b: u32,
    timer_was_running: bool,
) -> MatchState {
    let sets_a = state.sets_a + u32::from(winner == TeamId::A);
    let sets_b = state.sets_b + u32::from(winner == TeamId::B);

    let mut history = state.history.clone();
    history.push(SetRecord {
        set_number: state.current_set,
        score_a: final_score_a,
        score_b: final_score_b,
        winner,
    });

    let needed = state.config.sets_to_win();
    let match_winner = if sets_a == needed {
        Some(TeamId::A)
    } else if sets_b == needed {
        Some(TeamId::B)
    } else {
        None
    };

    match match_winner {
        Some(w) => {
            info!(
                "Match over: team {w} wins {sets_a}-{sets_b} (last set {final_score_a}-{final_score_b})"
            );
            MatchState {
                // Final set score stays on the board.
                score_a: final_score_a,
                score_b: final_score_b,
                sets_a,
                sets_b,
                history,
                is_match_over: true,
                match_winner: Some(w),
                in_sudden_death: false,
                is_timer_running: false,
                serving_team: None,
                timeouts_a: 0,
                timeouts_b: 0,
                ..state.clone()
            }
        }
        None => {
            info!(
                "Set {} to team {winner} ({final_score_a}-{final_score_b}), sets {sets_a}-{sets_b}",
                state.current_set
            );
            MatchState {
                score_a: 0,
                score_b: 0,
                sets_a,
                sets_b,
                history,
                current_set: state.current_set + 1,
                in_sudden_death: false,
                is_timer_running: timer_was_running,
                serving_team: None,
                timeouts_a: 0,
                timeouts_b: 0,
                ..state.clone()
            }
        }
    }
}

/// Operator correction: take one point back without re-evaluating any rule.
pub fn subtract_point(state: &MatchState, team: TeamId) -> Option<MatchState> {
    if state.is_match_over || state.score(team) == 0 {
        return None;
    }
    let mut next = state.clone();
    match team {
        TeamId::A => next.score_a -= 1,
        TeamId::B => next.score_b -= 1,
    }
    debug!("Corrected team {team}: {}-{}", next.score_a, next.score_b);
    Some(next)
}

// ─── Bookkeeping ──────────────────────────────────────────────────────────────

pub fn use_timeout(state: &MatchState, team: TeamId) -> Option<MatchState> {
    if state.timeouts(team) >= MAX_TIMEOUTS_PER_SET {
        return None;
    }
    let mut next = state.clone();
    match team {
        TeamId::A => next.timeouts_a += 1,
        TeamId::B => next.timeouts_b += 1,
    }
    Some(next)
}

/// Flip the serve. An unset server becomes A.
pub fn toggle_service(state: &MatchState) -> MatchState {
    let serving_team = match state.serving_team {
        Some(TeamId::A) => TeamId::B,
        _ => TeamId::A,
    };
    MatchState {
        serving_team: Some(serving_team),
        ..state.clone()
    }
}

pub fn toggle_sides(state: &MatchState) -> MatchState {
    MatchState {
        swapped_sides: !state.swapped_sides,
        ..state.clone()
    }
}

/// Advance the match clock by one second while it runs.
pub fn tick(state: &MatchState) -> Option<MatchState> {
    if !state.is_timer_running {
        return None;
    }
    Some(MatchState {
        match_duration_seconds: state.match_duration_seconds + 1,
        ..state.clone()
    })
}

/// Rename both sides, keeping any detailed rosters in sync.
pub fn set_team_names(state: &MatchState, names: &TeamNames) -> MatchState {
    let mut next = state.clone();
    rename_sides(&mut next, names);
    next
}

fn rename_sides(state: &mut MatchState, names: &TeamNames) {
    state.team_a_name = names.team_a_name.clone();
    state.team_b_name = names.team_b_name.clone();
    if let Some(roster) = state.team_a_roster.as_mut() {
        roster.name = names.team_a_name.clone();
    }
    if let Some(roster) = state.team_b_roster.as_mut() {
        roster.name = names.team_b_name.clone();
    }
}

// ─── Reset ────────────────────────────────────────────────────────────────────

/// Start the match over, optionally with new rules and names. Rosters and the
/// queue are kept.
pub fn reset_match(
    state: &MatchState,
    config: Option<MatchConfig>,
    names: Option<&TeamNames>,
) -> MatchState {
    let mut next = MatchState::with_config(config.unwrap_or(state.config));
    next.team_a_name = state.team_a_name.clone();
    next.team_b_name = state.team_b_name.clone();
    next.team_a_roster = state.team_a_roster.clone();
    next.team_b_roster = state.team_b_roster.clone();
    next.queue = state.queue.clone();
    if let Some(names) = names {
        rename_sides(&mut next, names);
    }
    info!(
        "Match reset ({} sets to {}, tie-break {})",
        next.config.max_sets, next.config.points_per_set, next.config.has_tie_break
    );
    next
}
