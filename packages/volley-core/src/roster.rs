//! # roster
//!
//! Team composition and the "winner stays on" rotation.
//!
//! ## Lookup order
//! Player and team ids are resolved through [`RosterIndex`], which visits the
//! containers in a fixed order: team A roster, team B roster, then the queue
//! front to back. The first container holding an id owns it.
//!
//! ## Rotation
//! When a match ends with teams waiting, the loser leaves and `queue[0]` comes
//! in. If the incoming team is short-handed it is refilled with unlocked
//! players, taken in list order from `queue[1]` when there is one, otherwise
//! from the outgoing loser. [`plan_rotation`] computes this once; the report
//! and the applied rotation both come from the same plan.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::ids::IdSource;
use crate::model::{MatchState, Player, RotationDetail, Team, PLAYERS_PER_TEAM};

// ── Index ─────────────────────────────────────────────────────────────────────

/// Container holding a team or player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    TeamA,
    TeamB,
    Queue(usize),
}

/// Explicit id -> container map, built in lookup order.
#[derive(Debug, Default)]
pub struct RosterIndex {
    players: HashMap<String, Slot>,
    teams: HashMap<String, Slot>,
}

impl RosterIndex {
    pub fn build(state: &MatchState) -> Self {
        let mut index = Self::default();
        let containers = state
            .team_a_roster
            .iter()
            .map(|t| (Slot::TeamA, t))
            .chain(state.team_b_roster.iter().map(|t| (Slot::TeamB, t)))
            .chain(state.queue.iter().enumerate().map(|(i, t)| (Slot::Queue(i), t)));

        for (slot, team) in containers {
            index.teams.entry(team.id.clone()).or_insert(slot);
            for player in &team.players {
                index.players.entry(player.id.clone()).or_insert(slot);
            }
        }
        index
    }

    pub fn player_slot(&self, player_id: &str) -> Option<Slot> {
        self.players.get(player_id).copied()
    }

    pub fn team_slot(&self, team_id: &str) -> Option<Slot> {
        self.teams.get(team_id).copied()
    }
}

fn team_at_mut(state: &mut MatchState, slot: Slot) -> Option<&mut Team> {
    match slot {
        Slot::TeamA => state.team_a_roster.as_mut(),
        Slot::TeamB => state.team_b_roster.as_mut(),
        Slot::Queue(i) => state.queue.get_mut(i),
    }
}

// ── Roster Editing ────────────────────────────────────────────────────────────

/// Build teams of six from a newline-separated name list, in input order.
/// The first two teams take the court, the rest form the queue.
pub fn generate_teams(state: &MatchState, names_text: &str, ids: &mut dyn IdSource) -> MatchState {
    let players: Vec<Player> = names_text
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Player {
            id: ids.player_id(),
            name: name.to_string(),
            is_fixed: false,
        })
        .collect();

    let teams: Vec<Team> = players
        .chunks(PLAYERS_PER_TEAM)
        .enumerate()
        .map(|(i, chunk)| Team {
            id: ids.team_id(),
            name: format!("Team {}", i + 1),
            players: chunk.to_vec(),
        })
        .collect();

    info!("Generated {} teams from {} players", teams.len(), players.len());

    let mut teams = teams.into_iter();
    let team_a = teams.next();
    let team_b = teams.next();

    MatchState {
        team_a_name: team_a.as_ref().map_or_else(|| "Team A".to_string(), |t| t.name.clone()),
        team_b_name: team_b.as_ref().map_or_else(|| "Team B".to_string(), |t| t.name.clone()),
        team_a_roster: team_a,
        team_b_roster: team_b,
        queue: teams.collect(),
        rotation_report: None,
        ..state.clone()
    }
}

/// Replace all three containers at once.
pub fn update_rosters(
    state: &MatchState,
    team_a: Option<Team>,
    team_b: Option<Team>,
    queue: Vec<Team>,
) -> MatchState {
    MatchState {
        team_a_roster: team_a,
        team_b_roster: team_b,
        queue,
        ..state.clone()
    }
}

pub fn clear_rosters(state: &MatchState) -> MatchState {
    update_rosters(state, None, None, Vec::new())
}

/// Rename a team wherever it sits; court teams also update the display name.
pub fn update_team_name(state: &MatchState, team_id: &str, name: &str) -> Option<MatchState> {
    let slot = RosterIndex::build(state).team_slot(team_id)?;
    let mut next = state.clone();
    team_at_mut(&mut next, slot)?.name = name.to_string();
    match slot {
        Slot::TeamA => next.team_a_name = name.to_string(),
        Slot::TeamB => next.team_b_name = name.to_string(),
        Slot::Queue(_) => {}
    }
    Some(next)
}

pub fn remove_player(state: &MatchState, player_id: &str) -> Option<MatchState> {
    let slot = RosterIndex::build(state).player_slot(player_id)?;
    let mut next = state.clone();
    team_at_mut(&mut next, slot)?.players.retain(|p| p.id != player_id);
    debug!("Removed player {player_id} from {slot:?}");
    Some(next)
}

/// Move a player to the end of another team's list. Unknown ids, an unknown
/// target, or a move onto the player's own team change nothing.
pub fn move_player(state: &MatchState, player_id: &str, target_team_id: &str) -> Option<MatchState> {
    let index = RosterIndex::build(state);
    let source = index.player_slot(player_id)?;
    let target = index.team_slot(target_team_id)?;
    if source == target {
        return None;
    }

    let mut next = state.clone();
    let from = team_at_mut(&mut next, source)?;
    let position = from.players.iter().position(|p| p.id == player_id)?;
    let player = from.players.remove(position);
    team_at_mut(&mut next, target)?.players.push(player);
    debug!("Moved player {player_id} from {source:?} to {target:?}");
    Some(next)
}

/// Lock or unlock a player against rotation refills.
pub fn toggle_player_lock(state: &MatchState, team_id: &str, player_id: &str) -> Option<MatchState> {
    let slot = RosterIndex::build(state).team_slot(team_id)?;
    let mut next = state.clone();
    let player = team_at_mut(&mut next, slot)?
        .players
        .iter_mut()
        .find(|p| p.id == player_id)?;
    player.is_fixed = !player.is_fixed;
    Some(next)
}

// ── Rotation ──────────────────────────────────────────────────────────────────

/// The substitution a finished match will trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    pub report: RotationDetail,
    /// Stays on court and becomes team A.
    pub winner: Team,
    /// `queue[0]` after any refill; becomes team B.
    pub incoming: Team,
    pub queue: Vec<Team>,
}

/// Take up to `needed` unlocked players from the front of `donor`.
fn take_unlocked(donor: &mut Team, needed: usize) -> Vec<Player> {
    let stolen: Vec<Player> = donor
        .players
        .iter()
        .filter(|p| !p.is_fixed)
        .take(needed)
        .cloned()
        .collect();
    donor.players.retain(|p| !stolen.iter().any(|s| s.id == p.id));
    stolen
}

pub fn plan_rotation(state: &MatchState) -> Option<RotationPlan> {
    let winner_id = state.match_winner?;
    let winner = state.roster(winner_id)?.clone();
    let mut loser = state.roster(winner_id.opponent())?.clone();
    let (next_team, waiting) = state.queue.split_first()?;

    let mut incoming = next_team.clone();
    let needed = incoming.open_slots();

    let (stolen, donor_name, queue) = match waiting.split_first() {
        Some((donor, rest)) => {
            let mut donor = donor.clone();
            let stolen = take_unlocked(&mut donor, needed);
            let donor_name = donor.name.clone();
            let mut queue = Vec::with_capacity(state.queue.len());
            queue.push(donor);
            queue.push(loser.clone());
            queue.extend(rest.iter().cloned());
            (stolen, donor_name, queue)
        }
        None => {
            let stolen = take_unlocked(&mut loser, needed);
            (stolen, loser.name.clone(), vec![loser.clone()])
        }
    };
    incoming.players.extend(stolen.iter().cloned());

    let report = RotationDetail {
        out_team_name: loser.name.clone(),
        in_team_name: incoming.name.clone(),
        stolen_players: stolen,
        donor_team_name: Some(donor_name),
    };

    Some(RotationPlan {
        report,
        winner,
        incoming,
        queue,
    })
}

/// Keep the rotation report in line with the substitution `rotate_teams`
/// would apply right now. Only a finished match carries a report; it is
/// rebuilt after every roster change and dropped when no rotation is possible.
/// `None` when the report is already current.
pub fn refresh_rotation_report(state: &MatchState) -> Option<MatchState> {
    if !state.is_match_over {
        return None;
    }
    let report = plan_rotation(state).map(|plan| plan.report);
    if report == state.rotation_report {
        return None;
    }
    match &report {
        Some(report) => info!(
            "Rotation ready: {} out, {} in, {} player(s) from {}",
            report.out_team_name,
            report.in_team_name,
            report.stolen_players.len(),
            report.donor_team_name.as_deref().unwrap_or("-"),
        ),
        None => debug!("Rotation no longer possible, report dropped"),
    }
    Some(MatchState {
        rotation_report: report,
        ..state.clone()
    })
}

/// Apply the rotation and start a fresh match with the same rules.
pub fn rotate_teams(state: &MatchState) -> Option<MatchState> {
    let plan = plan_rotation(state)?;
    info!(
        "Rotating: {} stays, {} comes in ({} waiting)",
        plan.winner.name,
        plan.incoming.name,
        plan.queue.len()
    );

    let mut next = MatchState::with_config(state.config);
    next.team_a_name = plan.winner.name.clone();
    next.team_b_name = plan.incoming.name.clone();
    next.team_a_roster = Some(plan.winner);
    next.team_b_roster = Some(plan.incoming);
    next.queue = plan.queue;
    Some(next)
}
