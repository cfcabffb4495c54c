//! # model
//!
//! Data model for a single volleyball match plus the "winner stays on" waiting
//! line. Field names serialize in camelCase so the persisted record keeps the
//! spelling the scoreboard clients already read.
//!
//! ## Invariants
//! - `is_match_over <=> match_winner.is_some()`
//! - `history.len() == sets_a + sets_b` between transitions
//! - `timeouts_a, timeouts_b <= MAX_TIMEOUTS_PER_SET`
//! - a player id lives in exactly one of {team A roster, team B roster, queue}

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Full strength of a team; generation chunks and rotation refills use it.
pub const PLAYERS_PER_TEAM: usize = 6;

/// Minimum lead required to take a set outside sudden death.
pub const MIN_LEAD_TO_WIN: u32 = 2;

/// Race-to target once a set has entered sudden death.
pub const SUDDEN_DEATH_TARGET: u32 = 3;

pub const MAX_TIMEOUTS_PER_SET: u32 = 2;

/// Depth of the snapshot stack backing undo.
pub const UNDO_DEPTH: usize = 50;

// ── Teams ─────────────────────────────────────────────────────────────────────

/// One of the two sides currently on court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    pub fn opponent(self) -> Self {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::A => write!(f, "A"),
            TeamId::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Locked players are never taken by a rotation refill.
    pub is_fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// How many players the team is missing to reach full strength.
    pub fn open_slots(&self) -> usize {
        PLAYERS_PER_TEAM.saturating_sub(self.players.len())
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeuceType {
    /// Win by two, no cap.
    #[default]
    #[serde(rename = "standard")]
    Standard,
    /// At target-1 all, scores reset to 0-0 and the first side to 3 takes the set.
    #[serde(rename = "sudden_death_3pt")]
    SuddenDeath3pt,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("maxSets must be odd and at least 1 (got {0})")]
    InvalidMaxSets(u32),
    #[error("pointsPerSet must be positive")]
    ZeroPointsPerSet,
    #[error("tieBreakPoints must be positive")]
    ZeroTieBreakPoints,
}

/// Rules of a match. Replaced wholesale when settings are saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    /// Total sets possible (odd). Sets needed to win is the majority of this.
    pub max_sets: u32,
    pub points_per_set: u32,
    /// Target for the deciding set when `has_tie_break` is set.
    pub tie_break_points: u32,
    pub has_tie_break: bool,
    pub deuce_type: DeuceType,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_sets: 5,
            points_per_set: 25,
            tie_break_points: 15,
            has_tie_break: true,
            deuce_type: DeuceType::Standard,
        }
    }
}

impl MatchConfig {
    /// Sets a team must take to win the match: `ceil(max_sets / 2)`.
    pub fn sets_to_win(&self) -> u32 {
        self.max_sets.div_ceil(2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sets == 0 || self.max_sets % 2 == 0 {
            return Err(ConfigError::InvalidMaxSets(self.max_sets));
        }
        if self.points_per_set == 0 {
            return Err(ConfigError::ZeroPointsPerSet);
        }
        if self.tie_break_points == 0 {
            return Err(ConfigError::ZeroTieBreakPoints);
        }
        Ok(())
    }
}

// ── Match Records ─────────────────────────────────────────────────────────────

/// A completed set. Never mutated after it is appended to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub set_number: u32,
    pub score_a: u32,
    pub score_b: u32,
    pub winner: TeamId,
}

/// Describes the substitution the next rotation will apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationDetail {
    pub out_team_name: String,
    pub in_team_name: String,
    pub stolen_players: Vec<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_team_name: Option<String>,
}

/// Set point / match point indicator for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointStatus {
    None,
    SetPoint,
    MatchPoint,
}

// ── Full Match State ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub team_a_name: String,
    pub team_b_name: String,
    pub team_a_roster: Option<Team>,
    pub team_b_roster: Option<Team>,
    /// Waiting line, index 0 is next in.
    #[serde(default)]
    pub queue: Vec<Team>,
    #[serde(default)]
    pub rotation_report: Option<RotationDetail>,
    pub score_a: u32,
    pub score_b: u32,
    pub sets_a: u32,
    pub sets_b: u32,
    /// 1-based.
    pub current_set: u32,
    pub history: Vec<SetRecord>,
    pub is_match_over: bool,
    pub match_winner: Option<TeamId>,
    pub swapped_sides: bool,
    pub in_sudden_death: bool,
    pub config: MatchConfig,
    pub match_duration_seconds: u64,
    pub is_timer_running: bool,
    pub serving_team: Option<TeamId>,
    pub timeouts_a: u32,
    pub timeouts_b: u32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::with_config(MatchConfig::default())
    }
}

impl MatchState {
    /// A fresh match with nothing played and no rosters.
    pub fn with_config(config: MatchConfig) -> Self {
        Self {
            team_a_name: String::new(),
            team_b_name: String::new(),
            team_a_roster: None,
            team_b_roster: None,
            queue: Vec::new(),
            rotation_report: None,
            score_a: 0,
            score_b: 0,
            sets_a: 0,
            sets_b: 0,
            current_set: 1,
            history: Vec::new(),
            is_match_over: false,
            match_winner: None,
            swapped_sides: false,
            in_sudden_death: false,
            config,
            match_duration_seconds: 0,
            is_timer_running: false,
            serving_team: None,
            timeouts_a: 0,
            timeouts_b: 0,
        }
    }

    pub fn score(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.score_a,
            TeamId::B => self.score_b,
        }
    }

    pub fn sets(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.sets_a,
            TeamId::B => self.sets_b,
        }
    }

    pub fn timeouts(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.timeouts_a,
            TeamId::B => self.timeouts_b,
        }
    }

    pub fn team_name(&self, team: TeamId) -> &str {
        match team {
            TeamId::A => &self.team_a_name,
            TeamId::B => &self.team_b_name,
        }
    }

    pub fn roster(&self, team: TeamId) -> Option<&Team> {
        match team {
            TeamId::A => self.team_a_roster.as_ref(),
            TeamId::B => self.team_b_roster.as_ref(),
        }
    }

    /// Side rendered on the left of the court.
    pub fn left_team(&self) -> TeamId {
        if self.swapped_sides {
            TeamId::B
        } else {
            TeamId::A
        }
    }

    pub fn right_team(&self) -> TeamId {
        self.left_team().opponent()
    }

    /// The final possible set of a multi-set match.
    pub fn is_deciding_set(&self) -> bool {
        self.config.max_sets > 1 && self.current_set == self.config.max_sets
    }

    /// Configured target for the current set, ignoring sudden death.
    pub fn set_target(&self) -> u32 {
        if self.is_deciding_set() && self.config.has_tie_break {
            self.config.tie_break_points
        } else {
            self.config.points_per_set
        }
    }

    /// Points needed to take the current set as shown to the operator.
    pub fn points_to_win_set(&self) -> u32 {
        if self.in_sudden_death {
            SUDDEN_DEATH_TARGET
        } else {
            self.set_target()
        }
    }

    pub fn point_status(&self, team: TeamId) -> PointStatus {
        if self.is_match_over {
            return PointStatus::None;
        }
        let score = self.score(team);
        let opponent = self.score(team.opponent());
        let threatening = score + 1 >= self.points_to_win_set() && score > opponent;
        if !threatening {
            return PointStatus::None;
        }
        if self.sets(team) + 1 == self.config.sets_to_win() {
            PointStatus::MatchPoint
        } else {
            PointStatus::SetPoint
        }
    }

    /// Every player id currently held by the two rosters and the queue, in
    /// lookup order.
    pub fn player_ids(&self) -> Vec<&str> {
        self.team_a_roster
            .iter()
            .chain(self.team_b_roster.iter())
            .chain(self.queue.iter())
            .flat_map(|t| t.players.iter().map(|p| p.id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_to_win_is_majority() {
        for (max_sets, expected) in [(1, 1), (3, 2), (5, 3), (7, 4)] {
            let config = MatchConfig { max_sets, ..MatchConfig::default() };
            assert_eq!(config.sets_to_win(), expected);
        }
    }

    #[test]
    fn validate_rejects_even_and_zero_sets() {
        let even = MatchConfig { max_sets: 4, ..MatchConfig::default() };
        assert_eq!(even.validate(), Err(ConfigError::InvalidMaxSets(4)));
        let zero = MatchConfig { max_sets: 0, ..MatchConfig::default() };
        assert_eq!(zero.validate(), Err(ConfigError::InvalidMaxSets(0)));
        let no_points = MatchConfig { points_per_set: 0, ..MatchConfig::default() };
        assert_eq!(no_points.validate(), Err(ConfigError::ZeroPointsPerSet));
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn deciding_set_uses_tie_break_target() {
        let mut state = MatchState::default();
        assert_eq!(state.set_target(), 25);
        state.current_set = 5;
        assert!(state.is_deciding_set());
        assert_eq!(state.set_target(), 15);
        state.config.has_tie_break = false;
        assert_eq!(state.set_target(), 25);
        state.in_sudden_death = true;
        assert_eq!(state.points_to_win_set(), SUDDEN_DEATH_TARGET);
    }

    #[test]
    fn single_set_match_has_no_deciding_set() {
        let state = MatchState::with_config(MatchConfig { max_sets: 1, ..MatchConfig::default() });
        assert!(!state.is_deciding_set());
        assert_eq!(state.set_target(), 25);
    }

    #[test]
    fn point_status_flags_set_and_match_point() {
        let mut state = MatchState::default();
        state.score_a = 24;
        state.score_b = 20;
        assert_eq!(state.point_status(TeamId::A), PointStatus::SetPoint);
        assert_eq!(state.point_status(TeamId::B), PointStatus::None);

        state.sets_a = 2;
        assert_eq!(state.point_status(TeamId::A), PointStatus::MatchPoint);

        state.score_b = 24;
        assert_eq!(state.point_status(TeamId::A), PointStatus::None);
    }

    #[test]
    fn deuce_type_uses_source_spelling() {
        let json = serde_json::to_string(&DeuceType::SuddenDeath3pt).unwrap();
        assert_eq!(json, "\"sudden_death_3pt\"");
        let parsed: DeuceType = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(parsed, DeuceType::Standard);
    }

    #[test]
    fn state_serializes_camel_case() {
        let value = serde_json::to_value(MatchState::default()).unwrap();
        assert!(value.get("teamAName").is_some());
        assert!(value.get("teamARoster").is_some());
        assert!(value.get("matchDurationSeconds").is_some());
        assert_eq!(value["config"]["maxSets"], 5);
    }
}
