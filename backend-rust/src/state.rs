use serde::{Deserialize, Serialize};
use volley_core::{
    format_duration, rotation_notice, MatchConfig, MatchSession, MatchState, MatchSummary,
    PointStatus, Team, TeamId, TeamNames,
};

// ─── Broadcast View ──────────────────────────────────────────────────────────

/// What every client receives on `init-state` / `state-update`: the raw state
/// plus the values the scoreboard would otherwise derive itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub state: MatchState,
    pub can_undo: bool,
    pub sets_to_win: u32,
    pub points_to_win_set: u32,
    /// Match clock as `MM:SS` / `H:MM:SS`.
    pub clock: String,
    pub point_status_a: PointStatus,
    pub point_status_b: PointStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MatchSummary>,
    /// Shareable result text, present with `summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
    pub rotation_notice: Option<String>,
}

impl MatchView {
    pub fn from_session(session: &MatchSession) -> Self {
        let state = session.state();
        let summary = MatchSummary::from_state(state);
        Self {
            can_undo: session.can_undo(),
            sets_to_win: state.config.sets_to_win(),
            points_to_win_set: state.points_to_win_set(),
            clock: format_duration(state.match_duration_seconds),
            point_status_a: state.point_status(TeamId::A),
            point_status_b: state.point_status(TeamId::B),
            summary_text: summary.as_ref().map(ToString::to_string),
            summary,
            rotation_notice: state.rotation_report.as_ref().and_then(rotation_notice),
            state: state.clone(),
        }
    }
}

// ─── Socket Payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TeamPayload {
    pub team: TeamId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPayload {
    #[serde(default)]
    pub config: Option<MatchConfig>,
    #[serde(default)]
    pub names: Option<TeamNames>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsPayload {
    pub config: MatchConfig,
    #[serde(default)]
    pub names: Option<TeamNames>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePayload {
    pub names: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RostersPayload {
    #[serde(default)]
    pub team_a: Option<Team>,
    #[serde(default)]
    pub team_b: Option<Team>,
    #[serde(default)]
    pub queue: Vec<Team>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamNamePayload {
    pub team_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub player_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlayerPayload {
    pub player_id: String,
    pub target_team_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLockPayload {
    pub team_id: String,
    pub player_id: String,
}
