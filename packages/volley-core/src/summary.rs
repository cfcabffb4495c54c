//! Plain-text summaries shown when a match ends.

use std::fmt;

use serde::Serialize;

use crate::model::{MatchState, RotationDetail, TeamId};

/// `MM:SS`, or `H:MM:SS` once the match passes an hour.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub winner: TeamId,
    pub winner_name: String,
    pub loser_name: String,
    pub winner_sets: u32,
    pub loser_sets: u32,
    /// Per-set scores as `A-B`, in play order.
    pub set_scores: Vec<String>,
    pub total_points_a: u32,
    pub total_points_b: u32,
    pub duration: String,
}

impl MatchSummary {
    pub fn from_state(state: &MatchState) -> Option<Self> {
        let winner = state.match_winner?;
        let loser = winner.opponent();
        Some(Self {
            winner,
            winner_name: display_name(state, winner),
            loser_name: display_name(state, loser),
            winner_sets: state.sets(winner),
            loser_sets: state.sets(loser),
            set_scores: state
                .history
                .iter()
                .map(|set| format!("{}-{}", set.score_a, set.score_b))
                .collect(),
            total_points_a: state.history.iter().map(|set| set.score_a).sum(),
            total_points_b: state.history.iter().map(|set| set.score_b).sum(),
            duration: format_duration(state.match_duration_seconds),
        })
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🏐 VolleyScore Pro")?;
        writeln!(f)?;
        writeln!(
            f,
            "🏆 {} {} x {} {}",
            self.winner_name, self.winner_sets, self.loser_sets, self.loser_name
        )?;
        write!(f, "({})", self.set_scores.join(", "))
    }
}

fn display_name(state: &MatchState, team: TeamId) -> String {
    let name = state.team_name(team).trim();
    if !name.is_empty() {
        return name.to_string();
    }
    match team {
        TeamId::A => "Home".to_string(),
        TeamId::B => "Guest".to_string(),
    }
}

/// One-line description of who was pulled into the incoming team.
pub fn rotation_notice(report: &RotationDetail) -> Option<String> {
    if report.stolen_players.is_empty() {
        return None;
    }
    let players: Vec<&str> = report.stolen_players.iter().map(|p| p.name.as_str()).collect();
    let donor = report
        .donor_team_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(report.out_team_name.as_str());
    Some(format!(
        "{} stole {} from {}",
        report.in_team_name,
        players.join(", "),
        donor
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Player, SetRecord};

    #[test]
    fn durations_format_like_the_scoreboard() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(754), "12:34");
        assert_eq!(format_duration(3600 + 65), "1:01:05");
    }

    #[test]
    fn summary_lists_sets_and_totals() {
        let state = MatchState {
            team_a_name: "Sharks".into(),
            sets_a: 1,
            sets_b: 2,
            history: vec![
                SetRecord { set_number: 1, score_a: 25, score_b: 20, winner: TeamId::A },
                SetRecord { set_number: 2, score_a: 22, score_b: 25, winner: TeamId::B },
                SetRecord { set_number: 3, score_a: 13, score_b: 15, winner: TeamId::B },
            ],
            is_match_over: true,
            match_winner: Some(TeamId::B),
            match_duration_seconds: 3725,
            ..MatchState::default()
        };
        let summary = MatchSummary::from_state(&state).unwrap();
        assert_eq!(summary.winner_name, "Guest");
        assert_eq!(summary.loser_name, "Sharks");
        assert_eq!((summary.total_points_a, summary.total_points_b), (60, 60));
        assert_eq!(summary.duration, "1:02:05");
        assert_eq!(
            summary.to_string(),
            "🏐 VolleyScore Pro\n\n🏆 Guest 2 x 1 Sharks\n(25-20, 22-25, 13-15)"
        );
        assert_eq!(MatchSummary::from_state(&MatchState::default()), None);
    }

    #[test]
    fn rotation_notice_names_the_donor() {
        let mut report = RotationDetail {
            out_team_name: "Team 1".into(),
            in_team_name: "Team 3".into(),
            stolen_players: vec![
                Player { id: "p-1".into(), name: "Ana".into(), is_fixed: false },
                Player { id: "p-2".into(), name: "Bea".into(), is_fixed: false },
            ],
            donor_team_name: Some("Team 4".into()),
        };
        assert_eq!(rotation_notice(&report).as_deref(), Some("Team 3 stole Ana, Bea from Team 4"));

        report.donor_team_name = None;
        assert_eq!(rotation_notice(&report).as_deref(), Some("Team 3 stole Ana, Bea from Team 1"));

        report.stolen_players.clear();
        assert_eq!(rotation_notice(&report), None);
    }
}
