//! Generate teams, play a match and rotate the queue through a session.

use volley_core::{
    rotation_notice, record, MatchConfig, MatchSession, MatchState, SequentialIds, TeamId,
};

fn quick_session() -> MatchSession {
    let config = MatchConfig {
        max_sets: 1,
        points_per_set: 5,
        ..MatchConfig::default()
    };
    MatchSession::new(MatchState::with_config(config), Box::new(SequentialIds::new()))
}

fn names(n: usize) -> String {
    (1..=n).map(|i| format!("Player {i}")).collect::<Vec<_>>().join("\n")
}

fn win_match(session: &mut MatchSession, team: TeamId) {
    while !session.state().is_match_over {
        assert!(session.add_point(team));
    }
}

fn sorted_ids(state: &MatchState) -> Vec<String> {
    let mut ids: Vec<String> = state.player_ids().into_iter().map(String::from).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn short_incoming_team_is_refilled_from_the_loser() {
    let mut s = quick_session();
    s.generate_teams(&names(16));
    let roster_before = sorted_ids(s.state());
    assert_eq!(s.state().queue.len(), 1);
    assert_eq!(s.state().queue[0].players.len(), 4);

    // Player 7 is locked on team B and must never be taken.
    let team_b = s.state().team_b_roster.clone().unwrap();
    assert!(s.toggle_player_lock(&team_b.id, &team_b.players[0].id));

    win_match(&mut s, TeamId::A);
    let report = s.state().rotation_report.clone().expect("report attached at match end");
    assert_eq!(report.out_team_name, "Team 2");
    assert_eq!(report.in_team_name, "Team 3");
    assert_eq!(report.donor_team_name.as_deref(), Some("Team 2"));
    let stolen: Vec<&str> = report.stolen_players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(stolen, vec!["Player 8", "Player 9"]);
    assert_eq!(
        rotation_notice(&report).as_deref(),
        Some("Team 3 stole Player 8, Player 9 from Team 2")
    );

    assert!(s.rotate_teams());
    let state = s.state();
    assert_eq!(state.team_a_name, "Team 1");
    assert_eq!(state.team_b_name, "Team 3");
    assert_eq!(state.team_b_roster.as_ref().unwrap().players.len(), 6);
    assert_eq!(state.queue.len(), 1);
    assert_eq!(state.queue[0].name, "Team 2");
    assert_eq!(state.queue[0].players.len(), 4);
    assert!(state.queue[0].players[0].is_fixed);
    assert_eq!((state.score_a, state.sets_a, state.current_set), (0, 0, 1));
    assert!(state.rotation_report.is_none());
    assert!(!s.can_undo());

    assert_eq!(sorted_ids(s.state()), roster_before);
}

#[test]
fn second_queued_team_donates_when_present() {
    let mut s = quick_session();
    s.generate_teams(&names(22));
    // Teams of 6, 6, 6, 4. Thin out the next team so it needs players.
    let next = s.state().queue[0].clone();
    let donor = s.state().queue[1].clone();
    let team_a = s.state().team_a_roster.clone().unwrap();
    assert!(s.move_player(&next.players[5].id, &team_a.id));
    let roster_before = sorted_ids(s.state());

    win_match(&mut s, TeamId::B);
    let plan = s.rotation_plan().unwrap();
    assert_eq!(plan.report.out_team_name, "Team 1");
    assert_eq!(plan.report.donor_team_name.as_deref(), Some(donor.name.as_str()));
    assert_eq!(plan.report.stolen_players, vec![donor.players[0].clone()]);

    assert!(s.rotate_teams());
    let state = s.state();
    assert_eq!(state.team_a_name, "Team 2");
    assert_eq!(state.team_b_name, "Team 3");
    let queue: Vec<&str> = state.queue.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(queue, vec!["Team 4", "Team 1"]);
    assert_eq!(state.queue[0].players.len(), 3);
    assert_eq!(sorted_ids(s.state()), roster_before);
}

#[test]
fn undo_out_of_a_finished_match_drops_the_report() {
    let mut s = quick_session();
    s.generate_teams(&names(14));
    win_match(&mut s, TeamId::A);
    assert!(s.state().rotation_report.is_some());

    assert!(s.undo());
    assert!(!s.state().is_match_over);
    assert!(s.state().rotation_report.is_none());

    assert!(s.add_point(TeamId::A));
    assert!(s.state().rotation_report.is_some());
}

#[test]
fn rotation_needs_a_finished_match_and_a_queue() {
    let mut s = quick_session();
    s.generate_teams(&names(12));
    assert!(!s.rotate_teams());
    win_match(&mut s, TeamId::B);
    assert!(s.state().rotation_report.is_none());
    assert!(!s.rotate_teams());
}

#[test]
fn saved_session_resumes_with_report_intact() {
    let mut s = quick_session();
    s.generate_teams(&names(16));
    win_match(&mut s, TeamId::A);
    let raw = record::encode(s.state()).unwrap();

    let mut saved = record::decode(&raw).unwrap();
    saved.rotation_report = None;
    let resumed = quick_session().resume(saved);
    assert_eq!(resumed.state(), s.state());
    assert!(!resumed.can_undo());
}

#[test]
fn report_tracks_roster_edits_after_the_final_point() {
    let mut s = quick_session();
    s.generate_teams(&names(16));
    win_match(&mut s, TeamId::A);
    let report = s.state().rotation_report.clone().unwrap();
    let stolen: Vec<&str> = report.stolen_players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(stolen, vec!["Player 7", "Player 8"]);

    let team_b = s.state().team_b_roster.clone().unwrap();
    assert!(s.toggle_player_lock(&team_b.id, &team_b.players[0].id));
    let report = s.state().rotation_report.clone().unwrap();
    assert_eq!(report, s.rotation_plan().unwrap().report);
    let stolen: Vec<&str> = report.stolen_players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(stolen, vec!["Player 8", "Player 9"]);

    // Undoing the lock brings the original report back.
    assert!(s.undo());
    let stolen: Vec<String> = s.state().rotation_report.as_ref().unwrap().stolen_players.iter().map(|p| p.name.clone()).collect();
    assert_eq!(stolen, vec!["Player 7", "Player 8"]);

    assert!(s.clear_rosters());
    assert!(s.state().rotation_report.is_none());
    assert!(!s.rotate_teams());
}
