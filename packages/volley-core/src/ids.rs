//! Identifier sources for generated players and teams.

use uuid::Uuid;

/// Hands out identifiers that are unique within a session.
pub trait IdSource: Send + Sync {
    fn player_id(&mut self) -> String;
    fn team_id(&mut self) -> String;
}

/// Random v4 identifiers, used by the running server.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn player_id(&mut self) -> String {
        format!("p-{}", Uuid::new_v4())
    }

    fn team_id(&mut self) -> String {
        format!("team-{}", Uuid::new_v4())
    }
}

/// Deterministic `p-1, p-2, ...` / `team-1, ...` identifiers.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next_player: u64,
    next_team: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn player_id(&mut self) -> String {
        self.next_player += 1;
        format!("p-{}", self.next_player)
    }

    fn team_id(&mut self) -> String {
        self.next_team += 1;
        format!("team-{}", self.next_team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIds;
        assert_ne!(ids.player_id(), ids.player_id());
        assert!(ids.team_id().starts_with("team-"));
    }

    #[test]
    fn sequential_ids_count_independently() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.player_id(), "p-1");
        assert_eq!(ids.player_id(), "p-2");
        assert_eq!(ids.team_id(), "team-1");
    }
}
