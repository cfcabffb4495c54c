//! # volley-core
//!
//! Scoring state machine and "winner stays on" rotation engine for a
//! volleyball scoreboard.
//!
//! These types are used by:
//! - `backend-rust`: owns a [`MatchSession`], persists it and drives it from
//!   Socket.IO events and the match clock
//! - scoreboard clients: read the camelCase JSON form of [`MatchState`]
//!
//! ## Layout
//! - [`model`]: match state, rules, rosters and derived display values
//! - [`scoring`]: point/set/match transitions as pure functions
//! - [`roster`]: team generation, player moves and rotation planning
//! - [`history`]: bounded undo snapshots
//! - [`session`]: the owned container tying the above together
//! - [`record`]: persisted JSON record
//! - [`summary`]: end-of-match text

pub mod history;
pub mod ids;
pub mod model;
pub mod record;
pub mod roster;
pub mod scoring;
pub mod session;
pub mod summary;

pub use ids::{IdSource, SequentialIds, UuidIds};
pub use model::{
    ConfigError, DeuceType, MatchConfig, MatchState, Player, PointStatus, RotationDetail,
    SetRecord, Team, TeamId,
};
pub use record::{RecordError, STORAGE_KEY};
pub use roster::RotationPlan;
pub use scoring::TeamNames;
pub use session::MatchSession;
pub use summary::{format_duration, rotation_notice, MatchSummary};
