use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use socketioxide::extract::{SocketRef, TryData};
use socketioxide::SocketIo;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};
use volley_core::{MatchSession, TeamNames};

use crate::persistence::PersistHandle;
use crate::state::{
    GeneratePayload, MatchView, MovePlayerPayload, PlayerLockPayload, PlayerPayload,
    ResetPayload, RostersPayload, SettingsPayload, TeamNamePayload, TeamPayload,
};

// ─── Shared State Types ───────────────────────────────────────────────────────

pub type SharedSession = Arc<RwLock<MatchSession>>;

/// How a settled change reaches disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writeback {
    Save,
    /// Delete the saved record instead of overwriting it.
    Clear,
}

/// Everything a handler or the clock needs to change the match and fan the
/// result out.
#[derive(Clone)]
pub struct AppContext {
    pub session: SharedSession,
    pub io: SocketIo,
    pub persist: PersistHandle,
    /// Armed while the match clock should run.
    pub clock: Arc<watch::Sender<bool>>,
}

impl AppContext {
    /// Wrap `session` for sharing. The returned receiver drives the match
    /// clock and starts armed if the session's timer is already running.
    pub fn new(session: MatchSession, io: SocketIo, persist: PersistHandle) -> (Self, watch::Receiver<bool>) {
        let (clock, armed) = watch::channel(session.state().is_timer_running);
        let ctx = Self {
            session: Arc::new(RwLock::new(session)),
            io,
            persist,
            clock: Arc::new(clock),
        };
        (ctx, armed)
    }

    pub async fn view(&self) -> MatchView {
        MatchView::from_session(&*self.session.read().await)
    }

    /// Run `action` against the session. If it changed anything, persist,
    /// re-arm the clock and broadcast the new view to every client.
    ///
    /// The write guard is held until the broadcast is queued, so clients and
    /// the saved record see changes in commit order.
    pub async fn apply<F>(&self, writeback: Writeback, action: F) -> bool
    where
        F: FnOnce(&mut MatchSession) -> bool,
    {
        let mut session = self.session.write().await;
        if !action(&mut session) {
            return false;
        }
        let state = session.state();
        match writeback {
            Writeback::Save => self.persist.save(state.clone()),
            Writeback::Clear => self.persist.clear(),
        }
        let running = state.is_timer_running;
        self.clock.send_if_modified(|armed| {
            let changed = *armed != running;
            *armed = running;
            changed
        });
        let view = MatchView::from_session(&session);
        let _ = self.io.emit("state-update", &view);
        true
    }
}

// ─── Event Wiring ─────────────────────────────────────────────────────────────

/// Register a session command. The payload is decoded into `T` first; a
/// payload that does not decode is logged and dropped.
fn on_command<T, F>(socket: &SocketRef, ctx: &AppContext, event: &'static str, writeback: Writeback, action: F)
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(&mut MatchSession, T) -> bool + Send + Sync + 'static,
{
    let ctx = ctx.clone();
    let action = Arc::new(action);
    socket.on(event, move |s: SocketRef, TryData::<Value>(data)| {
        let ctx = ctx.clone();
        let action = action.clone();
        async move {
            let data = data.unwrap_or(Value::Null);
            let payload = match serde_json::from_value::<T>(data) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Client {}: ignoring {event} with bad payload: {e}", s.id);
                    return;
                }
            };
            ctx.apply(writeback, |session| action(session, payload)).await;
        }
    });
}

// ─── Main Connection Handler ──────────────────────────────────────────────────

pub async fn on_connect(socket: SocketRef, ctx: AppContext) {
    let socket_id = socket.id.to_string();
    info!("Client connected: {socket_id}");

    socket.on_disconnect(move |_: SocketRef| async move {
        info!("Client disconnected: {socket_id}");
    });

    // ── register ──────────────────────────────────────────────────────────────
    {
        let ctx = ctx.clone();
        socket.on("register", move |s: SocketRef| {
            let ctx = ctx.clone();
            async move {
                let view = ctx.view().await;
                let _ = s.emit("init-state", &view);
            }
        });
    }

    // ── scoring ───────────────────────────────────────────────────────────────
    on_command(&socket, &ctx, "add-point", Writeback::Save, |session, p: TeamPayload| {
        session.add_point(p.team)
    });
    on_command(&socket, &ctx, "subtract-point", Writeback::Save, |session, p: TeamPayload| {
        session.subtract_point(p.team)
    });
    on_command(&socket, &ctx, "use-timeout", Writeback::Save, |session, p: TeamPayload| {
        session.use_timeout(p.team)
    });
    on_command(&socket, &ctx, "toggle-service", Writeback::Save, |session, _: IgnoredAny| {
        session.toggle_service()
    });
    on_command(&socket, &ctx, "toggle-sides", Writeback::Save, |session, _: IgnoredAny| {
        session.toggle_sides()
    });
    on_command(&socket, &ctx, "undo", Writeback::Save, |session, _: IgnoredAny| {
        session.undo()
    });

    // ── settings & resets ─────────────────────────────────────────────────────
    on_command(&socket, &ctx, "reset-match", Writeback::Save, |session, p: Option<ResetPayload>| {
        let p = p.unwrap_or_default();
        if let Some(Err(e)) = p.config.as_ref().map(|c| c.validate()) {
            warn!("Rejected reset-match config: {e}");
            return false;
        }
        session.reset_match(p.config, p.names.as_ref())
    });
    on_command(&socket, &ctx, "apply-settings", Writeback::Save, |session, p: SettingsPayload| {
        if let Err(e) = p.config.validate() {
            warn!("Rejected settings: {e}");
            return false;
        }
        info!("Applying settings: {:?}", p.config);
        session.reset_match(Some(p.config), p.names.as_ref())
    });
    on_command(&socket, &ctx, "set-team-names", Writeback::Save, |session, names: TeamNames| {
        session.set_team_names(&names)
    });
    on_command(&socket, &ctx, "full-reset", Writeback::Clear, |session, _: IgnoredAny| {
        session.full_reset()
    });

    // ── rosters ───────────────────────────────────────────────────────────────
    on_command(&socket, &ctx, "generate-teams", Writeback::Save, |session, p: GeneratePayload| {
        session.generate_teams(&p.names)
    });
    on_command(&socket, &ctx, "update-rosters", Writeback::Save, |session, p: RostersPayload| {
        session.update_rosters(p.team_a, p.team_b, p.queue)
    });
    on_command(&socket, &ctx, "update-team-name", Writeback::Save, |session, p: TeamNamePayload| {
        session.update_team_name(&p.team_id, &p.name)
    });
    on_command(&socket, &ctx, "remove-player", Writeback::Save, |session, p: PlayerPayload| {
        session.remove_player(&p.player_id)
    });
    on_command(&socket, &ctx, "move-player", Writeback::Save, |session, p: MovePlayerPayload| {
        session.move_player(&p.player_id, &p.target_team_id)
    });
    on_command(&socket, &ctx, "toggle-player-lock", Writeback::Save, |session, p: PlayerLockPayload| {
        session.toggle_player_lock(&p.team_id, &p.player_id)
    });
    on_command(&socket, &ctx, "clear-rosters", Writeback::Save, |session, _: IgnoredAny| {
        session.clear_rosters()
    });
    on_command(&socket, &ctx, "rotate-teams", Writeback::Save, |session, _: IgnoredAny| {
        session.rotate_teams()
    });
}
