//! Match clock. Advances `matchDurationSeconds` once per second while the
//! session reports the timer as running.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::handlers::{AppContext, Writeback};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Runs until the arming channel closes. While disarmed the task only waits on
/// `armed`; every re-arm restarts the period so the first tick lands a full
/// second later.
pub async fn run_match_clock(ctx: AppContext, mut armed: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if !*armed.borrow_and_update() {
            if armed.changed().await.is_err() {
                return;
            }
            continue;
        }

        debug!("Match clock armed");
        interval.reset();
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    ctx.apply(Writeback::Save, |session| session.tick()).await;
                }
                changed = armed.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*armed.borrow_and_update() {
                        debug!("Match clock disarmed");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socketioxide::SocketIo;
    use volley_core::{MatchSession, TeamId};

    use crate::persistence::{PersistHandle, Store};

    /// Let the clock task run until it parks again.
    async fn let_clock_run() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    async fn elapsed(ctx: &AppContext) -> u64 {
        ctx.session.read().await.state().match_duration_seconds
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_the_timer_runs() {
        let (_layer, io) = SocketIo::new_layer();
        io.ns("/", || {});
        let dir = std::env::temp_dir().join(format!("volleyscore-clock-{}", uuid::Uuid::new_v4()));
        let (persist, _writer) = PersistHandle::spawn(Store::new(&dir));
        let (ctx, armed) = AppContext::new(MatchSession::default(), io, persist);
        assert!(!*armed.borrow());
        tokio::spawn(run_match_clock(ctx.clone(), armed));
        let_clock_run().await;

        tokio::time::advance(Duration::from_millis(1500)).await;
        let_clock_run().await;
        assert_eq!(elapsed(&ctx).await, 0);

        assert!(ctx.apply(Writeback::Save, |s| s.add_point(TeamId::A)).await);
        assert!(*ctx.clock.borrow());
        let_clock_run().await;

        // Re-arming restarts the period: nothing lands before a full second.
        tokio::time::advance(Duration::from_millis(999)).await;
        let_clock_run().await;
        assert_eq!(elapsed(&ctx).await, 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        let_clock_run().await;
        assert_eq!(elapsed(&ctx).await, 1);

        for _ in 0..2 {
            tokio::time::advance(TICK_PERIOD).await;
            let_clock_run().await;
        }
        assert_eq!(elapsed(&ctx).await, 3);
        // Ticks never become undo steps.
        assert_eq!(ctx.session.read().await.undo_depth(), 2);
    }
}
