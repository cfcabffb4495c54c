use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use volley_core::{record, MatchState, STORAGE_KEY};

/// Single-file store for the live match record.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved match. `None` if the record is missing or unusable.
    pub async fn load_state(&self) -> Option<MatchState> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No {} found, starting a fresh match", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read {}: {e}, starting a fresh match", self.path.display());
                return None;
            }
        };

        match record::decode(&raw) {
            Ok(state) => {
                info!(
                    "Loaded match from disk ({} vs {}, set {}, sets {}-{})",
                    state.team_a_name, state.team_b_name, state.current_set, state.sets_a, state.sets_b
                );
                Some(state)
            }
            Err(e) => {
                warn!("Discarding {}: {e}", self.path.display());
                None
            }
        }
    }

    pub async fn save_state(&self, state: &MatchState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = record::encode(state)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub async fn clear_state(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}

// ─── Background Writer ────────────────────────────────────────────────────────

#[derive(Debug)]
enum Command {
    Save(Box<MatchState>),
    Clear,
}

/// Fire-and-forget handle to the writer task. Writes are applied in the order
/// they are sent.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistHandle {
    /// Start the writer. The task exits once every handle is dropped.
    pub fn spawn(store: Store) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(store, rx));
        (Self { tx }, task)
    }

    pub fn save(&self, state: MatchState) {
        self.send(Command::Save(Box::new(state)));
    }

    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            error!("Persistence writer is gone, change not saved");
        }
    }
}

async fn run_writer(store: Store, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        let result = match command {
            Command::Save(state) => store.save_state(&state).await,
            Command::Clear => {
                info!("Clearing saved match {}", store.path().display());
                store.clear_state().await
            }
        };
        if let Err(e) = result {
            warn!("Persistence failed: {e:#}");
        }
    }
}
