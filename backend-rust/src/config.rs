use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use volley_core::{DeuceType, MatchConfig};

pub const DEFAULT_PORT: u16 = 3001;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone)]
#[command(name = "volleyscore-backend", about = "VolleyScore Pro scoreboard server")]
pub struct Args {
    /// Config file path
    #[arg(short, long, default_value = "volleyscore.toml")]
    pub config: PathBuf,
    /// Listen port (overrides PORT and the config file)
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory holding the saved match record
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

// ── File layout ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    server: ServerSection,
    storage: StorageSection,
    #[serde(rename = "match")]
    rules: RulesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerSection {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StorageSection {
    data_dir: Option<PathBuf>,
}

/// `[match]`: rules a fresh or fully reset session starts with. Missing keys
/// keep the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RulesSection {
    max_sets: Option<u32>,
    points_per_set: Option<u32>,
    tie_break_points: Option<u32>,
    has_tie_break: Option<bool>,
    deuce_type: Option<DeuceType>,
}

impl RulesSection {
    fn resolve(&self) -> MatchConfig {
        let base = MatchConfig::default();
        MatchConfig {
            max_sets: self.max_sets.unwrap_or(base.max_sets),
            points_per_set: self.points_per_set.unwrap_or(base.points_per_set),
            tie_break_points: self.tie_break_points.unwrap_or(base.tie_break_points),
            has_tie_break: self.has_tie_break.unwrap_or(base.has_tie_break),
            deuce_type: self.deuce_type.unwrap_or(base.deuce_type),
        }
    }
}

// ── Resolved settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    pub match_config: MatchConfig,
}

impl Settings {
    /// Read the config file named by `args` and layer the CLI and `PORT` on top.
    pub async fn load(args: &Args) -> Result<Self> {
        let file = read_file(&args.config).await?;
        let env_port = std::env::var("PORT").ok();
        Self::resolve(file, args, env_port.as_deref())
    }

    fn resolve(file: FileConfig, args: &Args, env_port: Option<&str>) -> Result<Self> {
        let env_port = env_port
            .map(|raw| raw.parse::<u16>().with_context(|| format!("PORT is not a valid port: {raw:?}")))
            .transpose()?;

        let port = args
            .port
            .or(env_port)
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let data_dir = args
            .data_dir
            .clone()
            .or(file.storage.data_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let match_config = file.rules.resolve();
        match_config
            .validate()
            .context("invalid [match] section")?;

        Ok(Self {
            port,
            data_dir,
            match_config,
        })
    }
}

async fn read_file(path: &Path) -> Result<FileConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No {} found, using built-in defaults", path.display());
            Ok(FileConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: PathBuf) -> Args {
        Args {
            config,
            port: None,
            data_dir: None,
        }
    }

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("volleyscore-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let dir = scratch_dir();
        let file = read_file(&dir.join("absent.toml")).await.unwrap();
        let settings = Settings::resolve(file, &args(dir.join("absent.toml")), None).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.data_dir, PathBuf::from("."));
        assert_eq!(settings.match_config, MatchConfig::default());
    }

    #[tokio::test]
    async fn file_values_are_layered_under_cli_and_env() {
        let dir = scratch_dir();
        let path = dir.join("volleyscore.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 4000

[storage]
data_dir = "/var/lib/volleyscore"

[match]
max_sets = 3
deuce_type = "sudden_death_3pt"
"#,
        )
        .await
        .unwrap();

        let file = read_file(&path).await.unwrap();
        let settings = Settings::resolve(file, &args(path.clone()), None).unwrap();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/volleyscore"));
        assert_eq!(settings.match_config.max_sets, 3);
        assert_eq!(settings.match_config.points_per_set, 25);
        assert_eq!(settings.match_config.deuce_type, DeuceType::SuddenDeath3pt);

        let file = read_file(&path).await.unwrap();
        let settings = Settings::resolve(file, &args(path.clone()), Some("5000")).unwrap();
        assert_eq!(settings.port, 5000);

        let mut cli = args(path.clone());
        cli.port = Some(6000);
        cli.data_dir = Some(dir.clone());
        let file = read_file(&path).await.unwrap();
        let settings = Settings::resolve(file, &cli, Some("5000")).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.data_dir, dir);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = scratch_dir();
        let path = dir.join("broken.toml");
        tokio::fs::write(&path, "[server]\nport = \"not a number\"\n").await.unwrap();
        assert!(read_file(&path).await.is_err());

        tokio::fs::write(&path, "[match]\nmax_sets = 4\n").await.unwrap();
        let file = read_file(&path).await.unwrap();
        assert!(Settings::resolve(file, &args(path), None).is_err());
    }

    #[test]
    fn bad_port_env_is_rejected() {
        let err = Settings::resolve(FileConfig::default(), &args(PathBuf::from("x.toml")), Some("abc"));
        assert!(err.is_err());
    }
}
