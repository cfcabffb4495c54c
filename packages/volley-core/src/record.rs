//! Persisted record codec.
//!
//! The whole `MatchState` is stored as one JSON document under
//! [`STORAGE_KEY`]. A record is only accepted when it parses and carries a
//! `config` object; anything else is reported so the caller can fall back to
//! the initial state.

use serde_json::Value;
use thiserror::Error;

use crate::model::MatchState;

pub const STORAGE_KEY: &str = "volleyscore_pro_state_v1";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("record has no config object")]
    MissingConfig,
    #[error("record does not match the match state layout: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode match state: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn encode(state: &MatchState) -> Result<String, RecordError> {
    serde_json::to_string_pretty(state).map_err(RecordError::Encode)
}

pub fn decode(raw: &str) -> Result<MatchState, RecordError> {
    let value: Value = serde_json::from_str(raw).map_err(RecordError::Syntax)?;
    if !value.get("config").is_some_and(Value::is_object) {
        return Err(RecordError::MissingConfig);
    }
    serde_json::from_value(value).map_err(RecordError::Malformed)
}
