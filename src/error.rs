use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockError {
    #[error("preset not found: {name}.json")]
    NotFound { name: String },

    #[error("failed to decode preset {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("launchApp item {item:?} has no bundleID")]
    MissingBundleId { item: String },

    #[error("{kind} item {item:?} has no actionValue")]
    MissingPayload { kind: String, item: String },

    #[error("failed to launch {0}")]
    LaunchFailure(String),

    #[error("failed to spawn {command:?}: {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script error: {0}")]
    ScriptError(String),

    #[error("failed to watch {path:?}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl DockError {
    // Whether the error is worth a user-visible alert on top of the log line.
    pub fn is_alertable(&self) -> bool {
        matches!(
            self,
            Self::UnknownAction(_) | Self::SpawnFailure { .. } | Self::ScriptError(_)
        )
    }
}
