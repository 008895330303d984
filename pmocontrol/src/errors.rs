use std::path::PathBuf;
use std::time::Duration;

use pmomedia::{PlaylistConfig, ValidationError};
use thiserror::Error;

/// An asset could not be fetched or decoded by the Asset Loader.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Failed to load asset {url}: {reason}")]
    Asset { url: String, reason: String },
    #[error("Asset preload timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    pub fn asset(url: &str, reason: impl ToString) -> Self {
        LoadError::Asset {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// The Config Store could not read or write a record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid config store key {0:?}")]
    InvalidKey(String),
    #[error("Config store I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors returned by the session configuration manager.
///
/// None of them is fatal: the playlist that was active before the call keeps
/// playing untouched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid media configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error("Media configuration rejected: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The configuration is valid and fully preloaded but could not be saved;
    /// it can still be activated, only resume-on-reconnect is lost.
    #[error("Media configuration accepted but not saved: {source}")]
    NotPersisted {
        #[source]
        source: StoreError,
        playlist: Box<PlaylistConfig>,
    },
    #[error("No stored media configuration for session {session_id}, user {user_id}")]
    NoStoredConfig { session_id: String, user_id: String },
}

impl ConfigError {
    /// Recovers the usable playlist carried by a `NotPersisted` error.
    pub fn into_playlist(self) -> Option<PlaylistConfig> {
        match self {
            ConfigError::NotPersisted { playlist, .. } => Some(*playlist),
            _ => None,
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(self, ConfigError::Validation(_))
    }
}
