//! Session configuration manager.
//!
//! Validates, persists and preloads the playlist configuration a user submits
//! for a session, and reloads the stored one when the session resumes. The
//! returned [`PlaylistConfig`] is not activated here: the caller hands it to
//! its [`MediaPlayer`](crate::MediaPlayer) once it is ready, so a rejected
//! configuration never disturbs the one already playing.

use std::sync::Arc;

use pmomedia::{ParsedConfig, PlaylistConfig};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::preloader::AssetPreloader;
use crate::store::ConfigStore;

pub struct SessionConfigManager {
    store: Arc<dyn ConfigStore>,
    preloader: AssetPreloader,
}

impl SessionConfigManager {
    pub fn new(store: Arc<dyn ConfigStore>, preloader: AssetPreloader) -> Self {
        Self { store, preloader }
    }

    pub fn preloader(&self) -> &AssetPreloader {
        &self.preloader
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// Validates `raw_json`, saves it for `(session_id, user_id)` and preloads
    /// every asset it references.
    ///
    /// A store failure does not prevent the preload: the ready playlist comes
    /// back inside [`ConfigError::NotPersisted`].
    pub async fn submit(
        &self,
        raw_json: &str,
        session_id: &str,
        user_id: &str,
    ) -> Result<PlaylistConfig, ConfigError> {
        let parsed = pmomedia::validate(raw_json).map_err(|e| {
            warn!(session = session_id, user = user_id, "Rejected media configuration: {}", e);
            e
        })?;
        info!(
            session = session_id,
            user = user_id,
            items = parsed.items.len(),
            looping = parsed.loop_media_list,
            "Media configuration accepted"
        );

        let stored = self.store.put(session_id, user_id, raw_json).await;
        if let Err(e) = &stored {
            warn!(session = session_id, user = user_id, "Failed to save media configuration: {}", e);
        }

        let playlist = self.prepare(parsed).await?;

        match stored {
            Ok(()) => Ok(playlist),
            Err(source) => Err(ConfigError::NotPersisted {
                source,
                playlist: Box::new(playlist),
            }),
        }
    }

    /// Reloads the configuration saved for `(session_id, user_id)`.
    ///
    /// The stored blob is validated again before preloading.
    pub async fn load_persisted(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<PlaylistConfig, ConfigError> {
        let Some(raw_json) = self.store.get(session_id, user_id).await? else {
            debug!(session = session_id, user = user_id, "No stored media configuration");
            return Err(ConfigError::NoStoredConfig {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            });
        };

        let parsed = pmomedia::validate(&raw_json).map_err(|e| {
            warn!(session = session_id, user = user_id, "Stored media configuration is invalid: {}", e);
            e
        })?;

        let playlist = self.prepare(parsed).await?;
        info!(
            session = session_id,
            user = user_id,
            items = playlist.len(),
            "Stored media configuration restored"
        );
        Ok(playlist)
    }

    /// Restores the configuration of the first user (sorted by id) that
    /// stored one in `session_id`. `Ok(None)` when the session has none.
    pub async fn resume_session(
        &self,
        session_id: &str,
    ) -> Result<Option<(String, PlaylistConfig)>, ConfigError> {
        let users = self.store.users(session_id).await?;
        let Some(user_id) = users.into_iter().next() else {
            debug!(session = session_id, "Nothing to resume");
            return Ok(None);
        };

        let playlist = self.load_persisted(session_id, &user_id).await?;
        Ok(Some((user_id, playlist)))
    }

    async fn prepare(&self, parsed: ParsedConfig) -> Result<PlaylistConfig, ConfigError> {
        let ParsedConfig {
            loop_media_list,
            items,
        } = parsed;
        let prepared = self.preloader.preload(items).await?;
        Ok(PlaylistConfig::new(loop_media_list, prepared))
    }
}
