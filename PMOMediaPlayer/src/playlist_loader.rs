//! Préchargement en tâche de fond des playlists soumises pendant la lecture.
//!
//! La boucle de contrôle reste libre pendant le préchargement : la playlist
//! courante continue (avance automatique comprise) jusqu'à l'arrivée du
//! résultat sur le canal.

use std::sync::Arc;

use pmocontrol::{ConfigError, SessionConfigManager};
use pmomedia::PlaylistConfig;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Résultat d'une soumission lancée par [`PlaylistLoader::request`]
#[derive(Debug)]
pub struct LoadedPlaylist {
    generation: u64,
    pub origin: String,
    pub result: Result<PlaylistConfig, ConfigError>,
}

pub struct PlaylistLoader {
    manager: Arc<SessionConfigManager>,
    session: String,
    user: String,
    generation: u64,
    results: UnboundedSender<LoadedPlaylist>,
}

impl PlaylistLoader {
    pub fn new(
        manager: Arc<SessionConfigManager>,
        session: impl Into<String>,
        user: impl Into<String>,
    ) -> (Self, UnboundedReceiver<LoadedPlaylist>) {
        let (results, receiver) = mpsc::unbounded_channel();
        let loader = Self {
            manager,
            session: session.into(),
            user: user.into(),
            generation: 0,
            results,
        };
        (loader, receiver)
    }

    /// Soumet `raw_json` sans attendre le préchargement.
    ///
    /// Une nouvelle demande rend obsolètes les précédentes.
    pub fn request(&mut self, origin: impl Into<String>, raw_json: String) {
        self.generation += 1;
        let generation = self.generation;
        let origin = origin.into();
        let manager = Arc::clone(&self.manager);
        let (session, user) = (self.session.clone(), self.user.clone());
        let results = self.results.clone();

        info!(origin = %origin, generation, "⏳ Preloading playlist in background");
        tokio::spawn(async move {
            let result = manager.submit(&raw_json, &session, &user).await;
            let _ = results.send(LoadedPlaylist {
                generation,
                origin,
                result,
            });
        });
    }

    /// Retourne le résultat à appliquer, ou `None` si une demande plus récente
    /// a été faite entre-temps.
    pub fn accept(&self, loaded: LoadedPlaylist) -> Option<Result<PlaylistConfig, ConfigError>> {
        if loaded.generation != self.generation {
            warn!(
                origin = %loaded.origin,
                generation = loaded.generation,
                "Dropping superseded playlist"
            );
            return None;
        }
        Some(loaded.result)
    }
}
