//! PlaylistNavigator : position courante dans une playlist préchargée

use pmomedia::{PlaylistConfig, PreparedMedia};
use tracing::debug;

/// Navigation dans une playlist (courant / suivant / précédent)
///
/// - `playlist == None` : aucune playlist configurée
/// - playlist vide : `current_index` vaut toujours `None`
/// - sinon `current_index` est toujours dans `[0, len)`
///
/// Sans boucle, `next()` en fin de liste et `previous()` en début de liste
/// renvoient `None` sans déplacer la position.
///
/// Aucune synchronisation interne : le navigateur appartient à la boucle de
/// contrôle de la session.
#[derive(Debug, Clone, Default)]
pub struct PlaylistNavigator {
    playlist: Option<PlaylistConfig>,
    current_index: Option<usize>,
}

impl PlaylistNavigator {
    /// Crée un navigateur sans playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la playlist et revient au début
    ///
    /// Seul point de modification de la liste des médias.
    pub fn set_playlist(&mut self, playlist: PlaylistConfig) {
        self.current_index = if playlist.is_empty() { None } else { Some(0) };
        debug!(
            items = playlist.len(),
            looping = playlist.is_looping(),
            "Playlist replaced"
        );
        self.playlist = Some(playlist);
    }

    /// Vrai dès qu'une playlist (même vide) a été fournie
    pub fn is_configured(&self) -> bool {
        self.playlist.is_some()
    }

    pub fn playlist(&self) -> Option<&PlaylistConfig> {
        self.playlist.as_ref()
    }

    pub fn is_looping(&self) -> bool {
        self.playlist
            .as_ref()
            .map(PlaylistConfig::is_looping)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.playlist.as_ref().map(PlaylistConfig::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Média à la position courante
    pub fn current(&self) -> Option<&PreparedMedia> {
        let index = self.current_index?;
        self.playlist.as_ref()?.get(index)
    }

    /// Avance d'une position
    pub fn next(&mut self) -> Option<&PreparedMedia> {
        let len = self.len();
        let index = self.current_index?;

        let target = if self.is_looping() {
            (index + 1) % len
        } else if index + 1 >= len {
            debug!(index, "End of playlist reached");
            return None;
        } else {
            index + 1
        };

        self.current_index = Some(target);
        self.current()
    }

    /// Recule d'une position
    pub fn previous(&mut self) -> Option<&PreparedMedia> {
        let len = self.len();
        let index = self.current_index?;

        let target = if self.is_looping() {
            (index + len - 1) % len
        } else if index == 0 {
            debug!("Start of playlist reached");
            return None;
        } else {
            index - 1
        };

        self.current_index = Some(target);
        self.current()
    }
}
