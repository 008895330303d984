// pmocontrol/src/capabilities.rs
use async_trait::async_trait;
use pmomedia::{AssetHandle, MediaItem, MediaKind, VideoOptions};

use crate::errors::LoadError;

/// Fetches and decodes the asset behind a media URL.
///
/// Retries, if any, are the loader's business: a returned error is final for
/// the current preload batch.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Loads `url` as a video stream or as a texture depending on `kind`.
    async fn load(&self, kind: MediaKind, url: &str) -> Result<AssetHandle, LoadError>;
}

/// Type-specific parameters handed to the sink when an item starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StartPayload {
    Video(VideoOptions),
    /// Presentation of images is left to the sink.
    Image,
}

impl StartPayload {
    pub fn for_item(item: &MediaItem) -> Self {
        match item {
            MediaItem::Video(video) => StartPayload::Video(*video.options()),
            MediaItem::Image(_) => StartPayload::Image,
        }
    }
}

/// Abstraction du moteur de rendu qui présente les médias.
///
/// Commandes "fire-and-forget" : le player n'attend aucune réponse.
pub trait PlaybackSink: Send + Sync {
    /// Démarre la présentation d'une ressource préchargée.
    fn start(&self, asset: &AssetHandle, payload: StartPayload);

    /// Met la lecture en pause.
    fn pause(&self);

    /// Reprend la lecture.
    fn resume(&self);

    /// Arrête la lecture.
    fn stop(&self);
}
