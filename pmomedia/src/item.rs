//! MediaItem : description immuable d'une entrée de playlist

use crate::error::EntryError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Volume par défaut d'une vidéo
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Distance (en mètres) à partir de laquelle le son d'une vidéo s'atténue
pub const DEFAULT_ROLLOFF_START_DISTANCE: f32 = 1.0;

/// Durée maximale (en secondes) de `skipAfter` et `startTime` : 24 heures
pub const MAX_DURATION_SECS: f64 = 86_400.0;

/// Type de média
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paramètres de lecture propres aux vidéos, transmis tels quels au sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOptions {
    /// Volume dans [0, 1]
    pub volume: f32,
    /// Position de départ dans la vidéo
    pub start_time: Duration,
    /// Relance la vidéo à la fin
    pub looping: bool,
    pub rolloff_start_distance: f32,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            start_time: Duration::ZERO,
            looping: false,
            rolloff_start_distance: DEFAULT_ROLLOFF_START_DISTANCE,
        }
    }
}

impl VideoOptions {
    fn check(&self) -> Result<(), EntryError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(EntryError::OutOfRange {
                field: "volume",
                value: f64::from(self.volume),
                min: 0.0,
                max: 1.0,
            });
        }
        if self.start_time.as_secs_f64() > MAX_DURATION_SECS {
            return Err(EntryError::OutOfRange {
                field: "startTime",
                value: self.start_time.as_secs_f64(),
                min: 0.0,
                max: MAX_DURATION_SECS,
            });
        }
        if !self.rolloff_start_distance.is_finite() || self.rolloff_start_distance < 0.0 {
            return Err(EntryError::BelowMinimum {
                field: "rolloffStartDistance",
                value: f64::from(self.rolloff_start_distance),
                min: 0.0,
            });
        }
        Ok(())
    }
}

/// Une vidéo de la playlist
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMedia {
    source_url: String,
    skip_after: Option<Duration>,
    options: VideoOptions,
}

impl VideoMedia {
    /// Construit une vidéo en vérifiant ses invariants.
    ///
    /// `skip_after_secs == 0` signifie « jamais d'avance automatique ».
    pub fn new(
        source_url: impl Into<String>,
        skip_after_secs: f64,
        options: VideoOptions,
    ) -> Result<Self, EntryError> {
        let source_url = checked_url("videoUrl", source_url.into())?;
        let skip_after = checked_skip_after(skip_after_secs)?;
        options.check()?;
        Ok(Self {
            source_url,
            skip_after,
            options,
        })
    }

    pub fn options(&self) -> &VideoOptions {
        &self.options
    }
}

/// Une image de la playlist
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMedia {
    source_url: String,
    skip_after: Option<Duration>,
}

impl ImageMedia {
    pub fn new(source_url: impl Into<String>, skip_after_secs: f64) -> Result<Self, EntryError> {
        Ok(Self {
            source_url: checked_url("imageUrl", source_url.into())?,
            skip_after: checked_skip_after(skip_after_secs)?,
        })
    }
}

/// Une entrée de playlist : vidéo ou image
///
/// Les champs ne sont accessibles qu'en lecture ; une playlist est toujours
/// remplacée en bloc, jamais modifiée entrée par entrée.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaItem {
    Video(VideoMedia),
    Image(ImageMedia),
}

impl MediaItem {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaItem::Video(_) => MediaKind::Video,
            MediaItem::Image(_) => MediaKind::Image,
        }
    }

    /// URL de la ressource à précharger
    pub fn source_url(&self) -> &str {
        match self {
            MediaItem::Video(v) => &v.source_url,
            MediaItem::Image(i) => &i.source_url,
        }
    }

    /// Délai avant passage automatique à l'entrée suivante (`None` = jamais)
    pub fn skip_after(&self) -> Option<Duration> {
        match self {
            MediaItem::Video(v) => v.skip_after,
            MediaItem::Image(i) => i.skip_after,
        }
    }

    /// Paramètres vidéo, absents pour une image
    pub fn video_options(&self) -> Option<&VideoOptions> {
        match self {
            MediaItem::Video(v) => Some(&v.options),
            MediaItem::Image(_) => None,
        }
    }
}

impl From<VideoMedia> for MediaItem {
    fn from(video: VideoMedia) -> Self {
        MediaItem::Video(video)
    }
}

impl From<ImageMedia> for MediaItem {
    fn from(image: ImageMedia) -> Self {
        MediaItem::Image(image)
    }
}

/// Référence opaque vers une ressource chargée par l'Asset Loader
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    id: String,
}

impl AssetHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Un média dont la ressource a été préchargée
///
/// Le handle est attaché une seule fois, à la construction : il n'existe
/// pas de setter.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMedia {
    item: MediaItem,
    asset: AssetHandle,
}

impl PreparedMedia {
    pub fn new(item: MediaItem, asset: AssetHandle) -> Self {
        Self { item, asset }
    }

    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    pub fn into_parts(self) -> (MediaItem, AssetHandle) {
        (self.item, self.asset)
    }
}

fn checked_url(field: &'static str, url: String) -> Result<String, EntryError> {
    if url.trim().is_empty() {
        return Err(EntryError::EmptyUrl(field));
    }
    Ok(url)
}

fn checked_skip_after(secs: f64) -> Result<Option<Duration>, EntryError> {
    let delay = bounded_duration("skipAfter", secs)?;
    Ok((!delay.is_zero()).then_some(delay))
}

/// Convertit des secondes en `Duration` dans `[0, MAX_DURATION_SECS]`
pub(crate) fn bounded_duration(field: &'static str, secs: f64) -> Result<Duration, EntryError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(EntryError::BelowMinimum {
            field,
            value: secs,
            min: 0.0,
        });
    }
    let out_of_range = || EntryError::OutOfRange {
        field,
        value: secs,
        min: 0.0,
        max: MAX_DURATION_SECS,
    };
    if secs > MAX_DURATION_SECS {
        return Err(out_of_range());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| out_of_range())
}
