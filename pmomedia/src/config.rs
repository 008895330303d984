//! Validation du JSON de configuration et types de playlist
//!
//! Forme attendue :
//!
//! ```json
//! {
//!   "loopMediaList": false,
//!   "mediaList": [
//!     { "imageUrl": "a.png", "skipAfter": 5 },
//!     { "videoUrl": "b.mp4", "volume": 0.8, "startTime": 12, "loop": true }
//!   ]
//! }
//! ```

use crate::error::{EntryError, Result, ValidationError};
use crate::item::{
    bounded_duration, ImageMedia, MediaItem, PreparedMedia, VideoMedia, VideoOptions,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

const LOOP_MEDIA_LIST: &str = "loopMediaList";
const MEDIA_LIST: &str = "mediaList";

/// Configuration validée, dont les ressources ne sont pas encore chargées
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    pub loop_media_list: bool,
    pub items: Vec<MediaItem>,
}

/// Playlist prête à être lue : chaque entrée porte son `AssetHandle`
///
/// La liste est partagée (`Arc`) et jamais modifiée ; remplacer la playlist
/// revient à construire une nouvelle `PlaylistConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistConfig {
    loop_media_list: bool,
    items: Arc<[PreparedMedia]>,
}

impl PlaylistConfig {
    pub fn new(loop_media_list: bool, items: Vec<PreparedMedia>) -> Self {
        Self {
            loop_media_list,
            items: items.into(),
        }
    }

    pub fn is_looping(&self) -> bool {
        self.loop_media_list
    }

    pub fn items(&self) -> &[PreparedMedia] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&PreparedMedia> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Valide un JSON non fiable et construit la liste de médias.
///
/// La première entrée invalide fait échouer toute la validation : aucune
/// playlist partielle n'est jamais produite. Les clés inconnues sont ignorées.
pub fn validate(raw_json: &str) -> Result<ParsedConfig> {
    let root: Value = serde_json::from_str(raw_json)?;
    let Value::Object(root) = root else {
        return Err(ValidationError::NotAnObject);
    };

    let loop_media_list = match root.get(LOOP_MEDIA_LIST) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: LOOP_MEDIA_LIST,
                expected: "boolean",
            });
        }
    };

    let entries = match root.get(MEDIA_LIST) {
        None => return Err(ValidationError::MissingField(MEDIA_LIST)),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: MEDIA_LIST,
                expected: "array",
            });
        }
    };

    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(entry).map_err(|e| ValidationError::entry(index, e)))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        items = items.len(),
        loop_media_list, "Media configuration validated"
    );

    Ok(ParsedConfig {
        loop_media_list,
        items,
    })
}

fn parse_entry(entry: &Value) -> std::result::Result<MediaItem, EntryError> {
    let Value::Object(fields) = entry else {
        return Err(EntryError::NotAnObject);
    };

    let video_url = optional_str(fields, "videoUrl")?;
    let image_url = optional_str(fields, "imageUrl")?;
    let skip_after = optional_f64(fields, "skipAfter")?.unwrap_or(0.0);

    match (video_url, image_url) {
        (Some(_), Some(_)) => Err(EntryError::AmbiguousMediaUrl),
        (Some(url), None) => {
            let defaults = VideoOptions::default();
            let options = VideoOptions {
                volume: match optional_f64(fields, "volume")? {
                    Some(volume) => ranged_f32("volume", volume, 0.0, 1.0)?,
                    None => defaults.volume,
                },
                start_time: match optional_f64(fields, "startTime")? {
                    Some(secs) => bounded_duration("startTime", secs)?,
                    None => defaults.start_time,
                },
                looping: optional_bool(fields, "loop")?.unwrap_or(defaults.looping),
                rolloff_start_distance: match optional_f64(fields, "rolloffStartDistance")? {
                    Some(distance) => {
                        ranged_f32("rolloffStartDistance", distance, 0.0, f64::from(f32::MAX))?
                    }
                    None => defaults.rolloff_start_distance,
                },
            };
            Ok(VideoMedia::new(url, skip_after, options)?.into())
        }
        (None, Some(url)) => Ok(ImageMedia::new(url, skip_after)?.into()),
        (None, None) => Err(EntryError::MissingMediaUrl),
    }
}

fn optional_str<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Option<&'a str>, EntryError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(EntryError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn optional_f64(
    fields: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Option<f64>, EntryError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(EntryError::WrongType {
            field,
            expected: "number",
        }),
    }
}

fn optional_bool(
    fields: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Option<bool>, EntryError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(EntryError::WrongType {
            field,
            expected: "boolean",
        }),
    }
}

/// Vérifie la plage sur la valeur JSON avant la conversion en `f32`
fn ranged_f32(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> std::result::Result<f32, EntryError> {
    if value < min {
        return Err(EntryError::BelowMinimum { field, value, min });
    }
    if value > max {
        return Err(EntryError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value as f32)
}
