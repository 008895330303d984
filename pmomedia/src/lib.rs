//! # pmomedia - Modèle des médias d'une playlist PMOMedia
//!
//! Cette crate fournit :
//! - `MediaItem` : une entrée vidéo ou image, immuable après construction
//! - `AssetHandle` / `PreparedMedia` : une entrée dont la ressource est chargée
//! - `validate()` : validation d'un JSON de configuration non fiable
//! - `PlaylistConfig` : la playlist complète, prête à être lue
//!
//! # Exemple
//!
//! ```
//! use pmomedia::{validate, MediaKind};
//!
//! let parsed = validate(r#"{ "mediaList": [{ "imageUrl": "a.png", "skipAfter": 5 }] }"#)?;
//! assert_eq!(parsed.items[0].kind(), MediaKind::Image);
//! # Ok::<(), pmomedia::ValidationError>(())
//! ```

mod config;
mod error;
mod item;

pub use config::{validate, ParsedConfig, PlaylistConfig};
pub use error::{EntryError, Result, ValidationError};
pub use item::{
    AssetHandle, ImageMedia, MediaItem, MediaKind, PreparedMedia, VideoMedia, VideoOptions,
    DEFAULT_ROLLOFF_START_DISTANCE, DEFAULT_VOLUME, MAX_DURATION_SECS,
};
