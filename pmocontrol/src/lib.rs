//! Playback control for user-configured media playlists.
//!
//! The crate glues three host collaborators together:
//!
//! - an [`AssetLoader`] that turns a media URL into a ready [`AssetHandle`](pmomedia::AssetHandle),
//! - a [`PlaybackSink`] that presents a ready asset,
//! - a [`ConfigStore`] that keeps the last accepted configuration per session and user.
//!
//! [`SessionConfigManager`] validates, saves and preloads a configuration;
//! [`MediaPlayer`] plays the resulting [`PlaylistConfig`](pmomedia::PlaylistConfig)
//! and auto-advances through it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pmocontrol::{AssetPreloader, MediaPlayer, MemoryConfigStore, SessionConfigManager};
//! # use pmocontrol::{AssetLoader, PlaybackSink};
//! # async fn demo(loader: Arc<dyn AssetLoader>, sink: Arc<dyn PlaybackSink>) -> anyhow::Result<()> {
//! let manager = SessionConfigManager::new(
//!     Arc::new(MemoryConfigStore::new()),
//!     AssetPreloader::new(loader),
//! );
//! let playlist = manager
//!     .submit(r#"{"mediaList": [{"imageUrl": "a.png", "skipAfter": 5}]}"#, "s1", "bob")
//!     .await?;
//!
//! let (mut player, mut commands) = MediaPlayer::new(sink);
//! player.load_playlist(playlist);
//! player.start();
//! while let Some(command) = commands.recv().await {
//!     player.handle(command);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod errors;
pub mod model;
pub mod player;
pub mod preloader;
pub mod session;
pub mod store;

// pmoconfig extension (optional)
#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "pmoconfig")]
pub use config_ext::MediaStoreConfigExt;

pub use capabilities::{AssetLoader, PlaybackSink, StartPayload};
pub use errors::{ConfigError, LoadError, StoreError};
pub use model::{Direction, PlaybackStatus, PlayerCommand, PlayerSnapshot};
pub use player::{AutoSkipTimer, MediaPlayer};
pub use preloader::AssetPreloader;
pub use session::SessionConfigManager;
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
