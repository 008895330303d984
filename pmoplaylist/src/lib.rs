//! # pmoplaylist - Navigation dans une playlist PMOMedia
//!
//! Cette crate fournit le `PlaylistNavigator` : il détient la playlist
//! préchargée active et la position courante, et expose `current()`,
//! `next()` et `previous()` avec ou sans bouclage.
//!
//! # Exemple d'utilisation
//!
//! ```
//! use pmomedia::{AssetHandle, ImageMedia, MediaItem, PlaylistConfig, PreparedMedia};
//! use pmoplaylist::PlaylistNavigator;
//!
//! let item = MediaItem::from(ImageMedia::new("a.png", 0.0).unwrap());
//! let playlist = PlaylistConfig::new(false, vec![PreparedMedia::new(item, AssetHandle::new("a"))]);
//!
//! let mut navigator = PlaylistNavigator::new();
//! navigator.set_playlist(playlist);
//! assert_eq!(navigator.current_index(), Some(0));
//! assert!(navigator.next().is_none());
//! ```

mod navigator;

pub use navigator::PlaylistNavigator;
