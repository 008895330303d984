use std::fmt;
use std::time::Duration;

use pmomedia::MediaKind;
use serde::Serialize;

/// Playback status owned by the player. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    /// Returns a human-readable label for the playback status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Commands processed by the player's control loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Stop,
    Pause,
    Resume,
    Next,
    Previous,
    /// Posted by the auto-skip timer armed with `generation`.
    AutoSkip { generation: u64 },
}

/// Read-only view of the player for hosts that render a UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub status: PlaybackStatus,
    pub configured: bool,
    pub looping: bool,
    pub len: usize,
    pub current_index: Option<usize>,
    pub current_kind: Option<MediaKind>,
    pub current_url: Option<String>,
    pub auto_skip_in: Option<Duration>,
}
