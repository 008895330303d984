//! Playback state machine.
//!
//! `Stopped -> Playing -> {Paused <-> Playing, Stopped}`. The player owns the
//! navigator and the auto-skip timer and drives the [`PlaybackSink`]. It is
//! not synchronised: a session runs it from a single control loop that feeds
//! [`PlayerCommand`]s to [`MediaPlayer::handle`].

use std::sync::Arc;

use pmomedia::{PlaylistConfig, PreparedMedia};
use pmoplaylist::PlaylistNavigator;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::capabilities::{PlaybackSink, StartPayload};
use crate::model::{Direction, PlaybackStatus, PlayerCommand, PlayerSnapshot};
use crate::player::AutoSkipTimer;

pub struct MediaPlayer {
    navigator: PlaylistNavigator,
    sink: Arc<dyn PlaybackSink>,
    status: PlaybackStatus,
    timer: AutoSkipTimer,
    commands: UnboundedSender<PlayerCommand>,
}

impl MediaPlayer {
    /// Creates a stopped player without playlist.
    ///
    /// The receiver carries the commands posted through
    /// [`MediaPlayer::commands`], auto-skip firings included; the owner must
    /// drain it into [`MediaPlayer::handle`].
    pub fn new(sink: Arc<dyn PlaybackSink>) -> (Self, UnboundedReceiver<PlayerCommand>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let player = Self {
            navigator: PlaylistNavigator::new(),
            sink,
            status: PlaybackStatus::Stopped,
            timer: AutoSkipTimer::new(),
            commands,
        };
        (player, receiver)
    }

    /// Sender feeding this player's control loop.
    pub fn commands(&self) -> UnboundedSender<PlayerCommand> {
        self.commands.clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn navigator(&self) -> &PlaylistNavigator {
        &self.navigator
    }

    /// True once a playlist (possibly empty) has been loaded.
    pub fn is_configured(&self) -> bool {
        self.navigator.is_configured()
    }

    pub fn current(&self) -> Option<&PreparedMedia> {
        self.navigator.current()
    }

    /// Swaps the active playlist; current playback is stopped first.
    pub fn load_playlist(&mut self, playlist: PlaylistConfig) {
        self.stop();
        info!(
            items = playlist.len(),
            looping = playlist.is_looping(),
            "Activating new playlist"
        );
        self.navigator.set_playlist(playlist);
    }

    /// Plays the current item. No-op when already playing or when there is
    /// nothing to play.
    pub fn start(&mut self) {
        if self.status == PlaybackStatus::Playing {
            debug!("start: already playing");
            return;
        }
        self.play_current();
    }

    /// Stops playback from any state.
    pub fn stop(&mut self) {
        self.sink.stop();
        self.timer.cancel();
        if self.status != PlaybackStatus::Stopped {
            debug!(from = %self.status, "Playback stopped");
        }
        self.status = PlaybackStatus::Stopped;
    }

    /// Pauses playback. Only meaningful while playing; otherwise a no-op.
    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            debug!(status = %self.status, "pause ignored");
            return;
        }
        self.sink.pause();
        self.timer.suspend();
        self.status = PlaybackStatus::Paused;
        debug!("Playback paused");
    }

    /// Resumes paused playback. No-op when playing or stopped.
    pub fn resume(&mut self) {
        if self.status != PlaybackStatus::Paused {
            debug!(status = %self.status, "resume ignored");
            return;
        }
        self.sink.resume();
        let commands = self.commands.clone();
        self.timer.resume(move |generation| {
            let _ = commands.send(PlayerCommand::AutoSkip { generation });
        });
        self.status = PlaybackStatus::Playing;
        debug!("Playback resumed");
    }

    /// Stops the current item and plays its neighbour.
    ///
    /// At a boundary of a non-looping playlist the player stays stopped and
    /// the position stays on the boundary item. Returns true if an item was
    /// started.
    pub fn advance(&mut self, direction: Direction) -> bool {
        self.stop();
        let moved = match direction {
            Direction::Next => self.navigator.next().is_some(),
            Direction::Previous => self.navigator.previous().is_some(),
        };
        if !moved {
            debug!(?direction, index = ?self.navigator.current_index(), "No media to advance to");
            return false;
        }
        self.play_current()
    }

    /// Dispatches a command from the control loop.
    pub fn handle(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Play => self.start(),
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Resume => self.resume(),
            PlayerCommand::Next => {
                self.advance(Direction::Next);
            }
            PlayerCommand::Previous => {
                self.advance(Direction::Previous);
            }
            PlayerCommand::AutoSkip { generation } => {
                if self.timer.acknowledge(generation) {
                    debug!(generation, "Auto-skip");
                    self.advance(Direction::Next);
                } else {
                    warn!(generation, "Ignoring stale auto-skip");
                }
            }
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let current = self.navigator.current().map(PreparedMedia::item);
        PlayerSnapshot {
            status: self.status,
            configured: self.navigator.is_configured(),
            looping: self.navigator.is_looping(),
            len: self.navigator.len(),
            current_index: self.navigator.current_index(),
            current_kind: current.map(|item| item.kind()),
            current_url: current.map(|item| item.source_url().to_string()),
            auto_skip_in: self
                .timer
                .remaining()
                .or_else(|| self.timer.suspended_remaining()),
        }
    }

    fn play_current(&mut self) -> bool {
        self.timer.cancel();

        let Some(media) = self.navigator.current() else {
            debug!("Nothing to play");
            return false;
        };

        let item = media.item();
        self.sink.start(media.asset(), StartPayload::for_item(item));
        info!(
            index = ?self.navigator.current_index(),
            kind = %item.kind(),
            url = item.source_url(),
            "Playing media"
        );

        if let Some(delay) = item.skip_after() {
            let commands = self.commands.clone();
            self.timer.arm(delay, move |generation| {
                let _ = commands.send(PlayerCommand::AutoSkip { generation });
            });
        }

        self.status = PlaybackStatus::Playing;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmomedia::{AssetHandle, ImageMedia, MediaItem, VideoMedia, VideoOptions};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum SinkCall {
        Start(String, StartPayload),
        Pause,
        Resume,
        Stop,
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<SinkCall>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<SinkCall> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl PlaybackSink for RecordingSink {
        fn start(&self, asset: &AssetHandle, payload: StartPayload) {
            self.calls
                .lock()
                .unwrap()
                .push(SinkCall::Start(asset.id().to_string(), payload));
        }
        fn pause(&self) {
            self.calls.lock().unwrap().push(SinkCall::Pause);
        }
        fn resume(&self) {
            self.calls.lock().unwrap().push(SinkCall::Resume);
        }
        fn stop(&self) {
            self.calls.lock().unwrap().push(SinkCall::Stop);
        }
    }

    fn image(name: &str, skip_after: f64) -> PreparedMedia {
        let item = MediaItem::from(ImageMedia::new(name, skip_after).unwrap());
        PreparedMedia::new(item, AssetHandle::new(name))
    }

    fn video(name: &str, skip_after: f64, looping: bool) -> PreparedMedia {
        let options = VideoOptions {
            looping,
            ..VideoOptions::default()
        };
        let item = MediaItem::from(VideoMedia::new(name, skip_after, options).unwrap());
        PreparedMedia::new(item, AssetHandle::new(name))
    }

    fn player_with(
        items: Vec<PreparedMedia>,
        looping: bool,
    ) -> (MediaPlayer, UnboundedReceiver<PlayerCommand>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let (mut player, rx) = MediaPlayer::new(sink.clone());
        player.load_playlist(PlaylistConfig::new(looping, items));
        sink.take();
        (player, rx, sink)
    }

    #[tokio::test]
    async fn test_start_without_playlist_is_noop() {
        let sink = Arc::new(RecordingSink::default());
        let (mut player, _rx) = MediaPlayer::new(sink.clone());
        assert!(!player.is_configured());

        player.start();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert!(sink.take().is_empty());

        player.load_playlist(PlaylistConfig::new(false, Vec::new()));
        assert!(player.is_configured());
        player.start();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (mut player, _rx, sink) = player_with(vec![video("a.mp4", 0.0, true)], false);

        player.start();
        player.start();
        assert_eq!(player.status(), PlaybackStatus::Playing);

        let options = VideoOptions {
            looping: true,
            ..VideoOptions::default()
        };
        assert_eq!(
            sink.take(),
            vec![SinkCall::Start("a.mp4".into(), StartPayload::Video(options))]
        );
    }

    #[tokio::test]
    async fn test_image_start_sets_playing() {
        let (mut player, _rx, sink) = player_with(vec![image("a.png", 0.0)], false);
        player.start();
        assert_eq!(player.status(), PlaybackStatus::Playing);
        assert_eq!(
            sink.take(),
            vec![SinkCall::Start("a.png".into(), StartPayload::Image)]
        );
    }

    #[tokio::test]
    async fn test_pause_and_resume_guards() {
        let (mut player, _rx, sink) = player_with(vec![image("a.png", 0.0)], false);

        // pause depuis Stopped : aucun effet
        player.pause();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert!(sink.take().is_empty());

        player.start();
        // resume pendant la lecture : aucun effet
        player.resume();
        assert_eq!(player.status(), PlaybackStatus::Playing);

        player.pause();
        assert_eq!(player.status(), PlaybackStatus::Paused);
        player.pause();
        player.resume();
        assert_eq!(player.status(), PlaybackStatus::Playing);

        assert_eq!(
            sink.take(),
            vec![
                SinkCall::Start("a.png".into(), StartPayload::Image),
                SinkCall::Pause,
                SinkCall::Resume,
            ]
        );
    }

    #[tokio::test]
    async fn test_stop_from_any_state() {
        let (mut player, _rx, sink) = player_with(vec![image("a.png", 10.0)], false);
        player.start();
        player.pause();
        player.stop();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.snapshot().auto_skip_in, None);

        player.stop();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(sink.take().last(), Some(&SinkCall::Stop));

        // start depuis Paused relance l'entrée courante
        player.start();
        player.pause();
        player.start();
        assert_eq!(player.status(), PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn test_advance_at_boundary_stays_stopped() {
        let (mut player, _rx, sink) =
            player_with(vec![image("a.png", 0.0), image("b.png", 0.0)], false);

        player.start();
        assert!(player.advance(Direction::Next));
        assert_eq!(player.navigator().current_index(), Some(1));

        assert!(!player.advance(Direction::Next));
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.navigator().current_index(), Some(1));

        assert!(player.advance(Direction::Previous));
        assert!(!player.advance(Direction::Previous));
        assert_eq!(player.navigator().current_index(), Some(0));

        let starts = sink
            .take()
            .into_iter()
            .filter(|call| matches!(call, SinkCall::Start(..)))
            .count();
        assert_eq!(starts, 3);
    }

    #[tokio::test]
    async fn test_looping_advance_wraps() {
        let (mut player, _rx, _sink) =
            player_with(vec![image("a.png", 0.0), image("b.png", 0.0)], true);
        player.start();
        assert!(player.advance(Direction::Previous));
        assert_eq!(player.current().unwrap().asset().id(), "b.png");
        assert!(player.advance(Direction::Next));
        assert_eq!(player.current().unwrap().asset().id(), "a.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_skip_advances() {
        let (mut player, mut rx, _sink) =
            player_with(vec![image("a.png", 5.0), video("b.mp4", 0.0, true)], false);
        player.start();
        assert_eq!(player.snapshot().auto_skip_in, Some(Duration::from_secs(5)));

        let command = rx.recv().await.unwrap();
        assert!(matches!(command, PlayerCommand::AutoSkip { .. }));
        player.handle(command);

        assert_eq!(player.navigator().current_index(), Some(1));
        assert_eq!(player.status(), PlaybackStatus::Playing);
        // La vidéo n'a pas de skipAfter : plus de timer
        assert_eq!(player.snapshot().auto_skip_in, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_auto_skip_is_ignored() {
        let (mut player, mut rx, _sink) =
            player_with(vec![image("a.png", 1.0), image("b.png", 1.0)], false);
        player.start();

        // Le timer a posté son évènement, mais l'utilisateur a arrêté entre-temps
        let command = rx.recv().await.unwrap();
        player.stop();
        player.handle(command.clone());
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.navigator().current_index(), Some(0));

        // Idem après un redémarrage : l'ancienne génération reste périmée
        player.start();
        player.handle(command);
        assert_eq!(player.navigator().current_index(), Some(0));
        assert_eq!(player.status(), PlaybackStatus::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_suspends_auto_skip() {
        let (mut player, mut rx, _sink) =
            player_with(vec![image("a.png", 10.0), image("b.png", 0.0)], false);
        player.start();

        tokio::time::advance(Duration::from_secs(4)).await;
        player.pause();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(player.snapshot().auto_skip_in, Some(Duration::from_secs(6)));

        player.resume();
        assert_eq!(player.snapshot().auto_skip_in, Some(Duration::from_secs(6)));
        let command = rx.recv().await.unwrap();
        player.handle(command);
        assert_eq!(player.navigator().current_index(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_longest_auto_skip_delay_plays() {
        let (mut player, mut rx, _sink) = player_with(
            vec![image("a.png", pmomedia::MAX_DURATION_SECS), image("b.png", 0.0)],
            false,
        );
        player.start();
        assert_eq!(player.status(), PlaybackStatus::Playing);
        assert_eq!(
            player.snapshot().auto_skip_in,
            Some(Duration::from_secs(86_400))
        );

        let command = rx.recv().await.unwrap();
        player.handle(command);
        assert_eq!(player.navigator().current_index(), Some(1));
    }

    #[tokio::test]
    async fn test_load_playlist_stops_playback() {
        let (mut player, _rx, sink) = player_with(vec![image("a.png", 0.0)], false);
        player.start();
        player.load_playlist(PlaylistConfig::new(true, vec![image("z.png", 0.0)]));

        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.current().unwrap().asset().id(), "z.png");
        assert_eq!(sink.take().last(), Some(&SinkCall::Stop));

        let snapshot = player.snapshot();
        assert!(snapshot.configured);
        assert!(snapshot.looping);
        assert_eq!(snapshot.len, 1);
        assert_eq!(snapshot.current_url.as_deref(), Some("z.png"));
    }

    #[tokio::test]
    async fn test_handle_dispatches_commands() {
        let (mut player, _rx, _sink) =
            player_with(vec![image("a.png", 0.0), image("b.png", 0.0)], false);
        player.handle(PlayerCommand::Play);
        player.handle(PlayerCommand::Next);
        assert_eq!(player.navigator().current_index(), Some(1));
        player.handle(PlayerCommand::Pause);
        assert_eq!(player.status(), PlaybackStatus::Paused);
        player.handle(PlayerCommand::Resume);
        assert_eq!(player.status(), PlaybackStatus::Playing);
        player.handle(PlayerCommand::Previous);
        assert_eq!(player.navigator().current_index(), Some(0));
        player.handle(PlayerCommand::Stop);
        assert_eq!(player.status(), PlaybackStatus::Stopped);
    }
}
