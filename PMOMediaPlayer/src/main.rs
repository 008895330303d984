use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use pmocontrol::{
    AssetLoader, AssetPreloader, ConfigError, FileConfigStore, LoadError, MediaPlayer,
    PlaybackSink, PlayerCommand, SessionConfigManager, StartPayload,
};
use pmomedia::{AssetHandle, MediaKind, PlaylistConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod playlist_loader;

use crate::playlist_loader::PlaylistLoader;

const USAGE: &str = "usage: PMOMediaPlayer <session> <user> [config.json]";

/// Résout les URLs locales sur le disque ; les URLs http(s) sont laissées au moteur de rendu.
struct LocalAssetLoader;

#[async_trait]
impl AssetLoader for LocalAssetLoader {
    async fn load(&self, kind: MediaKind, url: &str) -> Result<AssetHandle, LoadError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(AssetHandle::new(format!("{kind}:{url}")));
        }

        let path = url.strip_prefix("file://").unwrap_or(url);
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| LoadError::asset(url, e))?;
        if !metadata.is_file() {
            return Err(LoadError::asset(url, "not a regular file"));
        }
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| LoadError::asset(url, e))?;
        Ok(AssetHandle::new(format!("{kind}:{}", canonical.display())))
    }
}

/// Moteur de rendu factice : trace les commandes reçues
struct ConsoleSink;

impl PlaybackSink for ConsoleSink {
    fn start(&self, asset: &AssetHandle, payload: StartPayload) {
        match payload {
            StartPayload::Video(options) => info!(
                target: "sink",
                asset = %asset,
                volume = options.volume,
                start_time = ?options.start_time,
                looping = options.looping,
                rolloff_start_distance = options.rolloff_start_distance,
                "▶️  start video"
            ),
            StartPayload::Image => info!(target: "sink", asset = %asset, "🖼️  show image"),
        }
    }

    fn pause(&self) {
        info!(target: "sink", "⏸️  pause");
    }

    fn resume(&self) {
        info!(target: "sink", "▶️  resume");
    }

    fn stop(&self) {
        info!(target: "sink", "⏹️  stop");
    }
}

fn init_logging(config: &pmoconfig::Config) {
    let settings = config.get_logger_settings();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.min_level.to_lowercase()));

    let subscriber = tracing_subscriber::registry().with(filter);
    if settings.enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .init();
    } else {
        subscriber.init();
    }
}

/// Accepte la playlist même si elle n'a pas pu être sauvegardée.
fn accept(result: Result<PlaylistConfig, ConfigError>) -> Result<PlaylistConfig, ConfigError> {
    match result {
        Err(ConfigError::NotPersisted { source, playlist }) => {
            warn!("⚠️ Playlist not saved, it will not be restored on restart: {}", source);
            Ok(*playlist)
        }
        other => other,
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

fn parse_command(line: &str) -> Option<PlayerCommand> {
    match line {
        "play" => Some(PlayerCommand::Play),
        "pause" => Some(PlayerCommand::Pause),
        "resume" => Some(PlayerCommand::Resume),
        "stop" => Some(PlayerCommand::Stop),
        "next" => Some(PlayerCommand::Next),
        "prev" | "previous" => Some(PlayerCommand::Previous),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = pmoconfig::get_config();
    init_logging(&config);

    let mut args = std::env::args().skip(1);
    let (Some(session), Some(user)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let config_file = args.next().map(PathBuf::from);

    // ========== Collaborateurs ==========
    let store = FileConfigStore::from_config()?;
    info!("💾 Session configs stored in {}", store.base_dir().display());

    let mut preloader = AssetPreloader::new(Arc::new(LocalAssetLoader));
    let timeout_secs = config.get_preload_timeout_secs()?;
    if timeout_secs > 0 {
        preloader = preloader.with_timeout(Duration::from_secs(timeout_secs as u64));
    }
    let manager = Arc::new(SessionConfigManager::new(Arc::new(store), preloader));

    // ========== Playlist initiale ==========
    let playlist = match &config_file {
        Some(path) => {
            let raw = read_file(path).await?;
            accept(manager.submit(&raw, &session, &user).await)?
        }
        None => match manager.resume_session(&session).await? {
            Some((owner, playlist)) => {
                info!("🔁 Resuming playlist submitted by {}", owner);
                playlist
            }
            None => bail!("no stored configuration for session {session}\n{USAGE}"),
        },
    };

    let (mut player, mut commands) = MediaPlayer::new(Arc::new(ConsoleSink));
    player.load_playlist(playlist);
    player.start();

    info!("✅ PMOMediaPlayer is ready!");
    info!("Commands: play | pause | resume | stop | next | prev | status | load <file> | quit");

    // ========== Boucle de contrôle ==========
    let (mut loader, mut loaded) = PlaylistLoader::new(Arc::clone(&manager), &session, &user);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(command) = commands.recv() => player.handle(command),
            Some(result) = loaded.recv() => {
                let origin = result.origin.clone();
                match loader.accept(result).map(accept) {
                    Some(Ok(playlist)) => {
                        info!("🎬 Switching to playlist {}", origin);
                        player.load_playlist(playlist);
                        player.start();
                    }
                    // L'ancienne playlist continue
                    Some(Err(e)) => error!("❌ {}: {}", origin, e),
                    None => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                match line {
                    "" => {}
                    "quit" | "exit" => break,
                    "status" => println!("{}", serde_json::to_string_pretty(&player.snapshot())?),
                    _ if line.starts_with("load ") => {
                        let path = PathBuf::from(line["load ".len()..].trim());
                        match read_file(&path).await {
                            Ok(raw) => loader.request(path.display().to_string(), raw),
                            Err(e) => error!("❌ {:#}", e),
                        }
                    }
                    _ => match parse_command(line) {
                        Some(command) => player.handle(command),
                        None => warn!("Unknown command: {}", line),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    player.stop();
    info!("👋 Bye");
    Ok(())
}
