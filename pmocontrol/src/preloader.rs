//! All-or-nothing asset preloading for a playlist.
//!
//! Every distinct asset of a batch is requested from the [`AssetLoader`] at
//! once; the batch resolves when all loads succeed, or fails as soon as one
//! of them fails. Assets of a failed batch are dropped and never reach the
//! cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::try_join_all;
use pmomedia::{AssetHandle, MediaItem, MediaKind, PreparedMedia};
use tracing::{debug, info, warn};

use crate::capabilities::AssetLoader;
use crate::errors::LoadError;

type AssetKey = (MediaKind, String);

/// Preloads media assets and keeps the handles of successful batches,
/// keyed by media kind and URL.
pub struct AssetPreloader {
    loader: Arc<dyn AssetLoader>,
    cache: Mutex<HashMap<AssetKey, AssetHandle>>,
    timeout: Option<Duration>,
}

impl AssetPreloader {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
            timeout: None,
        }
    }

    /// Bounds the duration of a whole batch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<AssetKey, AssetHandle>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the asset of every item and pairs each item with its handle,
    /// preserving the input order.
    pub async fn preload(&self, items: Vec<MediaItem>) -> Result<Vec<PreparedMedia>, LoadError> {
        let keys: Vec<AssetKey> = items
            .iter()
            .map(|item| (item.kind(), item.source_url().to_string()))
            .collect();

        // Une seule requête par ressource absente du cache
        let mut resolved: HashMap<AssetKey, AssetHandle> = HashMap::new();
        let mut pending: Vec<AssetKey> = Vec::new();
        {
            let cache = self.cache();
            for key in &keys {
                if resolved.contains_key(key) || pending.contains(key) {
                    continue;
                }
                match cache.get(key) {
                    Some(handle) => {
                        resolved.insert(key.clone(), handle.clone());
                    }
                    None => pending.push(key.clone()),
                }
            }
        }

        debug!(
            items = items.len(),
            cached = resolved.len(),
            to_load = pending.len(),
            "Preloading media assets"
        );

        let loads = pending.iter().map(|key| {
            let loader = Arc::clone(&self.loader);
            async move {
                let (kind, url) = key;
                loader
                    .load(*kind, url)
                    .await
                    .map(|handle| (key.clone(), handle))
            }
        });

        let batch = try_join_all(loads);
        let loaded = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, batch)
                .await
                .map_err(|_| LoadError::Timeout(limit))
                .and_then(|result| result),
            None => batch.await,
        }
        .map_err(|e| {
            warn!("Asset preload failed, batch discarded: {}", e);
            e
        })?;

        {
            let mut cache = self.cache();
            for (key, handle) in loaded {
                cache.insert(key.clone(), handle.clone());
                resolved.insert(key, handle);
            }
        }

        let prepared = items
            .into_iter()
            .zip(keys)
            .map(|(item, key)| match resolved.get(&key) {
                Some(handle) => Ok(PreparedMedia::new(item, handle.clone())),
                None => Err(LoadError::asset(&key.1, "no handle returned by the loader")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(items = prepared.len(), "Media assets preloaded");
        Ok(prepared)
    }

    /// Forgets every cached handle for `url`; returns true if one was dropped.
    pub fn invalidate(&self, url: &str) -> bool {
        let mut cache = self.cache();
        let before = cache.len();
        cache.retain(|(_, cached_url), _| cached_url != url);
        before != cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    pub fn cached_assets(&self) -> usize {
        self.cache().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pmomedia::{ImageMedia, VideoMedia, VideoOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    /// Loader de test : échoue sur les URLs contenant "broken".
    #[derive(Default)]
    struct ScriptedLoader {
        calls: AtomicUsize,
        delay: Option<Duration>,
        barrier: Option<Barrier>,
    }

    #[async_trait]
    impl AssetLoader for ScriptedLoader {
        async fn load(&self, kind: MediaKind, url: &str) -> Result<AssetHandle, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if url.contains("broken") {
                return Err(LoadError::asset(url, "404"));
            }
            Ok(AssetHandle::new(format!("{kind}:{url}")))
        }
    }

    fn image(url: &str) -> MediaItem {
        ImageMedia::new(url, 0.0).unwrap().into()
    }

    fn video(url: &str) -> MediaItem {
        VideoMedia::new(url, 0.0, VideoOptions::default())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_preload_keeps_order() {
        let preloader = AssetPreloader::new(Arc::new(ScriptedLoader::default()));
        let prepared = preloader
            .preload(vec![image("a.png"), video("b.mp4"), image("c.png")])
            .await
            .unwrap();

        let ids: Vec<&str> = prepared.iter().map(|m| m.asset().id()).collect();
        assert_eq!(ids, ["image:a.png", "video:b.mp4", "image:c.png"]);
        assert_eq!(preloader.cached_assets(), 3);
    }

    #[tokio::test]
    async fn test_one_failure_discards_the_batch() {
        let loader = Arc::new(ScriptedLoader::default());
        let preloader = AssetPreloader::new(loader.clone());

        let err = preloader
            .preload(vec![image("a.png"), image("broken.png"), image("c.png")])
            .await
            .unwrap_err();

        assert_eq!(err, LoadError::asset("broken.png", "404"));
        assert_eq!(preloader.cached_assets(), 0);
    }

    #[tokio::test]
    async fn test_loads_run_concurrently() {
        // Chaque chargement attend les deux autres : un chargement séquentiel bloquerait.
        let loader = Arc::new(ScriptedLoader {
            barrier: Some(Barrier::new(3)),
            ..Default::default()
        });
        let preloader = AssetPreloader::new(loader.clone());

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            preloader.preload(vec![image("a.png"), image("b.png"), image("c.png")]),
        )
        .await
        .expect("loads were not issued concurrently");

        assert_eq!(result.unwrap().len(), 3);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_duplicates_and_cache_hits_are_loaded_once() {
        let loader = Arc::new(ScriptedLoader::default());
        let preloader = AssetPreloader::new(loader.clone());

        let prepared = preloader
            .preload(vec![image("a.png"), image("a.png"), video("a.png")])
            .await
            .unwrap();
        assert_eq!(prepared.len(), 3);
        assert_eq!(prepared[0].asset(), prepared[1].asset());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);

        preloader.preload(vec![image("a.png")]).await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);

        assert!(preloader.invalidate("a.png"));
        assert!(!preloader.invalidate("a.png"));
        preloader.preload(vec![image("a.png")]).await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);

        preloader.clear_cache();
        assert_eq!(preloader.cached_assets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let loader = Arc::new(ScriptedLoader {
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let preloader = AssetPreloader::new(loader).with_timeout(Duration::from_secs(10));

        let err = preloader.preload(vec![image("slow.png")]).await.unwrap_err();
        assert_eq!(err, LoadError::Timeout(Duration::from_secs(10)));
        assert_eq!(preloader.cached_assets(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let loader = Arc::new(ScriptedLoader::default());
        let preloader = AssetPreloader::new(loader.clone());
        assert!(preloader.preload(Vec::new()).await.unwrap().is_empty());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }
}
