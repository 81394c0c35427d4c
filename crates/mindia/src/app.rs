//! Wiring of stores, engine and background workers.

use crate::{MediaMetrics, MediaService, MindiaConfig, NamedTransformations, StorageConfig};
use mindia_cache::CacheManager;
use mindia_core::Task;
use mindia_error::MindiaResult;
use mindia_interface::{
    AnalyticsRecorder, FileStorage, MediaRepository, NamedTransformationStorage, TaskQueue,
    TaskRepository,
};
use mindia_scheduler::{
    BackgroundHandle, ColorizePlugin, PluginRegistry, PredictionClient, ReplicateClient,
    StorageUsageCollector, TaskScheduler,
};
use mindia_storage::{
    FileSystemStorage, JsonMediaRepository, JsonNamedTransformationStorage, JsonTaskStore,
    MemoryFileStorage, MemoryMediaRepository, MemoryNamedTransformationStorage, MemoryTaskStore,
};
use mindia_transform::{
    NamedTransformationResolver, OverlaySource, StepRegistry, StorageOverlaySource, Transformer,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Environment variable holding the prediction API token.
pub const REPLICATE_TOKEN_VAR: &str = "REPLICATE_API_TOKEN";

/// The stores Mindia runs against.
#[derive(Clone)]
pub struct Backends {
    /// Original bytes
    pub files: Arc<dyn FileStorage>,
    /// Cached variants
    pub cache: Arc<dyn FileStorage>,
    /// Media records
    pub media: Arc<dyn MediaRepository>,
    /// Named transformations
    pub named: Arc<dyn NamedTransformationStorage>,
    /// Pending tasks
    pub queue: Arc<dyn TaskQueue>,
    /// Task records
    pub tasks: Arc<dyn TaskRepository>,
}

impl Backends {
    /// Local directories for bytes and JSON documents for records.
    pub fn filesystem(config: &StorageConfig) -> MindiaResult<Self> {
        let tasks = Arc::new(JsonTaskStore::new(config.tasks.clone()));
        Ok(Self {
            files: Arc::new(FileSystemStorage::new(config.file_dir.clone())?),
            cache: Arc::new(FileSystemStorage::new(config.cache_dir.clone())?),
            media: Arc::new(JsonMediaRepository::new(config.media_records.clone())),
            named: Arc::new(JsonNamedTransformationStorage::new(
                config.named_transformations.clone(),
            )),
            queue: tasks.clone(),
            tasks,
        })
    }

    /// Everything in memory.
    pub fn in_memory() -> Self {
        let tasks = Arc::new(MemoryTaskStore::new());
        Self {
            files: Arc::new(MemoryFileStorage::new()),
            cache: Arc::new(MemoryFileStorage::new()),
            media: Arc::new(MemoryMediaRepository::new()),
            named: Arc::new(MemoryNamedTransformationStorage::new()),
            queue: tasks.clone(),
            tasks,
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Running background workers.
#[derive(Debug)]
pub struct Workers {
    scheduler: BackgroundHandle,
    dispatcher: Arc<TaskScheduler>,
    collector: BackgroundHandle,
}

impl Workers {
    /// Stop both workers, then wait for dispatched tasks to settle.
    pub async fn stop(self) -> MindiaResult<()> {
        let scheduler = self.scheduler.stop().await;
        let collector = self.collector.stop().await;
        self.dispatcher.drain().await;
        scheduler?;
        collector?;
        info!("Background workers stopped");
        Ok(())
    }
}

/// A fully wired Mindia instance.
pub struct Mindia {
    service: MediaService,
    named: NamedTransformations,
    scheduler: Arc<TaskScheduler>,
    collector: Arc<StorageUsageCollector>,
    tasks: Arc<dyn TaskRepository>,
    metrics: MediaMetrics,
}

impl Mindia {
    /// Filesystem-backed instance for `config`.
    ///
    /// Colorization is only available when enabled in the configuration and
    /// a token is set in `REPLICATE_API_TOKEN`.
    pub fn from_config(config: &MindiaConfig) -> MindiaResult<Self> {
        let backends = Backends::filesystem(&config.storage)?;

        let client: Option<Arc<dyn PredictionClient>> = if config.colorize.enabled {
            match std::env::var(REPLICATE_TOKEN_VAR) {
                Ok(token) => Some(Arc::new(ReplicateClient::new(
                    config.colorize.to_replicate_config(token)?,
                ))),
                Err(_) => {
                    warn!("Colorize enabled but {} is not set", REPLICATE_TOKEN_VAR);
                    None
                }
            }
        } else {
            None
        };

        Self::assemble(backends, config, client)
    }

    /// Instance over `backends`, with colorization through `client` if given.
    pub fn assemble(
        backends: Backends,
        config: &MindiaConfig,
        client: Option<Arc<dyn PredictionClient>>,
    ) -> MindiaResult<Self> {
        let overlays: Arc<dyn OverlaySource> =
            Arc::new(StorageOverlaySource::new(backends.files.clone()));
        let transformer = Arc::new(Transformer::new(
            NamedTransformationResolver::new(backends.named.clone()),
            StepRegistry::with_builtins(overlays),
        ));
        let cache = CacheManager::new(
            backends.files.clone(),
            backends.cache.clone(),
            backends.media.clone(),
            transformer.clone(),
        );

        let mut plugins = PluginRegistry::new();
        if let Some(client) = client {
            plugins.register(Arc::new(ColorizePlugin::new(
                backends.files.clone(),
                cache.clone(),
                client,
                config.colorize.public_base_url.clone(),
            )));
        }
        let scheduler = Arc::new(TaskScheduler::new(
            backends.queue.clone(),
            backends.tasks.clone(),
            plugins,
            config.scheduler.to_scheduler_config()?,
        ));

        let metrics = MediaMetrics::new();
        let analytics: Arc<dyn AnalyticsRecorder> = Arc::new(metrics.clone());
        let collector = Arc::new(StorageUsageCollector::new(
            backends.files.clone(),
            backends.cache.clone(),
            analytics.clone(),
            config.collector.interval(),
        ));

        let service = MediaService::new(
            backends.files,
            backends.media,
            cache,
            scheduler.clone(),
            analytics,
        );
        let named = NamedTransformations::new(backends.named, transformer);

        Ok(Self {
            service,
            named,
            scheduler,
            collector,
            tasks: backends.tasks,
            metrics,
        })
    }

    /// Media operations.
    pub fn media(&self) -> &MediaService {
        &self.service
    }

    /// Named transformation operations.
    pub fn named(&self) -> &NamedTransformations {
        &self.named
    }

    /// The task scheduler.
    pub fn scheduler(&self) -> &Arc<TaskScheduler> {
        &self.scheduler
    }

    /// Usage counters.
    pub fn metrics(&self) -> &MediaMetrics {
        &self.metrics
    }

    /// Every task record.
    pub async fn tasks(&self) -> MindiaResult<Vec<Task>> {
        self.tasks.get_all().await
    }

    /// Task record `id`, if any.
    pub async fn task(&self, id: &Uuid) -> MindiaResult<Option<Task>> {
        self.tasks.get(id).await
    }

    /// Start the scheduler and the storage-usage collector.
    pub fn start(&self) -> Workers {
        info!(plugins = ?self.scheduler.plugins().list(), "Starting background workers");
        Workers {
            scheduler: self.scheduler.clone().start(),
            dispatcher: self.scheduler.clone(),
            collector: self.collector.clone().start(),
        }
    }
}

impl std::fmt::Debug for Mindia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mindia")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
