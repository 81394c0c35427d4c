//! The colorize task plugin.

use super::{PredictionClient, PredictionStatus};
use crate::TaskPlugin;
use async_trait::async_trait;
use mindia_cache::CacheManager;
use mindia_core::{ContentType, MediaPath, Task, TaskPayload};
use mindia_error::{MindiaResult, SchedulerError, SchedulerErrorKind};
use mindia_interface::FileStorage;
use mindia_pipeline::{BytesSource, Pipeline, StorageSink};
use mindia_transform::optimization_steps;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Suffix of the cached colorized variant.
pub const COLORIZE_SUFFIX: &str = "colorize";

/// Task details for a colorize job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorizePayload {
    /// Original to colorize
    pub path: MediaPath,
    /// Remote prediction, once started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
}

impl ColorizePayload {
    /// Payload for a job that has not started yet.
    pub fn new(path: MediaPath) -> Self {
        Self {
            path,
            prediction_id: None,
        }
    }
}

impl TaskPayload for ColorizePayload {
    const TASK_NAME: &'static str = "colorize";
}

/// Starts a remote prediction, polls it on later ticks and caches the result.
///
/// The first run creates the prediction and asks to be polled again. Once the
/// prediction succeeds its output is normalized like a JPEG upload, cached at
/// the `colorize` suffix of the original, and the task is retired.
pub struct ColorizePlugin {
    files: Arc<dyn FileStorage>,
    cache: CacheManager,
    client: Arc<dyn PredictionClient>,
    public_base_url: String,
}

impl ColorizePlugin {
    /// Plugin exposing originals to the service under `public_base_url`.
    pub fn new(
        files: Arc<dyn FileStorage>,
        cache: CacheManager,
        client: Arc<dyn PredictionClient>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            files,
            cache,
            client,
            public_base_url: public_base_url.into(),
        }
    }

    /// A fresh colorize task for `path`.
    pub fn task(path: MediaPath) -> MindiaResult<Task> {
        Task::new(&ColorizePayload::new(path))
    }

    fn public_url(&self, path: &MediaPath) -> String {
        format!("{}{}", self.public_base_url.trim_end_matches('/'), path)
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn store_output(&self, path: &MediaPath, url: &str) -> MindiaResult<()> {
        let body = self.client.fetch_output(url).await?;
        let destination = path.append_suffix(COLORIZE_SUFFIX);

        Pipeline::new(
            BytesSource::new(path.clone(), ContentType::ImageJpeg, body),
            StorageSink::at(self.cache.cache_store().clone(), destination.clone()),
        )
        .with_steps(optimization_steps(&ContentType::ImageJpeg)?)
        .execute()
        .await?;
        tracing::info!(destination = %destination, "Stored colorized variant");

        self.cache.refresh_derived(path).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskPlugin for ColorizePlugin {
    fn name(&self) -> &str {
        ColorizePayload::TASK_NAME
    }

    #[tracing::instrument(skip(self, task), fields(task_id = %task.id))]
    async fn execute(&self, mut task: Task) -> MindiaResult<Option<Task>> {
        let mut payload: ColorizePayload = task.payload()?;

        let Some(prediction_id) = payload.prediction_id.clone() else {
            self.files.get(&payload.path).await?;
            let prediction = self.client.create(&self.public_url(&payload.path)).await?;
            tracing::info!(prediction = %prediction.id, path = %payload.path, "Colorize started");

            payload.prediction_id = Some(prediction.id);
            task.set_payload(&payload)?;
            task.start();
            return Ok(Some(task));
        };

        let prediction = self.client.get(&prediction_id).await?;
        tracing::debug!(prediction = %prediction_id, status = %prediction.status, "Polled prediction");

        match prediction.status {
            PredictionStatus::Starting | PredictionStatus::Processing => {
                task.start();
                Ok(Some(task))
            }
            PredictionStatus::Succeeded => {
                let url = prediction.output_url().ok_or_else(|| {
                    SchedulerError::new(SchedulerErrorKind::Prediction(format!(
                        "prediction {} succeeded without output",
                        prediction_id
                    )))
                })?;
                self.store_output(&payload.path, url).await?;
                Ok(None)
            }
            PredictionStatus::Failed => {
                task.finish(Some(prediction.error_message()));
                Ok(Some(task))
            }
            PredictionStatus::Canceled => {
                task.cancel();
                Ok(Some(task))
            }
        }
    }
}

impl std::fmt::Debug for ColorizePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorizePlugin")
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}
