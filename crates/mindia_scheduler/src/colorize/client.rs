//! Prediction API client.

use async_trait::async_trait;
use bytes::Bytes;
use derive_getters::Getters;
use mindia_error::{HttpError, MindiaResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Lifecycle of a remote prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    /// Queued remotely
    #[display("starting")]
    Starting,
    /// Running remotely
    #[display("processing")]
    Processing,
    /// Output is available
    #[display("succeeded")]
    Succeeded,
    /// The model failed
    #[display("failed")]
    Failed,
    /// Stopped before completion
    #[display("canceled")]
    Canceled,
}

/// A remote prediction as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Remote identifier
    pub id: String,
    /// Current status
    pub status: PredictionStatus,
    /// Output, usually a URL or a list of URLs
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Failure description
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    /// First output URL, if any.
    pub fn output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url),
            serde_json::Value::Array(items) => items.first()?.as_str(),
            _ => None,
        }
    }

    /// Failure description as text.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("prediction {} {}", self.id, self.status),
        }
    }
}

/// Remote colorization service.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Start colorizing the image reachable at `image_url`.
    async fn create(&self, image_url: &str) -> MindiaResult<Prediction>;

    /// Current state of prediction `id`.
    async fn get(&self, id: &str) -> MindiaResult<Prediction>;

    /// Download a prediction output.
    async fn fetch_output(&self, url: &str) -> MindiaResult<Bytes>;
}

/// Settings for [`ReplicateClient`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ReplicateConfig {
    /// API root
    #[builder(default = "String::from(\"https://api.replicate.com/v1\")")]
    api_base_url: String,
    /// API token
    api_token: String,
    /// Model version hash
    #[builder(default = "String::from(\"376c74a2c9eb442a2ff9391b84dc5b949cd4e80b4dc0565115be0a19b7df0ae6\")")]
    model_version: String,
    /// Colorization model variant
    #[builder(default = "String::from(\"Artistic\")")]
    model_name: String,
    /// Render quality factor
    #[builder(default = "35")]
    render_factor: u32,
}

/// Replicate-style prediction API over HTTP.
#[derive(Debug, Clone)]
pub struct ReplicateClient {
    client: Client,
    config: ReplicateConfig,
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    input_image: &'a str,
    model_name: &'a str,
    render_factor: u32,
}

impl ReplicateClient {
    /// Client using `config`.
    pub fn new(config: ReplicateConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> MindiaResult<reqwest::Response> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::with_status(status, body).into());
        }
        Ok(response)
    }

    async fn prediction(response: reqwest::Response) -> MindiaResult<Prediction> {
        response
            .json()
            .await
            .map_err(|e| HttpError::new(format!("Failed to parse prediction: {}", e)).into())
    }
}

#[async_trait]
impl PredictionClient for ReplicateClient {
    #[tracing::instrument(skip(self))]
    async fn create(&self, image_url: &str) -> MindiaResult<Prediction> {
        let body = CreatePrediction {
            version: &self.config.model_version,
            input: PredictionInput {
                input_image: image_url,
                model_name: &self.config.model_name,
                render_factor: self.config.render_factor,
            },
        };
        let url = format!("{}/predictions", self.config.api_base_url);
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let prediction = Self::prediction(response).await?;
        tracing::debug!(id = %prediction.id, status = %prediction.status, "Prediction created");
        Ok(prediction)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: &str) -> MindiaResult<Prediction> {
        let url = format!("{}/predictions/{}", self.config.api_base_url, id);
        let response = self.send(self.client.get(&url)).await?;
        Self::prediction(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_output(&self, url: &str) -> MindiaResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Download failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(HttpError::with_status(response.status().as_u16(), url).into());
        }
        response
            .bytes()
            .await
            .map_err(|e| HttpError::new(format!("Download failed: {}", e)).into())
    }
}
