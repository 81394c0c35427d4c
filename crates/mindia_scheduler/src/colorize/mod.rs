//! Colorization through an external prediction service.

mod client;
mod plugin;

pub use client::{
    Prediction, PredictionClient, PredictionStatus, ReplicateClient, ReplicateConfig,
    ReplicateConfigBuilder,
};
pub use plugin::{COLORIZE_SUFFIX, ColorizePayload, ColorizePlugin};
