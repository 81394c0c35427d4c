//! Background work for Mindia.
//!
//! - [`TaskScheduler`] polls a [`TaskQueue`](mindia_interface::TaskQueue)
//!   and hands each task to the [`TaskPlugin`] registered under its name.
//! - [`StorageUsageCollector`] periodically reports store sizes to the
//!   analytics recorder.
//! - [`ColorizePlugin`] drives an external prediction service through a
//!   multi-tick task.
//!
//! Both loops run on a [`BackgroundHandle`] that stops between ticks, never
//! in the middle of one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collector;
mod colorize;
mod handle;
mod plugin;
mod scheduler;

pub use collector::StorageUsageCollector;
pub use colorize::{
    COLORIZE_SUFFIX, ColorizePayload, ColorizePlugin, Prediction, PredictionClient,
    PredictionStatus, ReplicateClient, ReplicateConfig, ReplicateConfigBuilder,
};
pub use handle::BackgroundHandle;
pub use plugin::{PluginRegistry, TaskPlugin};
pub use scheduler::{SchedulerConfig, SchedulerConfigBuilder, TaskScheduler, TickReport};
