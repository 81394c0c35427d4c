//! Transformation handling for Mindia.
//!
//! A transformation string such as `c_scale,w_100,h_100/t_logo` is handled in
//! three stages:
//!
//! 1. [`NamedTransformationResolver`] splices stored aliases (`t_` segments)
//!    into the string.
//! 2. [`parse`] splits the resolved string into [`Transformation`]s.
//! 3. [`StepRegistry`] turns each transformation into a pipeline step.
//!
//! [`Transformer`] bundles the three stages.
//!
//! [`Transformation`]: mindia_core::Transformation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod named;
mod optimization;
mod parser;
mod registry;
mod request;
mod steps;
mod transformer;

pub use named::NamedTransformationResolver;
pub use optimization::optimization_steps;
pub use parser::{ARG_SEPARATOR, SEGMENT_SEPARATOR, VALUE_SEPARATOR, parse, parse_segment};
pub use registry::{ScaleFactory, StepFactory, StepRegistry, WatermarkFactory};
pub use request::split_request_path;
pub use steps::{
    CropStrategy, ExifStep, OverlaySource, ScaleStep, StorageOverlaySource, WatermarkStep,
    WebpStep, parse_color,
};
pub use transformer::{PreparedTransformation, Transformer};
