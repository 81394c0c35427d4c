//! Operation-name to step dispatch.

use crate::steps::{CropStrategy, OverlaySource, ScaleStep, WatermarkStep, parse_color};
use mindia_core::{Anchor, MediaPath, Size, Transformation};
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_pipeline::Step;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a step from one parsed transformation.
///
/// Numeric arguments are read leniently; a factory only fails for arguments
/// it cannot do without.
pub trait StepFactory: Send + Sync {
    /// Operation name this factory answers to, e.g. `c_scale`.
    fn name(&self) -> &str;

    /// Build the step for `transformation`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a required argument is missing or
    /// unusable.
    fn build(&self, transformation: &Transformation) -> MindiaResult<Box<dyn Step>>;
}

/// Registry of step factories keyed by operation name.
pub struct StepRegistry {
    factories: HashMap<String, Arc<dyn StepFactory>>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in `c_scale` and `c_watermark` operations.
    pub fn with_builtins(overlays: Arc<dyn OverlaySource>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ScaleFactory));
        registry.register(Arc::new(WatermarkFactory::new(overlays)));
        registry
    }

    /// Make `factory` the builder for its operation name, replacing any
    /// earlier factory for that name.
    pub fn register(&mut self, factory: Arc<dyn StepFactory>) {
        let name = factory.name().to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::warn!(operation = %name, "Replaced step factory");
        } else {
            tracing::debug!(operation = %name, "Registered step factory");
        }
    }

    /// Factory for operation `name`, if registered.
    pub fn get(&self, name: &str) -> Option<Arc<dyn StepFactory>> {
        self.factories.get(name).cloned()
    }

    /// Build steps for `transformations`, in order.
    ///
    /// # Errors
    ///
    /// The first unknown operation fails the whole build with
    /// `TransformationNotFound`; no partial list is returned.
    #[tracing::instrument(skip(self, transformations), fields(count = transformations.len()))]
    pub fn build(&self, transformations: &[Transformation]) -> MindiaResult<Vec<Box<dyn Step>>> {
        transformations
            .iter()
            .map(|t| -> MindiaResult<Box<dyn Step>> {
                let factory = self.get(t.name()).ok_or_else(|| {
                    TransformError::new(TransformErrorKind::TransformationNotFound(
                        t.name().to_string(),
                    ))
                })?;
                factory.build(t)
            })
            .collect()
    }

    /// Names of all registered operations, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get number of registered operations.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("operations", &self.list())
            .finish()
    }
}

/// `c_scale,w_<px>,h_<px>,a_<crop>,b_<hex>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleFactory;

impl StepFactory for ScaleFactory {
    fn name(&self) -> &str {
        "c_scale"
    }

    fn build(&self, t: &Transformation) -> MindiaResult<Box<dyn Step>> {
        let size = Size::new(t.dimension("w"), t.dimension("h"));
        let mut step = ScaleStep::new(size, CropStrategy::parse(t.arg("a")));

        if let Some(hex) = t.arg("b") {
            match parse_color(hex) {
                Some(color) => step = step.with_background(color),
                None => tracing::warn!(value = hex, "Ignoring unparsable background color"),
            }
        }
        Ok(Box::new(step))
    }
}

/// `c_watermark,o_<path>,w_<px>,h_<px>,p_<px>,a_<anchor>`
///
/// In the overlay path `@@` stands for `/`.
#[derive(Clone)]
pub struct WatermarkFactory {
    overlays: Arc<dyn OverlaySource>,
}

impl WatermarkFactory {
    /// Factory whose steps fetch overlays from `overlays`.
    pub fn new(overlays: Arc<dyn OverlaySource>) -> Self {
        Self { overlays }
    }

    fn overlay_path(t: &Transformation) -> MindiaResult<MediaPath> {
        let raw = t.arg("o").filter(|o| !o.is_empty()).ok_or_else(|| {
            TransformError::new(TransformErrorKind::InvalidArgument {
                name: "o".to_string(),
                reason: "overlay path is required".to_string(),
            })
        })?;

        let path = raw.replace("@@", "/");
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        MediaPath::new(path).map_err(|e| {
            TransformError::new(TransformErrorKind::InvalidArgument {
                name: "o".to_string(),
                reason: e.to_string(),
            })
            .into()
        })
    }
}

impl StepFactory for WatermarkFactory {
    fn name(&self) -> &str {
        "c_watermark"
    }

    fn build(&self, t: &Transformation) -> MindiaResult<Box<dyn Step>> {
        let anchor = match t.arg("a") {
            None => Anchor::default(),
            Some(value) => value.parse::<Anchor>().map_err(|reason| {
                TransformError::new(TransformErrorKind::InvalidArgument {
                    name: "a".to_string(),
                    reason,
                })
            })?,
        };

        let step = WatermarkStep::new(Self::overlay_path(t)?, self.overlays.clone())
            .with_size(Size::new(t.dimension("w"), t.dimension("h")))
            .with_anchor(anchor)
            .with_padding(t.dimension("p"));
        Ok(Box::new(step))
    }
}

impl std::fmt::Debug for WatermarkFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkFactory").finish_non_exhaustive()
    }
}
