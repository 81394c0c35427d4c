//! Resolve, parse and build in one call.

use crate::{NamedTransformationResolver, StepRegistry, parse};
use mindia_error::MindiaResult;
use mindia_pipeline::Step;

/// A transformation string made ready to run.
pub struct PreparedTransformation {
    /// String after named aliases were expanded
    pub resolved: String,
    /// Steps to run, in order
    pub steps: Vec<Box<dyn Step>>,
}

impl std::fmt::Debug for PreparedTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedTransformation")
            .field("resolved", &self.resolved)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Turns raw transformation strings into pipeline steps.
#[derive(Debug)]
pub struct Transformer {
    resolver: NamedTransformationResolver,
    registry: StepRegistry,
}

impl Transformer {
    /// Transformer expanding aliases with `resolver` and building steps from
    /// `registry`.
    pub fn new(resolver: NamedTransformationResolver, registry: StepRegistry) -> Self {
        Self { resolver, registry }
    }

    /// Expand named aliases only.
    pub async fn resolve(&self, raw: &str) -> MindiaResult<String> {
        self.resolver.resolve(raw).await
    }

    /// Expand, parse and build `raw`.
    ///
    /// # Errors
    ///
    /// Unknown aliases, unknown operations and unusable required arguments
    /// all fail the whole preparation.
    #[tracing::instrument(skip(self))]
    pub async fn prepare(&self, raw: &str) -> MindiaResult<PreparedTransformation> {
        let resolved = self.resolver.resolve(raw).await?;
        let steps = self.registry.build(&parse(&resolved))?;
        tracing::debug!(resolved = %resolved, steps = steps.len(), "Prepared transformation");
        Ok(PreparedTransformation { resolved, steps })
    }

    /// The step registry.
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }
}
