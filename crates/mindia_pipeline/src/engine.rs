//! Source, step and sink contracts and the pipeline that runs them.

use crate::PipelineContext;
use async_trait::async_trait;
use mindia_error::{MindiaResult, PipelineError, PipelineErrorKind};

/// Produces the initial context, typically by fetching original bytes.
#[async_trait]
pub trait Source: Send + Sync {
    /// Build the starting context. It must carry a buffer.
    async fn read(&self) -> MindiaResult<PipelineContext>;
}

/// A transformation applied to the context in place.
///
/// A step may only rely on its own declared preconditions, never on an
/// earlier step having run.
#[async_trait]
pub trait Step: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Transform the context.
    async fn run(&self, ctx: &mut PipelineContext) -> MindiaResult<()>;
}

/// Terminal side effect, typically persisting the final bytes.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Consume the final context.
    async fn write(&self, ctx: &mut PipelineContext) -> MindiaResult<()>;
}

/// One source, ordered steps, one sink.
///
/// A pipeline runs once: [`Pipeline::execute`] consumes it, since the
/// source's stream can only be read once.
pub struct Pipeline {
    source: Box<dyn Source>,
    steps: Vec<Box<dyn Step>>,
    sink: Box<dyn Sink>,
}

impl Pipeline {
    /// Pipeline with no steps between `source` and `sink`.
    pub fn new(source: impl Source + 'static, sink: impl Sink + 'static) -> Self {
        Self {
            source: Box::new(source),
            steps: Vec::new(),
            sink: Box::new(sink),
        }
    }

    /// Append steps, run in the given order.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Box<dyn Step>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Number of steps between source and sink.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run source, steps and sink, stopping at the first error.
    ///
    /// The sink only runs if every step succeeded.
    #[tracing::instrument(skip(self), fields(steps = self.steps.len()))]
    pub async fn execute(self) -> MindiaResult<PipelineContext> {
        let mut ctx = self.source.read().await.inspect_err(|e| {
            tracing::debug!(error = %e, "Pipeline source failed");
        })?;
        if ctx.buffer.is_none() {
            return Err(PipelineError::new(PipelineErrorKind::SourceMissingBuffer).into());
        }
        tracing::debug!(path = %ctx.path, content_type = %ctx.content_type, "Source read");

        for (index, step) in self.steps.iter().enumerate() {
            step.run(&mut ctx).await.inspect_err(|e| {
                tracing::debug!(index, step = step.name(), error = %e, "Pipeline step failed");
            })?;
            tracing::trace!(index, step = step.name(), "Step completed");
        }

        self.sink.write(&mut ctx).await.inspect_err(|e| {
            tracing::debug!(error = %e, "Pipeline sink failed");
        })?;
        Ok(ctx)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
