//! Named transformation expansion.

use crate::parser::SEGMENT_SEPARATOR;
use mindia_core::NAMED_TRANSFORMATION_PREFIX;
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_interface::NamedTransformationStorage;
use std::sync::Arc;

/// Replaces `t_<name>` segments with the stored expansion of `<name>`.
///
/// Expansion is one level deep: the stored string is spliced in as is, and
/// any `t_` segment it contains is left for the step registry to reject.
#[derive(Clone)]
pub struct NamedTransformationResolver {
    storage: Arc<dyn NamedTransformationStorage>,
}

impl NamedTransformationResolver {
    /// Resolver looking aliases up in `storage`.
    pub fn new(storage: Arc<dyn NamedTransformationStorage>) -> Self {
        Self { storage }
    }

    /// Expand every named segment of `transformations`.
    ///
    /// Strings without named segments are returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails with `NamedTransformationNotFound` if an alias is not stored and
    /// with `MalformedReference` for a bare `t_` segment.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, transformations: &str) -> MindiaResult<String> {
        let mut resolved = Vec::new();

        for segment in transformations.split(SEGMENT_SEPARATOR) {
            let Some(name) = segment.strip_prefix(NAMED_TRANSFORMATION_PREFIX) else {
                resolved.push(segment.to_string());
                continue;
            };
            if name.is_empty() {
                return Err(TransformError::new(TransformErrorKind::MalformedReference(
                    segment.to_string(),
                ))
                .into());
            }

            let named = self.storage.get(name).await?.ok_or_else(|| {
                TransformError::new(TransformErrorKind::NamedTransformationNotFound(
                    name.to_string(),
                ))
            })?;
            tracing::debug!(name, expansion = %named.transformations(), "Expanded named transformation");
            resolved.push(named.transformations().clone());
        }

        Ok(resolved.join(&SEGMENT_SEPARATOR.to_string()))
    }
}

impl std::fmt::Debug for NamedTransformationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedTransformationResolver").finish_non_exhaustive()
    }
}
