//! Management of stored transformation aliases.

use mindia_core::NamedTransformation;
use mindia_error::{MindiaResult, TransformError, TransformErrorKind};
use mindia_interface::NamedTransformationStorage;
use mindia_transform::{ARG_SEPARATOR, SEGMENT_SEPARATOR, Transformer, parse};
use std::sync::Arc;
use tracing::{info, instrument};

/// Create, update and remove named transformations.
///
/// Expansions are validated against the step registry before they are
/// stored, so an alias never expands to an unknown operation. Aliases may
/// not refer to other aliases.
#[derive(Clone)]
pub struct NamedTransformations {
    storage: Arc<dyn NamedTransformationStorage>,
    transformer: Arc<Transformer>,
}

impl NamedTransformations {
    /// Operations over `storage`, validating with `transformer`'s registry.
    pub fn new(storage: Arc<dyn NamedTransformationStorage>, transformer: Arc<Transformer>) -> Self {
        Self {
            storage,
            transformer,
        }
    }

    /// Every alias, ordered by name.
    pub async fn list(&self) -> MindiaResult<Vec<NamedTransformation>> {
        self.storage.get_all().await
    }

    /// Alias called `name`, if stored.
    pub async fn get(&self, name: &str) -> MindiaResult<Option<NamedTransformation>> {
        self.storage.get(name).await
    }

    /// Store a new alias, replacing any alias of the same name.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, transformations: &str) -> MindiaResult<NamedTransformation> {
        self.validate(name, transformations)?;
        let named = NamedTransformation::new(name, transformations);
        self.storage.save(&named).await?;
        info!("Created named transformation");
        Ok(named)
    }

    /// Change the expansion of an existing alias, keeping its creation time.
    ///
    /// # Errors
    ///
    /// Fails with `NamedTransformationNotFound` if the alias is not stored.
    #[instrument(skip(self))]
    pub async fn update(&self, name: &str, transformations: &str) -> MindiaResult<NamedTransformation> {
        self.validate(name, transformations)?;
        let mut named = self.storage.get(name).await?.ok_or_else(|| {
            TransformError::new(TransformErrorKind::NamedTransformationNotFound(name.to_string()))
        })?;
        named.update(transformations);
        self.storage.save(&named).await?;
        info!("Updated named transformation");
        Ok(named)
    }

    /// Store `transformations` under `name`, creating or updating as needed.
    pub async fn upsert(&self, name: &str, transformations: &str) -> MindiaResult<NamedTransformation> {
        match self.storage.get(name).await? {
            Some(_) => self.update(name, transformations).await,
            None => self.create(name, transformations).await,
        }
    }

    /// Remove an alias.
    pub async fn delete(&self, name: &str) -> MindiaResult<()> {
        self.storage.delete(name).await
    }

    /// Remove every alias.
    pub async fn delete_all(&self) -> MindiaResult<()> {
        self.storage.delete_all().await
    }

    fn validate(&self, name: &str, transformations: &str) -> MindiaResult<()> {
        if name.trim().is_empty() || name.contains([SEGMENT_SEPARATOR, ARG_SEPARATOR]) {
            return Err(invalid("name", format!("'{}' cannot be used as an alias", name)));
        }

        let parsed = parse(transformations);
        if parsed.is_empty() {
            return Err(invalid("transformations", "no operation given"));
        }
        self.transformer.registry().build(&parsed)?;
        Ok(())
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> mindia_error::MindiaError {
    TransformError::new(TransformErrorKind::InvalidArgument {
        name: name.to_string(),
        reason: reason.into(),
    })
    .into()
}

impl std::fmt::Debug for NamedTransformations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedTransformations").finish_non_exhaustive()
    }
}
