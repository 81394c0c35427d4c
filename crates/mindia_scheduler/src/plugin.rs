//! Task plugins and their registry.

use async_trait::async_trait;
use mindia_core::Task;
use mindia_error::{MindiaResult, SchedulerError, SchedulerErrorKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Handles tasks carrying its name.
#[async_trait]
pub trait TaskPlugin: Send + Sync {
    /// Task name this plugin answers to.
    fn name(&self) -> &str;

    /// Advance `task`.
    ///
    /// Returning `Some(task)` with a non-terminal status asks for another
    /// run on a later tick. A terminal status records the task as done, and
    /// `None` retires it entirely.
    async fn execute(&self, task: Task) -> MindiaResult<Option<Task>>;
}

/// Registry for managing plugins.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn TaskPlugin>>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Add `plugin` under its task name. A later plugin for the same name
    /// wins.
    pub fn register(&mut self, plugin: Arc<dyn TaskPlugin>) {
        let name = plugin.name().to_string();
        match self.plugins.insert(name.clone(), plugin) {
            Some(_) => tracing::warn!(plugin = %name, "Replaced plugin of the same name"),
            None => tracing::debug!(plugin = %name, "Registered plugin"),
        }
    }

    /// Plugin handling tasks named `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskPlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Run the plugin registered for `task`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No plugin is registered under the task name
    /// - The plugin fails
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, task_name = %task.name))]
    pub async fn execute(&self, task: Task) -> MindiaResult<Option<Task>> {
        let plugin = self.get(&task.name).ok_or_else(|| {
            SchedulerError::new(SchedulerErrorKind::PluginNotFound(task.name.clone()))
        })?;

        tracing::debug!("Executing plugin");
        plugin.execute(task).await
    }

    /// Names of all registered plugins, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.list())
            .finish()
    }
}
