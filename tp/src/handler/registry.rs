//! HandlerRegistry - maps task names to handlers

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::domain::Task;

use super::{FnHandler, HandlerResult, TaskHandler};

/// Name-to-handler map supplied by the caller
///
/// The scheduler resolves a task's name here at dispatch time. Names that
/// are not registered fail the task permanently.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, handler: impl TaskHandler + 'static) -> &mut Self {
        let name = name.into();
        debug!(%name, "HandlerRegistry::register: called");
        self.handlers.insert(name, Arc::new(handler));
        self
    }

    /// Register an async closure as a handler
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(name, FnHandler::new(f))
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, handler: impl TaskHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    /// Look up a handler by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a handler exists
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").field("handlers", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use crate::handler::HandlerError;
    use tokio::time::Instant;

    struct Echo;

    #[async_trait::async_trait]
    impl TaskHandler for Echo {
        async fn execute(&self, task: Task) -> HandlerResult {
            Ok(task.name)
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("echo").is_none());
    }

    #[test]
    fn test_register_and_names() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("zeta", Echo)
            .register_fn("alpha", |_task: Task| async { Err(HandlerError::transient("x")) });

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("beta"));
        assert_eq!(registry.names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_register_replaces() {
        let registry = HandlerRegistry::new().with("echo", Echo).with("echo", Echo);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = HandlerRegistry::new().with("echo", Echo);
        assert!(format!("{:?}", registry).contains("echo"));
    }

    #[tokio::test]
    async fn test_get_dispatches() {
        let registry = HandlerRegistry::new().with("echo", Echo);
        let handler = registry.get("echo").unwrap();
        let task = Task::new(TaskId::new(1), "echo", 1, 1, Instant::now(), 3);
        assert_eq!(handler.execute(task).await, Ok("echo".to_string()));
    }
}
