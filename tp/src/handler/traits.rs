//! Task handler trait definition

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Task;

/// Failure signalled by a task handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Worth retrying; routed through the retry policy
    #[error("{0}")]
    Transient(String),

    /// Retrying cannot help; the task fails immediately
    #[error("{0}")]
    Permanent(String),
}

impl HandlerError {
    /// Create a retryable failure
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a non-retryable failure
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// Check if this failure skips the retry path
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }
}

/// Outcome of one attempt
pub type HandlerResult = Result<String, HandlerError>;

/// A task body the scheduler can dispatch to by name
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run one attempt. Receives a snapshot of the task as dispatched.
    async fn execute(&self, task: Task) -> HandlerResult;
}

/// Adapts an async closure into a [`TaskHandler`]
pub struct FnHandler<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f, _fut: PhantomData }
    }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F, Fut>
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn execute(&self, task: Task) -> HandlerResult {
        (self.f)(task).await
    }
}
