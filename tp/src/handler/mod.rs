//! Task handlers
//!
//! The scheduler core is name-agnostic: task bodies are looked up by name in
//! a caller-supplied [`HandlerRegistry`] at dispatch time.

pub mod builtin;
mod registry;
mod traits;

pub use builtin::{BUILTIN_TASK_NAMES, SimulatedHandler, builtin_registry};
pub use registry::HandlerRegistry;
pub use traits::{FnHandler, HandlerError, HandlerResult, TaskHandler};
