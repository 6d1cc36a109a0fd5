//! Task ID generation
//!
//! All IDs use the format: `task-{seq}-{6-char-hex}`
//! Example: `task-42-7f3a9c`

use serde::{Deserialize, Serialize};

/// Generate a task ID from a submission sequence number
pub fn generate_id(seq: u64) -> String {
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    // The tail of a v7 UUID is random; the head is the timestamp
    let hex_suffix = &uuid[uuid.len() - 6..];
    format!("task-{}-{}", seq, hex_suffix)
}

/// Task ID wrapper for type-safe ID handling
///
/// Assigned once at submission and never changed, including across retries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID for the given submission sequence
    pub fn new(seq: u64) -> Self {
        Self(generate_id(seq))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id(7);
        assert!(id.starts_with("task-7-"));
        assert_eq!(id.len(), "task-7-".len() + 6);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = TaskId::new(1);
        let b = TaskId::new(2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_is_plain_string() {
        let id = TaskId::from("task-3-abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"task-3-abc123\"");

        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
