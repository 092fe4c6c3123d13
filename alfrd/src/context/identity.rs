//! Run identity for tracking pipeline executions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifies a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,
    /// The project the run belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            project: None,
            started_at: Utc::now(),
        }
    }

    /// Sets the project name.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Converts to a dictionary with string values (or null).
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("run_id".to_string(), serde_json::json!(self.run_id.to_string()));
        map.insert(
            "project".to_string(),
            self.project
                .as_ref()
                .map_or(serde_json::Value::Null, |p| serde_json::json!(p)),
        );
        map.insert(
            "started_at".to_string(),
            serde_json::json!(self.started_at.to_rfc3339()),
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(RunIdentity::new().run_id, RunIdentity::new().run_id);
    }

    #[test]
    fn test_to_dict() {
        let id = RunIdentity::new().with_project("vlbi");
        let dict = id.to_dict();

        assert_eq!(dict.get("project"), Some(&serde_json::json!("vlbi")));
        assert!(dict.contains_key("run_id"));

        let dict = RunIdentity::new().to_dict();
        assert_eq!(dict.get("project"), Some(&serde_json::Value::Null));
    }
}
