//! Workflow configuration

use ctas_core::RequestId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the approval workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Id given to the first request; later ids follow by +1
    #[serde(default = "default_first_request_id")]
    pub first_request_id: u64,
}

fn default_first_request_id() -> u64 {
    1
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            first_request_id: default_first_request_id(),
        }
    }
}

impl WorkflowConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn first_request_id(&self) -> RequestId {
        RequestId::new(self.first_request_id)
    }
}
