//! CLI configuration

use ctas_workflow::WorkflowConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Caller used when neither `--caller` nor `CTAS_CALLER` is set
    #[serde(default)]
    pub caller: Option<String>,
}

impl CliConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
