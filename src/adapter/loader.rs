//! Input loading

use std::path::Path;

use crate::domain::{error::PipelineError, record::Record};

/// Read a JSON array of records from disk
pub async fn load_records(path: &Path) -> Result<Vec<Record>, PipelineError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::Input(format!("failed to read {}: {}", path.display(), e)))?;

    parse_records(&content)
}

pub fn parse_records(content: &str) -> Result<Vec<Record>, PipelineError> {
    Ok(serde_json::from_str(content)?)
}
