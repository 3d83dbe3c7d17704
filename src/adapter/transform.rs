//! Transform implementations

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};

use crate::{
    domain::{error::PipelineError, record::Record},
    port::transform::Transform
};

/// Base64 of the password followed by `passes + salt`, without `=` padding
#[derive(Debug, Clone, Default)]
pub struct Base64Transform {
    delay: Option<Duration>
}

impl Base64Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before every transform to simulate an expensive hash
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }
}

#[async_trait]
impl Transform for Base64Transform {
    async fn transform(&self, record: &Record) -> Result<String, PipelineError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let total = record.passes.checked_add(record.salt).ok_or_else(|| {
            PipelineError::Transform(format!("passes + salt overflows for '{}'", record.password))
        })?;

        Ok(STANDARD_NO_PAD.encode(format!("{}{}", record.password, total)))
    }
}
