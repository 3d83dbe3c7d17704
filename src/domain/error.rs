use thiserror::Error;

/// Exit status when the report sink cannot be opened
pub const EXIT_SINK_OPEN: u8 = 1;
/// Exit status when writing the report fails part way through
pub const EXIT_SINK_WRITE: u8 = 2;
/// Exit status for every failure that happens before the report stage
pub const EXIT_OTHER: u8 = 3;

/// Error types for the hashing pipeline
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input records could not be read
    #[error("input error: {0}")]
    Input(String),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The per-record transform failed
    #[error("transform failed: {0}")]
    Transform(String),

    /// The report sink could not be opened
    #[error("couldn't open report sink: {0}")]
    SinkOpen(String),

    /// Writing to the report sink failed
    #[error("failed writing report: {0}")]
    SinkWrite(String),

    /// Spawn errors
    #[error("failed to spawn actor: {0}")]
    Spawn(String),

    /// An actor died or a mailbox was closed before the run finished
    #[error("actor system failure: {0}")]
    Actor(String),

    /// A message arrived in a state that does not accept it
    #[error("protocol violation: {0}")]
    Protocol(String)
}

impl PipelineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::SinkOpen(_) => EXIT_SINK_OPEN,
            PipelineError::SinkWrite(_) => EXIT_SINK_WRITE,
            _ => EXIT_OTHER
        }
    }
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Configuration(format!("{:#}", err))
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

/// Convert from ractor::SpawnErr
impl From<ractor::SpawnErr> for PipelineError {
    fn from(err: ractor::SpawnErr) -> Self {
        PipelineError::Spawn(err.to_string())
    }
}
