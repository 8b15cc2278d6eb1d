use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid record: {reason}")]
    InvalidRecord { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Snapshot fetch failed: {0}")]
    Fetch(String),

    #[error("Actuator command for pin {pin} failed: {reason}")]
    Actuator { pin: u8, reason: String },

    #[error("Publish to topic '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
