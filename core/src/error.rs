use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Officer '{officer_id}' has no raw metrics for this cycle")]
    MissingRawMetrics { officer_id: String },

    #[error("Officer '{officer_id}' not found")]
    OfficerNotFound { officer_id: String },

    #[error("Invalid metrics config: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
