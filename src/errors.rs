use thiserror::Error;

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Decision model error: {0}")]
    Decision(String),

    #[error("Chat completion error: {0}")]
    Chat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type PilotResult<T> = Result<T, PilotError>;
