use fieldbind_api::error::BindError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Unreadable or malformed configuration. The message names the file
    /// when one was involved.
    #[error("config error: {0}")]
    Config(String),

    #[error("bind error: {0}")]
    Bind(#[from] BindError),

    #[error("shape not found: {0}")]
    ShapeNotFound(String),
}
