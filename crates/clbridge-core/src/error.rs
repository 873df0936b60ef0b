#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("native library not found: {0}")]
    LibraryNotFound(String),

    #[error("missing required symbol: {0}")]
    MissingSymbol(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
