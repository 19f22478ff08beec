use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ContextError {
    #[error("request context requires a request")]
    MissingRequest,
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("configuration already initialized")]
    AlreadySet,
}

#[derive(Debug, ThisError)]
pub enum CompressionError {
    #[error("body compression failed")]
    Io(#[from] std::io::Error),
}
