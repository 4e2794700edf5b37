use thiserror::Error;

/// Failures while writing or reading the persisted flask-state record.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("unsupported flask state version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("host refused to open record {label:#010x}")]
    RecordRefused { label: u32 },
}

/// Failures while reading or generating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}
