use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed rule data at {location}: {reason}")]
    MalformedRuleData { location: String, reason: String },

    #[error("Duplicate rule: tag={tag:?} suffix={suffix:?}")]
    DuplicateRule { tag: String, suffix: String },

    #[error("Malformed input record at line {line}: {content:?}")]
    MalformedInputRecord { line: usize, content: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedRuleData {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
