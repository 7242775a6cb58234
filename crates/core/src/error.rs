/// Result alias that carries the custom [`KenkoError`] type.
pub type Result<T> = std::result::Result<T, KenkoError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum KenkoError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// A caller handed in a value outside the accepted range.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An exercise broke one of the catalog invariants. Raised when a catalog
    /// is built or a session is started, never mid-playback.
    #[error("exercise `{id}` is malformed: {reason}")]
    InvalidExercise { id: String, reason: String },
    /// No exercise with the requested id exists in the catalog.
    #[error("unknown exercise `{0}`")]
    UnknownExercise(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Catalog or configuration JSON could not be parsed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl KenkoError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_exercise(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExercise {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for KenkoError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for KenkoError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
