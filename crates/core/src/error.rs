/// Result alias that carries the custom [`WorkoutError`] type.
pub type Result<T> = std::result::Result<T, WorkoutError>;

/// Common error type for the workout crates.
///
/// The session controller itself never fails: invalid user actions are
/// ignored. These variants cover the edges around it such as loading
/// configuration or parsing exercises typed on the command line.
#[derive(Debug, thiserror::Error)]
pub enum WorkoutError {
    /// Free-form message for failures that do not fit a narrower variant.
    #[error("{0}")]
    Message(String),
    /// Configuration values that violate the duration or timer bounds.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An exercise description that could not be turned into a catalog entry.
    #[error("invalid exercise: {0}")]
    InvalidExercise(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON configuration.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl WorkoutError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for WorkoutError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WorkoutError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
