/// Convenience result type used across the animator.
pub type AnimatorResult<T> = Result<T, AnimatorError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Cancellation is not represented here: a cancelled job ends in a normal terminal state, see
/// [`crate::JobState::Cancelled`].
#[derive(thiserror::Error, Debug)]
pub enum AnimatorError {
    /// Rejected input (non-positive rate, unsupported blur type, ...). Raised before any job starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A page raster could not be obtained from the occurrence feed.
    #[error("source read failure: {0}")]
    SourceRead(String),

    /// The video container or codec failed while writing.
    #[error("encoding failure: {0}")]
    Encoding(String),

    /// Internal pipeline failures (worker threads, channels, buffer invariants).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimatorError {
    /// Build an [`AnimatorError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build an [`AnimatorError::SourceRead`] value.
    pub fn source_read(msg: impl Into<String>) -> Self {
        Self::SourceRead(msg.into())
    }

    /// Build an [`AnimatorError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build an [`AnimatorError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Copy of this error suitable for handing to a second observer (job report + caller).
    ///
    /// `Other` loses its source chain and keeps only the rendered message.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::InvalidConfiguration(m) => Self::InvalidConfiguration(m.clone()),
            Self::SourceRead(m) => Self::SourceRead(m.clone()),
            Self::Encoding(m) => Self::Encoding(m.clone()),
            Self::Evaluation(m) => Self::Evaluation(m.clone()),
            Self::Other(e) => Self::Other(anyhow::anyhow!("{e:#}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
