/// Errors produced by the client core.
///
/// None of them is retried automatically. The message of every variant is meant to be shown to
/// the user as is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The user input was rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The request could not be performed.
    #[error("Network error occurred: {0}")]
    Transport(String),

    /// The server answered with a non-successful status, or with a body that could not be
    /// decoded.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A quality gate could not be passed: the ad failed to load or was rejected, or the tier
    /// requires premium access.
    #[error("{0}")]
    Gate(String),
}

/// Where an error is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Replaces the current section, halting the flow
    Blocking,
    /// Transient notification, the current view is preserved
    Toast,
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<crate::transport::TransportError> for Error {
    fn from(value: crate::transport::TransportError) -> Self {
        Self::Transport(value.0)
    }
}
