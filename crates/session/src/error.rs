//! Session errors
//!
//! None of these are fatal. Each failed operation leaves the session either
//! unchanged or back in the idle phase.

use thiserror::Error;
use vault_encoding::EncodeError;
use vault_state::StateError;

use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No URL provided")]
    EmptyUrl,

    #[error("No page is loaded")]
    NoActiveSession,

    #[error("Unknown proxy service: {0}")]
    UnknownService(String),

    #[error("Unknown quick link: {0}")]
    UnknownQuickLink(String),

    #[error("Popup blocked by the host")]
    PopupBlocked,

    #[error("Render error: {0}")]
    Dispatch(#[from] RenderError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl From<EncodeError> for SessionError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnknownService(id) => SessionError::UnknownService(id),
        }
    }
}

/// Broad classes of failure, used to pick how loudly to report them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or empty user input
    Input,
    /// A service id that is not in the registry
    UnknownService,
    /// Storage read or write failure
    Persistence,
    /// The host refused: popup blocked, cross-origin history, ...
    Environment,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::EmptyUrl
            | SessionError::NoActiveSession
            | SessionError::UnknownQuickLink(_)
            | SessionError::State(StateError::InvalidSettings(_)) => ErrorKind::Input,
            SessionError::UnknownService(_)
            | SessionError::State(StateError::UnknownService(_)) => ErrorKind::UnknownService,
            SessionError::State(StateError::Storage(_)) => ErrorKind::Persistence,
            SessionError::PopupBlocked | SessionError::Dispatch(_) => ErrorKind::Environment,
        }
    }

    pub fn is_unknown_service(&self) -> bool {
        self.kind() == ErrorKind::UnknownService
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
