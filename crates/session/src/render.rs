//! Render-target ports
//!
//! The embedded frame and the detached-window opener are owned by the host.
//! Both may be refused by the environment; refusals come back as
//! [`RenderError`] values, never panics.

use thiserror::Error;

use crate::document::DetachedDocument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Navigation history is not accessible from this frame")]
    HistoryUnavailable,

    #[error("Popup blocked by the host")]
    PopupBlocked,

    #[error("Render target rejected {address}: {reason}")]
    Rejected { address: String, reason: String },
}

/// Embedded content surface addressed like an iframe `src`
pub trait RenderTarget {
    fn navigate(&mut self, address: &str) -> Result<(), RenderError>;

    /// Blank the surface
    fn clear(&mut self);

    /// Step the surface's own history back. Surfaces that cannot introspect
    /// their content keep the default.
    fn go_back(&mut self) -> Result<(), RenderError> {
        Err(RenderError::HistoryUnavailable)
    }

    fn go_forward(&mut self) -> Result<(), RenderError> {
        Err(RenderError::HistoryUnavailable)
    }
}

/// Creates a new top-level browsing context showing `document`
pub trait WindowOpener {
    fn open(&mut self, document: &DetachedDocument<'_>) -> Result<(), RenderError>;
}
