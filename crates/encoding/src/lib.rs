//! Sage's Vault encoding crate
//!
//! Holds the fixed set of proxy backends a session can be routed through and
//! the pure functions that turn a user-typed address into the address a
//! backend expects. Nothing in here touches storage or the UI.

pub mod encoder;
pub mod error;
pub mod quick_links;
pub mod registry;

pub use encoder::{encode, format_for_service, normalize, try_format_for_service, HEX_ROUTE_MARKER};
pub use error::{EncodeError, EncodeResult};
pub use quick_links::{QuickLink, QUICK_LINKS};
pub use registry::{EncodingScheme, ServiceDescriptor, ServiceRegistry, DEFAULT_SERVICE_ID};
