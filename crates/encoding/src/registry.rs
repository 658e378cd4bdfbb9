//! Proxy service registry
//!
//! The registry is built once at startup and never mutated afterwards. Every
//! service id that reaches the state store or the session manager is checked
//! against it first.

use std::fmt;
use std::sync::Arc;
use serde::{Serialize, Deserialize};

use crate::error::{EncodeError, EncodeResult};

/// Id of the service used when nothing else has been chosen
pub const DEFAULT_SERVICE_ID: &str = "ultraviolet";

/// Transform applied to a normalized address before it is appended to a
/// service's base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingScheme {
    /// Standard base64 of the whole address
    Base64,
    /// Lowercase hex of every character after the scheme prefix
    Hex,
    /// Percent-encoding of the whole address
    Direct,
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingScheme::Base64 => write!(f, "base64"),
            EncodingScheme::Hex => write!(f, "hex"),
            EncodingScheme::Direct => write!(f, "direct"),
        }
    }
}

/// A third-party backend that relays traffic to an encoded address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Stable identifier, also the persisted value of the active service
    pub id: String,
    /// Name shown to the user
    pub display_name: String,
    /// Prefix the encoded address is appended to
    pub base_url: String,
    /// How the address is encoded for this backend
    pub encoding: EncodingScheme,
    /// Whether the UI should suggest this service first
    pub is_recommended: bool,
    /// Short description for the service picker
    pub description: String,
}

impl ServiceDescriptor {
    fn builtin(
        id: &str,
        display_name: &str,
        base_url: &str,
        encoding: EncodingScheme,
        is_recommended: bool,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            base_url: base_url.to_string(),
            encoding,
            is_recommended,
            description: description.to_string(),
        }
    }
}

/// Read-only lookup table of supported services.
///
/// Cloning is cheap; all clones share the same descriptor list.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Arc<[ServiceDescriptor]>,
    default_index: usize,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ServiceRegistry {
    /// Build a registry from an explicit service list.
    ///
    /// Fails if `default_id` is not one of the listed services.
    pub fn new(services: Vec<ServiceDescriptor>, default_id: &str) -> EncodeResult<Self> {
        let default_index = services
            .iter()
            .position(|s| s.id == default_id)
            .ok_or_else(|| EncodeError::UnknownService(default_id.to_string()))?;

        Ok(Self {
            services: services.into(),
            default_index,
        })
    }

    /// The four backends Sage's Vault ships with
    pub fn builtin() -> Self {
        let services = vec![
            ServiceDescriptor::builtin(
                "ultraviolet",
                "Ultraviolet",
                "https://uv.holyubofficial.net/service/",
                EncodingScheme::Base64,
                true,
                "Fast and reliable proxy service",
            ),
            ServiceDescriptor::builtin(
                "womginx",
                "Womginx",
                "https://www.womginx.com/main/",
                EncodingScheme::Direct,
                false,
                "Alternative proxy with good compatibility",
            ),
            ServiceDescriptor::builtin(
                "rammerhead",
                "Rammerhead",
                "https://rammerhead.org/service/",
                EncodingScheme::Hex,
                false,
                "Advanced proxy with session support",
            ),
            ServiceDescriptor::builtin(
                "nebula",
                "Nebula",
                "https://nebula.bio/service/",
                EncodingScheme::Base64,
                false,
                "Secure proxy with encryption",
            ),
        ];

        Self {
            services: services.into(),
            default_index: 0,
        }
    }

    /// Find a service by id
    pub fn lookup(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Like [`lookup`](Self::lookup) but reports unknown ids as an error
    pub fn require(&self, id: &str) -> EncodeResult<&ServiceDescriptor> {
        self.lookup(id)
            .ok_or_else(|| EncodeError::UnknownService(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// Service used when no valid choice has been persisted
    pub fn default_service(&self) -> &ServiceDescriptor {
        &self.services[self.default_index]
    }

    /// Services flagged as recommended, in registry order
    pub fn recommended(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter().filter(|s| s.is_recommended)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
