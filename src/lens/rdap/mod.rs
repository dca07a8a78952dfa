//! RDAP IP identification lens
//!
//! This module provides IP address identification: the registrant
//! organization or person recorded for the address in a public RDAP
//! registry, and the IP protocol version.
//!
//! # Example
//!
//! ```rust,ignore
//! use spyglass::lens::rdap::{IpIdentifyArgs, IpIdentifyFilter, RdapLens};
//!
//! let lens = RdapLens::new();
//!
//! // Combined, human-readable summary
//! let summary = lens.summary("93.184.216.34")?;
//! println!("{}", summary);
//!
//! // Registrant only, best effort
//! let args = IpIdentifyArgs::new("93.184.216.34");
//! let identity = lens.identify(&args)?;
//! println!("{:?}", identity.registrant);
//! ```

mod client;
mod entity;

pub use client::{RdapClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_THROTTLE_INTERVAL};
pub use entity::resolve_registrant;

use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SpyglassConfig;

// =============================================================================
// Errors
// =============================================================================

/// Failure modes surfaced to callers; everything else degrades to "no
/// registrant found" inside the client.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Input does not parse as an IPv4 or IPv6 address
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Terminal non-2xx answer from the registry, after retries
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
}

// =============================================================================
// Types
// =============================================================================

/// Which part of the identification to report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpIdentifyFilter {
    /// Full human-readable sentence (default)
    #[default]
    All,
    /// Registrant name only
    Registrant,
    /// IP protocol version only
    Version,
}

/// Arguments for an identify operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpIdentifyArgs {
    /// IP address to identify
    pub ip: String,

    /// Which part of the result to report
    #[serde(default)]
    pub filter: IpIdentifyFilter,
}

impl IpIdentifyArgs {
    /// Create new args for an address, reporting everything
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            filter: IpIdentifyFilter::default(),
        }
    }

    /// Set the report filter
    pub fn with_filter(mut self, filter: IpIdentifyFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Identification result for a single address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpIdentity {
    /// The canonical address
    pub ip: IpAddr,
    /// IP protocol version, 4 or 6
    pub version: u8,
    /// Registrant name, if the registry knows one
    pub registrant: Option<String>,
}

// =============================================================================
// Free functions
// =============================================================================

/// Parse an address string, mapping failure to [`IdentifyError::InvalidAddress`].
pub fn parse_ip(ip: &str) -> Result<IpAddr, IdentifyError> {
    IpAddr::from_str(ip).map_err(|_| IdentifyError::InvalidAddress(ip.to_string()))
}

/// IP protocol version (4 or 6) of an address.
pub fn ip_version(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 6,
    }
}

// =============================================================================
// Lens
// =============================================================================

/// IP identification lens
///
/// Wraps an [`RdapClient`] and pairs the lookup operations with output
/// formatting. Reuse one lens across lookups so the request throttle applies
/// process-wide.
pub struct RdapLens {
    client: RdapClient,
}

impl RdapLens {
    /// Create a lens with the default ARIN client.
    pub fn new() -> Self {
        Self {
            client: RdapClient::new(),
        }
    }

    /// Create a lens from configuration.
    pub fn with_config(config: &SpyglassConfig) -> Self {
        Self {
            client: RdapClient::from_config(config),
        }
    }

    /// Create a lens around an existing client.
    pub fn with_client(client: RdapClient) -> Self {
        Self { client }
    }

    /// Registrant name for an address, best effort: transport noise and
    /// registry errors degrade to `Ok(None)`.
    pub fn registrant(&self, ip: &str) -> Result<Option<String>, IdentifyError> {
        let addr = parse_ip(ip)?;
        Ok(self.client.lookup_registrant(&addr.to_string()))
    }

    /// IP protocol version for a textual address. No network I/O.
    pub fn version(&self, ip: &str) -> Result<u8, IdentifyError> {
        Ok(ip_version(&parse_ip(ip)?))
    }

    /// Identify an address per the args' filter.
    ///
    /// The version-only filter skips the registry lookup entirely. The full
    /// filter surfaces a terminal HTTP failure as [`IdentifyError::Http`];
    /// the registrant-only filter degrades it to `None` instead.
    pub fn identify(&self, args: &IpIdentifyArgs) -> Result<IpIdentity, IdentifyError> {
        let addr = parse_ip(&args.ip)?;
        let registrant = match args.filter {
            IpIdentifyFilter::Version => None,
            IpIdentifyFilter::Registrant => self.client.lookup_registrant(&addr.to_string()),
            IpIdentifyFilter::All => self.client.fetch_registrant(&addr.to_string())?,
        };
        Ok(IpIdentity {
            ip: addr,
            version: ip_version(&addr),
            registrant,
        })
    }

    /// Combined human-readable summary for an address.
    pub fn summary(&self, ip: &str) -> Result<String, IdentifyError> {
        let identity = self.identify(&IpIdentifyArgs::new(ip))?;
        Ok(self.format_result(&identity, &IpIdentifyFilter::All))
    }

    /// Render an identity per the filter.
    pub fn format_result(&self, identity: &IpIdentity, filter: &IpIdentifyFilter) -> String {
        match filter {
            IpIdentifyFilter::Registrant => match &identity.registrant {
                Some(name) => name.clone(),
                None => format!("registrant not found for IP Address {}", identity.ip),
            },
            IpIdentifyFilter::Version => identity.version.to_string(),
            IpIdentifyFilter::All => format!(
                "{} is an IPv{} IP Address Registered by '{}'.",
                identity.ip,
                identity.version,
                identity.registrant.as_deref().unwrap_or("None")
            ),
        }
    }
}

impl Default for RdapLens {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
