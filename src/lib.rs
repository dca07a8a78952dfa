#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Spyglass - an IP identification toolkit
//!
//! Spyglass resolves an IP address to its registration metadata via RDAP
//! (Registration Data Access Protocol): the registrant organization or
//! person recorded for the address, plus the IP protocol version. It can be
//! used as both a command-line application and a library.
//!
//! The client throttles and retries against rate-limited registries, and the
//! jCard contact extraction tolerates the malformed shapes real registries
//! produce; lookups are best-effort and degrade to "no registrant found"
//! rather than failing.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | Command-line binary (default) | `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only, without the CLI binary
//! spyglass = { version = "0.2", default-features = false }
//! ```
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - **[`lens`]**: the RDAP identification lens (client, jCard resolution,
//!   output formatting)
//! - **[`config`]**: configuration file and environment handling
//!
//! # Example
//!
//! ```rust,ignore
//! use spyglass::{IpIdentifyArgs, IpIdentifyFilter, RdapLens};
//!
//! let lens = RdapLens::new();
//!
//! // Full sentence: "93.184.216.34 is an IPv4 IP Address Registered by '...'."
//! println!("{}", lens.summary("93.184.216.34")?);
//!
//! // Registrant only, best effort
//! let registrant = lens.registrant("93.184.216.34")?;
//!
//! // Version only, no network I/O
//! assert_eq!(lens.version("2001:db8::1")?, 6);
//! ```

pub mod config;
pub mod lens;

// Re-export the common entry points at the crate root
pub use crate::config::SpyglassConfig;
pub use crate::lens::rdap::{
    ip_version, parse_ip, resolve_registrant, IdentifyError, IpIdentifyArgs, IpIdentifyFilter,
    IpIdentity, RdapClient, RdapLens, DEFAULT_BASE_URL,
};
