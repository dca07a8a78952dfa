//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine business
//! logic with output formatting. Lenses are designed to be reusable across
//! different interfaces (CLI, library embedding).
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `RdapLens`) - the main entry point for all operations
//! - **Args structs** - input arguments for lens methods
//! - **Output types** - return types and filter enums
//!
//! Internal implementation details (HTTP client plumbing, jCard parsing) are
//! kept private within each lens module. External users should only interact
//! through the lens.
//!
//! # Usage
//!
//! ```rust,ignore
//! use spyglass::lens::rdap::{IpIdentifyArgs, IpIdentifyFilter, RdapLens};
//!
//! let lens = RdapLens::new();
//! let identity = lens.identify(&IpIdentifyArgs::new("93.184.216.34"))?;
//! println!("{}", lens.format_result(&identity, &IpIdentifyFilter::All));
//! ```

// RdapLens - IP registrant and protocol-version identification
pub mod rdap;
