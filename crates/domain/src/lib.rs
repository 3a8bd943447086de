//! # HSDP Domain
//!
//! Resource types and wire envelopes shared by the HSDP service clients.
//!
//! This crate contains:
//! - Resource types (`ApplicationClient`, `Producer`) and their constraint
//!   tables
//! - The bundle list envelope with lazily decoded entries
//! - Query options for list endpoints
//! - Service paths and `api-version` constants
//!
//! ## Architecture
//! - Depends only on the foundation tier of `hsdp-common`
//! - No I/O; pure data structures

pub mod bundle;
pub mod constants;
pub mod macros;
pub mod options;
pub mod types;

// Re-export commonly used items
pub use bundle::{Bundle, BundleEntry};
pub use options::{GetClientsOptions, GetProducersOptions};
pub use types::*;
