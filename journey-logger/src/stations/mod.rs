//! Static station registry.
//!
//! The ordered station list is read once at startup from a JSON file and is
//! read-only afterwards. Order matters: it decides geo-matching tie-breaks.

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::StationRegistry;
