//! Parser and query defaults loaded from TOML.
//!
//! Every value is checked while deserializing: the language must name a
//! bundled grammar and the match limit must be positive. A loaded
//! [`BridgeConfig`] is therefore always usable as-is.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{BridgeConfig, QuerySettings};
