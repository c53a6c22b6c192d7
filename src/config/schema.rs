use crate::codec::Encoding;
use crate::lang::Language;
use serde::Deserialize;
use std::num::NonZeroU32;

/// Parser and query defaults:
///
/// ```toml
/// language = "javascript"
/// encoding = "utf-16"
///
/// [query]
/// match_limit = 64
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Grammar name or alias, resolved on load.
    pub language: Language,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default)]
    pub query: QuerySettings,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QuerySettings {
    /// Maximum number of in-progress matches per query cursor.
    pub match_limit: Option<NonZeroU32>,
}
