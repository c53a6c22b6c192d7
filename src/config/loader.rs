use crate::config::schema::BridgeConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config{}: {source}", origin(.path))]
    Invalid {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

pub fn load_from_str(input: &str) -> Result<BridgeConfig, ConfigError> {
    toml_edit::de::from_str(input).map_err(|source| ConfigError::Invalid { path: None, source })
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<BridgeConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml_edit::de::from_str(&contents).map_err(|source| ConfigError::Invalid {
        path: Some(path.to_path_buf()),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded bridge config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoding;
    use crate::lang::Language;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load_from_str("language = \"javascript\"").unwrap();
        assert_eq!(config.language, Language::JAVASCRIPT);
        assert_eq!(config.encoding, Encoding::Utf8);
        assert_eq!(config.query.match_limit, None);
    }

    #[test]
    fn full_config() {
        let config = load_from_str(
            r#"
language = "py"
encoding = "utf-16"

[query]
match_limit = 16
"#,
        )
        .unwrap();
        assert_eq!(config.language, Language::PYTHON);
        assert_eq!(config.encoding, Encoding::Utf16);
        assert_eq!(config.query.match_limit.map(|n| n.get()), Some(16));
    }

    #[test]
    fn unknown_language_names_the_value() {
        let err = load_from_str("language = \"klingon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { path: None, .. }));
        assert!(err.to_string().contains("klingon"), "{err}");
    }

    #[test]
    fn zero_match_limit_is_rejected() {
        let err = load_from_str("language = \"rust\"\n[query]\nmatch_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn missing_language_is_rejected() {
        assert!(load_from_str("encoding = \"utf-8\"").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = load_from_str("language = \"rust\"\ntimeout = 5").unwrap_err();
        assert!(err.to_string().starts_with("invalid config: "));
    }
}
