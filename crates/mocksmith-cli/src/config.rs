use std::path::{Path, PathBuf};

use mocksmith_core::{Locale, MockConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "mocksmith.toml";

/// Contents of `mocksmith.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mock: MockConfig,
    pub render: RenderDefaults,
}

/// Defaults for the `render` and `introspect` output flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RenderDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub locale: Option<Locale>,
    pub pretty: bool,
}

/// Reads `explicit` when given, otherwise `mocksmith.toml` if present.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(FileConfig::default());
            }
            fallback
        }
    };
    let content = std::fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<FileConfig, CliError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = parse_config(
            r#"
            [mock]
            max_depth = 2
            locale = "zh_CN"

            [render]
            count = 4
            pretty = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.mock.max_depth, 2);
        assert_eq!(config.mock.max_collection_size, MockConfig::default().max_collection_size);
        assert_eq!(config.mock.locale, Some(Locale::zh_cn()));
        assert_eq!(config.render.count, Some(4));
        assert!(config.render.pretty);
        assert_eq!(config.render.seed, None);
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(matches!(
            parse_config("[output]\nformat = \"csv\"\n"),
            Err(CliError::Config(_))
        ));
        assert!(parse_config("[render]\nlocale = \"not a locale\"\n").is_err());
    }

    #[test]
    fn explicit_paths_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(CliError::Io { .. })
        ));

        let present = dir.path().join("mocksmith.toml");
        std::fs::write(&present, "[render]\nseed = 9\n").expect("write");
        let config = load_config(Some(&present)).expect("load");
        assert_eq!(config.render.seed, Some(9));
    }
}
