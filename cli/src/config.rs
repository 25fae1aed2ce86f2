use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use htmlpp::{NavTemplate, Severity};
use serde::{Deserialize, Deserializer};

/// Settings read from `--config <file>`. Command-line options win over
/// everything here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Severity threshold, `light`, `serious` or `critical`.
    #[serde(default, deserialize_with = "severity")]
    pub exit_on: Option<Severity>,

    /// Variables seeded before processing.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    #[serde(default)]
    pub sidebar: SidebarConfig,
}

/// Overrides for the sidebar markup. Unset parts keep the built-in markup.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarConfig {
    pub frame: Option<String>,
    pub link: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SidebarConfig {
    pub fn template(&self) -> NavTemplate {
        let mut template = NavTemplate::default();
        if let Some(frame) = &self.frame {
            template.frame = frame.clone();
        }
        if let Some(link) = &self.link {
            template.link = link.clone();
        }
        if let Some(section) = &self.section {
            template.section = section.clone();
        }
        template
    }
}

pub(crate) fn severity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Severity>, D::Error> {
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    text.parse().map(Some).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r##"
exit_on = "critical"

[vars]
lang = "en"
title = "Home"

[sidebar]
link = "<a href=\"#link\">#name</a>"
"##,
        )
        .unwrap();
        assert_eq!(config.exit_on, Some(Severity::Critical));
        assert_eq!(config.vars["lang"], "en");
        assert_eq!(config.vars.len(), 2);

        let template = config.sidebar.template();
        assert_eq!(template.link, "<a href=\"#link\">#name</a>");
        assert_eq!(template.frame, NavTemplate::default().frame);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.exit_on, None);
        assert!(config.vars.is_empty());
        assert_eq!(config.sidebar.template(), NavTemplate::default());
    }

    #[test]
    fn rejects_unknown_severity() {
        let err = toml::from_str::<Config>("exit_on = \"fatal\"").unwrap_err();
        assert!(err.to_string().contains("fatal"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<Config>("exit-on = \"light\"").is_err());
    }
}
