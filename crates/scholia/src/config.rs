//! Configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::compose::{ComposeOptions, UnknownTagPolicy};
use crate::Result;

/// Which set of fixed document labels to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelSet {
    /// Portuguese labels, matching the generated content.
    #[default]
    Portuguese,
    /// English labels.
    English,
}

/// Fixed strings written around the generated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLabels {
    /// Heading of the trailing sources section.
    pub sources_heading: EcoString,
    /// Label of the material type in the subtitle line.
    pub type_label: EcoString,
    /// Label of the education level in the subtitle line.
    pub level_label: EcoString,
}

impl ExportLabels {
    /// The Portuguese labels.
    pub fn portuguese() -> Self {
        Self {
            sources_heading: "FONTES VISITADAS (LINKS ORIGINAIS)".into(),
            type_label: "Tipo".into(),
            level_label: "Nível".into(),
        }
    }

    /// The English labels.
    pub fn english() -> Self {
        Self {
            sources_heading: "SOURCES CONSULTED (ORIGINAL LINKS)".into(),
            type_label: "Type".into(),
            level_label: "Level".into(),
        }
    }
}

impl Default for ExportLabels {
    fn default() -> Self {
        Self::portuguese()
    }
}

impl From<LabelSet> for ExportLabels {
    fn from(set: LabelSet) -> Self {
        match set {
            LabelSet::Portuguese => Self::portuguese(),
            LabelSet::English => Self::english(),
        }
    }
}

/// The `scholia.toml` configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory of the key-value store holding accounts and history.
    pub store_dir: Option<PathBuf>,
    /// Label set for exported documents.
    pub labels: LabelSet,
    /// What to do with unknown top-level elements on export.
    pub unknown_tags: UnknownTagPolicy,
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        Self::from_toml(&text)
    }

    /// The store directory, defaulting to the platform data directory.
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("scholia"))
            .ok_or_else(|| "cannot determine a data directory, set `store-dir`".into())
    }

    /// Options for the composer derived from this configuration.
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            unknown_tags: self.unknown_tags,
            labels: self.labels.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.compose_options(), ComposeOptions::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = Config::from_toml(
            r#"
store-dir = "/tmp/scholia"
labels = "english"
unknown-tags = "keep-text"
"#,
        )
        .unwrap();
        assert_eq!(config.store_dir().unwrap(), PathBuf::from("/tmp/scholia"));
        let options = config.compose_options();
        assert_eq!(options.unknown_tags, UnknownTagPolicy::KeepText);
        assert_eq!(options.labels, ExportLabels::english());
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_toml(r#"unknown-tags = "explode""#).unwrap_err();
        assert!(err.to_string().starts_with("invalid config"));
    }
}
