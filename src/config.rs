// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Inspector configuration, read from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::inspector::{BuildOptions, RowLabels};
use crate::live::{HtmlOptions, LiveTreeAdapter};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "DOMSCOPE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorConfig {
    pub text_label: String,
    pub document_label: String,
    /// Ids of elements whose subtrees are never mirrored.
    pub excluded_ids: Vec<String>,
    pub keep_whitespace_text: bool,
    pub live_viewport_rows: usize,
    pub screen_viewport_rows: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            text_label: "#text".to_owned(),
            document_label: "#document".to_owned(),
            excluded_ids: vec!["domscope-panel".to_owned()],
            keep_whitespace_text: false,
            live_viewport_rows: 40,
            screen_viewport_rows: 40,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config {path}: {field} must be at least 1")]
    ZeroViewport { path: PathBuf, field: &'static str },
}

impl InspectorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for (field, rows) in [
            ("live_viewport_rows", config.live_viewport_rows),
            ("screen_viewport_rows", config.screen_viewport_rows),
        ] {
            if rows == 0 {
                return Err(ConfigError::ZeroViewport {
                    path: path.to_path_buf(),
                    field,
                });
            }
        }
        Ok(config)
    }

    /// Loads `explicit`, else the file named by [`CONFIG_ENV_VAR`], else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            keep_whitespace_text: self.keep_whitespace_text,
        }
    }

    /// Build options for `live`. Excluded ids that match no element are ignored.
    pub fn build_options<L: LiveTreeAdapter + ?Sized>(&self, live: &L) -> BuildOptions {
        BuildOptions {
            labels: RowLabels {
                text: self.text_label.clone(),
                document: self.document_label.clone(),
            },
            excluded: self
                .excluded_ids
                .iter()
                .filter_map(|id| live.find_element_by_id(id))
                .collect(),
        }
    }
}
