// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use regex::Regex;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/datadog-agent/conf.d/io.d/conf.yaml";
pub const CONFIG_PATH_ENV: &str = "DD_COUNTERS_CONFIG";

/// Instance configuration of the I/O check.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IoCheckConfig {
    /// Devices whose name matches are not reported.
    #[serde(default)]
    pub device_blacklist_re: Option<String>,
    #[serde(default)]
    pub lowercase_device_tag: bool,
}

impl IoCheckConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document is a valid, default configuration.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).context("parsing io check configuration")
    }

    pub fn blacklist(&self) -> Result<Option<Regex>> {
        self.device_blacklist_re
            .as_deref()
            .filter(|re| !re.is_empty())
            .map(|re| Regex::new(re).with_context(|| format!("invalid device_blacklist_re {re:?}")))
            .transpose()
    }
}

pub fn config_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the configuration at `path`, falling back to defaults when the file
/// doesn't exist.
pub fn load_config(path: &Path) -> Result<IoCheckConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}. Using defaults.",
            path.display()
        );
        return Ok(IoCheckConfig::default());
    }

    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    IoCheckConfig::from_yaml(&contents).with_context(|| format!("parsing {}", path.display()))
}
