// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for CelestialLens
//!
//! Handles loading and saving settings from ~/.celestial-lens/settings.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{LensError, Result};
use crate::llm::provider::InferenceRequestConfig;
use crate::llm::providers::gemini::GEMINI_API_URL;
use crate::prompt::catalog::Catalog;
use crate::prompt::variables::DEFAULT_NOT_PROVIDED_MARKER;

mod io;
mod validation;

/// Main settings structure, stored in ~/.celestial-lens/settings.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Remote service configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Named deployment profiles
    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, InferenceRequestConfig>,

    /// Defaults for new analyses
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL for API (for custom endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Defaults applied when the user does not say otherwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Profile used when none is requested
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Text substituted for variables left empty
    #[serde(default = "default_not_provided_marker")]
    pub not_provided_marker: String,

    /// Optional TOML catalog replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_profile() -> String {
    "deep".to_string()
}

fn default_not_provided_marker() -> String {
    DEFAULT_NOT_PROVIDED_MARKER.to_string()
}

fn default_profiles() -> BTreeMap<String, InferenceRequestConfig> {
    BTreeMap::from([
        ("deep".to_string(), InferenceRequestConfig::deep()),
        ("fast".to_string(), InferenceRequestConfig::fast()),
    ])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            profiles: default_profiles(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            not_provided_marker: default_not_provided_marker(),
            catalog_path: None,
        }
    }
}

impl Settings {
    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&InferenceRequestConfig> {
        self.profiles.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
            LensError::Config(format!(
                "unknown profile '{}' (available: {})",
                name,
                known.join(", ")
            ))
        })
    }

    /// The profile named by `defaults.profile`
    pub fn default_profile(&self) -> Result<&InferenceRequestConfig> {
        self.profile(&self.defaults.profile)
    }

    /// The configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.defaults.catalog_path {
            Some(path) => Catalog::load_from(path),
            None => Ok(Catalog::builtin()),
        }
    }
}
