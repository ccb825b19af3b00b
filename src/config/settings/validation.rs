// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{LensError, Result};

use super::Settings;

/// Generic fallback variable consulted after the configured one
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

impl Settings {
    /// Get the API key.
    /// Priority: configured env var > `API_KEY` > config file.
    pub fn get_api_key(&self) -> Option<String> {
        [self.provider.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .or_else(|| self.provider.api_key.clone())
    }

    /// Check ranges and cross references.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(LensError::Config("no profiles configured".to_string()));
        }

        for (name, profile) in &self.profiles {
            if profile.model.trim().is_empty() {
                return Err(LensError::Config(format!(
                    "profile '{}' has an empty model",
                    name
                )));
            }
            if !(0.0..=1.0).contains(&profile.temperature) {
                return Err(LensError::Config(format!(
                    "profile '{}': temperature {} is outside 0..=1",
                    name, profile.temperature
                )));
            }
            if !(0.0..=1.0).contains(&profile.top_p) {
                return Err(LensError::Config(format!(
                    "profile '{}': top_p {} is outside 0..=1",
                    name, profile.top_p
                )));
            }
        }

        self.default_profile()?;

        if self.defaults.not_provided_marker.trim().is_empty() {
            return Err(LensError::Config(
                "not_provided_marker must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::InferenceRequestConfig;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut settings = Settings::default();
        settings.profiles.insert(
            "hot".to_string(),
            InferenceRequestConfig::new("m").with_temperature(1.5),
        );
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_top_p_out_of_range() {
        let mut settings = Settings::default();
        settings.profiles.insert(
            "wide".to_string(),
            InferenceRequestConfig::new("m").with_top_p(-0.1),
        );
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut settings = Settings::default();
        settings
            .profiles
            .insert("blank".to_string(), InferenceRequestConfig::new(" "));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_default_profile() {
        let mut settings = Settings::default();
        settings.defaults.profile = "nope".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_marker_rejected() {
        let mut settings = Settings::default();
        settings.defaults.not_provided_marker = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_api_key_priority() {
        // A unique env var name avoids cross-test pollution.
        let mut settings = Settings::default();
        settings.provider.api_key_env = "CELESTIAL_TEST_API_KEY_31337".to_string();
        settings.provider.api_key = Some("config-key".to_string());

        std::env::set_var("CELESTIAL_TEST_API_KEY_31337", "env-key");
        assert_eq!(settings.get_api_key(), Some("env-key".to_string()));

        std::env::set_var("CELESTIAL_TEST_API_KEY_31337", "  ");
        let fallback = std::env::var(FALLBACK_API_KEY_ENV).ok();
        if fallback.as_deref().map(str::trim).unwrap_or("").is_empty() {
            assert_eq!(settings.get_api_key(), Some("config-key".to_string()));
        }

        std::env::remove_var("CELESTIAL_TEST_API_KEY_31337");
    }
}
