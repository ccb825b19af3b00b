// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use tempfile::TempDir;

use celestial_lens::config::Settings;
use celestial_lens::error::LensError;
use celestial_lens::llm::factory::ProviderFactory;

#[test]
fn test_settings_file_with_custom_profile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "profiles": {
                "cheap": {
                    "model": "gemini-2.5-flash-lite",
                    "temperature": 0.2,
                    "top_p": 0.9
                }
            },
            "defaults": { "profile": "cheap", "not_provided_marker": "N/A" }
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    let profile = settings.default_profile().unwrap();
    assert_eq!(profile.model, "gemini-2.5-flash-lite");
    assert_eq!(profile.thinking_budget, None);
    assert_eq!(settings.defaults.not_provided_marker, "N/A");
    assert!(settings.profile("deep").is_err());
}

#[test]
fn test_settings_rejects_out_of_range_temperature() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "profiles": { "deep": { "model": "m", "temperature": 3.0 } } }"#,
    )
    .unwrap();

    match Settings::load_from(&path) {
        Err(LensError::Config(msg)) => assert!(msg.contains("temperature")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_settings_catalog_path() {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("catalog.toml");
    std::fs::write(
        &catalog_path,
        r#"
[[categories]]
title = "Only"

[[categories.templates]]
id = "only"
label = "Only"
template = "hello"
"#,
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.defaults.catalog_path = Some(catalog_path);
    let catalog = settings.load_catalog().unwrap();
    assert_eq!(catalog.default_template().id, "only");
    assert!(catalog.styles().is_empty());
}

#[test]
fn test_factory_builds_gemini_backend() {
    let settings = Settings::default();
    let backend = ProviderFactory::create(&settings);
    assert_eq!(backend.name(), "gemini");
}
