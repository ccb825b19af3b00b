// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory for creating inference backends

use std::sync::Arc;

use crate::config::Settings;
use crate::llm::provider::InferenceBackend;
use crate::llm::providers::GeminiProvider;

/// Factory for creating inference backends
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the configured backend.
    pub fn create(settings: &Settings) -> Arc<dyn InferenceBackend> {
        Arc::new(Self::gemini(settings))
    }

    /// Build the Gemini backend.
    ///
    /// The API key is read once here. A missing key does not fail
    /// construction; the first request reports it instead.
    pub fn gemini(settings: &Settings) -> GeminiProvider {
        let provider = GeminiProvider::with_base_url(
            settings.get_api_key(),
            settings.provider.base_url.clone(),
        );
        if !provider.has_api_key() {
            tracing::warn!(
                target: "celestial.llm.factory",
                env = %settings.provider.api_key_env,
                "no API key configured; requests will fail until one is set"
            );
        }
        provider
    }
}
