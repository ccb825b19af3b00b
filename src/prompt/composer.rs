// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt composition
//!
//! Turns a template selection (or the user's own edited text), an optional
//! style suffix and the variable bag into the final instruction. The result
//! is never empty: a blank composition falls back to the catalog's default
//! template.

use crate::prompt::catalog::{Catalog, StyleOption, TemplateSelection};
use crate::prompt::variables::{substitute, Variable, VariableBag, DEFAULT_NOT_PROVIDED_MARKER};

/// Composes final prompts against a catalog
#[derive(Debug, Clone)]
pub struct PromptComposer<'a> {
    catalog: &'a Catalog,
    not_provided_marker: String,
}

impl<'a> PromptComposer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            not_provided_marker: DEFAULT_NOT_PROVIDED_MARKER.to_string(),
        }
    }

    /// Override the marker substituted for empty variables
    pub fn with_not_provided_marker(mut self, marker: impl Into<String>) -> Self {
        self.not_provided_marker = marker.into();
        self
    }

    fn fallback(&self) -> impl Fn(Variable) -> String + '_ {
        move |_| self.not_provided_marker.clone()
    }

    /// Compose the final instruction.
    ///
    /// A non-blank `manual_override` replaces the selected template text.
    /// When that base text is blank after substitution the catalog's first
    /// template stands in for it. The style suffix is appended last.
    pub fn compose(
        &self,
        selection: Option<TemplateSelection>,
        style: Option<&StyleOption>,
        bag: &VariableBag,
        manual_override: Option<&str>,
    ) -> String {
        let base = match manual_override.filter(|text| !text.trim().is_empty()) {
            Some(text) => text,
            None => selection
                .and_then(|s| self.catalog.template(s))
                .map(|t| t.template_text.as_str())
                .unwrap_or(""),
        };

        let mut composed = substitute(base, bag, self.fallback());
        if composed.trim().is_empty() {
            tracing::debug!(
                target: "celestial.prompt",
                "base prompt is blank, falling back to the default template"
            );
            composed = substitute(
                &self.catalog.default_template().template_text,
                bag,
                self.fallback(),
            );
        }

        if let Some(style) = style {
            composed.push_str(&substitute(&style.suffix_text, bag, self.fallback()));
        }
        composed
    }
}
