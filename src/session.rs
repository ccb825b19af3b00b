// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Analysis session state
//!
//! Everything a user edits before starting an analysis lives here: the
//! ordered attachments, the template selection, the style, the variables
//! and the free-text override. The prompt is frozen when an analysis starts.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::attachment::{encode_all, Attachment, AttachmentId};
use crate::error::{LensError, Result};
use crate::llm::client::InferenceClient;
use crate::llm::provider::InferenceRequestConfig;
use crate::prompt::catalog::{Catalog, TemplateSelection};
use crate::prompt::composer::PromptComposer;
use crate::prompt::variables::{Variable, VariableBag, DEFAULT_NOT_PROVIDED_MARKER};

/// The prompt frozen at the moment an analysis starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSnapshot {
    pub text: String,
    pub attachment_count: usize,
}

/// Mutable state of one analysis session
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    attachments: Vec<Attachment>,
    selection: Option<TemplateSelection>,
    style_id: Option<String>,
    variables: VariableBag,
    manual_override: String,
    not_provided_marker: String,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            attachments: Vec::new(),
            selection: None,
            style_id: None,
            variables: VariableBag::new(),
            manual_override: String::new(),
            not_provided_marker: DEFAULT_NOT_PROVIDED_MARKER.to_string(),
        }
    }

    pub fn with_not_provided_marker(mut self, marker: impl Into<String>) -> Self {
        self.not_provided_marker = marker.into();
        self
    }

    // ==================== Attachments ====================

    /// Append an attachment; selection order is preserved
    pub fn add_attachment(&mut self, attachment: Attachment) -> AttachmentId {
        let id = attachment.id();
        self.attachments.push(attachment);
        id
    }

    /// Append an image file
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Result<AttachmentId> {
        let attachment = Attachment::from_path(path)?;
        Ok(self.add_attachment(attachment))
    }

    /// Remove an attachment, returning it if it existed
    pub fn remove_attachment(&mut self, id: AttachmentId) -> Option<Attachment> {
        let pos = self.attachments.iter().position(|a| a.id() == id)?;
        Some(self.attachments.remove(pos))
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    // ==================== Prompt inputs ====================

    /// Select a template and load its text into the editable override
    pub fn select_template(
        &mut self,
        catalog: &Catalog,
        selection: TemplateSelection,
    ) -> Result<()> {
        let template = catalog.template(selection).ok_or_else(|| {
            LensError::InvalidInput(format!(
                "no template at category {} index {}",
                selection.category, selection.template
            ))
        })?;
        self.manual_override = template.template_text.clone();
        self.selection = Some(selection);
        Ok(())
    }

    /// Select a template by id
    pub fn select_template_id(&mut self, catalog: &Catalog, id: &str) -> Result<()> {
        let (selection, _) = catalog
            .find_template(id)
            .ok_or_else(|| LensError::InvalidInput(format!("unknown template '{}'", id)))?;
        self.select_template(catalog, selection)
    }

    pub fn selection(&self) -> Option<TemplateSelection> {
        self.selection
    }

    /// Choose (or clear) the style suffix
    pub fn set_style(&mut self, catalog: &Catalog, style_id: Option<&str>) -> Result<()> {
        match style_id {
            Some(id) if catalog.find_style(id).is_none() => {
                Err(LensError::InvalidInput(format!("unknown style '{}'", id)))
            }
            _ => {
                self.style_id = style_id.map(str::to_string);
                Ok(())
            }
        }
    }

    pub fn set_variable(&mut self, variable: Variable, value: impl Into<String>) {
        self.variables.set(variable, value);
    }

    pub fn variables(&self) -> &VariableBag {
        &self.variables
    }

    /// Replace the free-text instruction
    pub fn set_override(&mut self, text: impl Into<String>) {
        self.manual_override = text.into();
    }

    pub fn manual_override(&self) -> &str {
        &self.manual_override
    }

    /// Compose the current prompt
    pub fn compose(&self, catalog: &Catalog) -> String {
        let style = self
            .style_id
            .as_deref()
            .and_then(|id| catalog.find_style(id));
        PromptComposer::new(catalog)
            .with_not_provided_marker(self.not_provided_marker.clone())
            .compose(
                self.selection,
                style,
                &self.variables,
                Some(self.manual_override.trim()),
            )
    }

    /// Owned copy of the prompt as it stands now
    pub fn snapshot_prompt(&self, catalog: &Catalog) -> PromptSnapshot {
        PromptSnapshot {
            text: self.compose(catalog),
            attachment_count: self.attachments.len(),
        }
    }

    // ==================== Analysis ====================

    /// Freeze the prompt, encode the attachments and stream the analysis.
    ///
    /// Later edits to the session do not affect a running analysis.
    pub async fn analyze<F>(
        &self,
        client: &InferenceClient,
        catalog: &Catalog,
        config: &InferenceRequestConfig,
        on_increment: F,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        if self.attachments.is_empty() {
            return Err(LensError::InvalidInput(
                "請先上傳命盤截圖 (at least one image is required)".to_string(),
            ));
        }

        let snapshot = self.snapshot_prompt(catalog);
        let attachments = self.attachments.clone();

        tracing::debug!(
            target: "celestial.session",
            attachments = snapshot.attachment_count,
            prompt_len = snapshot.text.len(),
            "starting analysis"
        );

        let parts = encode_all(&attachments).await?;
        let text = client
            .analyze_cancellable(parts, &snapshot.text, config, on_increment, cancel)
            .await?;
        Ok(text)
    }
}
