// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming inference client
//!
//! Drives one streaming exchange per call. Every fragment is appended to the
//! session buffer and then handed to the caller's observer, strictly in
//! arrival order, before the next fragment is polled. Concatenating what the
//! observer saw always reproduces the returned text.
//!
//! On failure the call returns an error and no text. Fragments already
//! delivered to the observer stay delivered; callers may keep showing them
//! next to the error.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, InferenceError};
use crate::llm::classifier::{cancelled, classify};
use crate::llm::message::ContentPart;
use crate::llm::provider::{GenerationRequest, InferenceBackend, InferenceRequestConfig};

/// Accumulating buffer of one streaming exchange
#[derive(Debug, Default)]
pub struct StreamSession {
    buffer: String,
    fragments: usize,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment
    pub fn push(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        self.fragments += 1;
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Number of fragments received
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

/// Client for the remote streaming service
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn InferenceBackend>,
}

impl InferenceClient {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Stream an analysis of `parts` driven by `instruction`.
    pub async fn analyze<F>(
        &self,
        parts: Vec<ContentPart>,
        instruction: &str,
        config: &InferenceRequestConfig,
        on_increment: F,
    ) -> Result<String, InferenceError>
    where
        F: FnMut(&str),
    {
        self.run(parts, instruction, config, on_increment, None).await
    }

    /// Like [`analyze`](Self::analyze), stopping with a `Cancelled` error
    /// once `cancel` fires. No fragment is forwarded after cancellation.
    pub async fn analyze_cancellable<F>(
        &self,
        parts: Vec<ContentPart>,
        instruction: &str,
        config: &InferenceRequestConfig,
        on_increment: F,
        cancel: &CancellationToken,
    ) -> Result<String, InferenceError>
    where
        F: FnMut(&str),
    {
        self.run(parts, instruction, config, on_increment, Some(cancel)).await
    }

    async fn run<F>(
        &self,
        parts: Vec<ContentPart>,
        instruction: &str,
        config: &InferenceRequestConfig,
        mut on_increment: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, InferenceError>
    where
        F: FnMut(&str),
    {
        let request = GenerationRequest::new(parts, instruction, config.clone());
        tracing::debug!(
            target: "celestial.llm.client",
            backend = self.backend.name(),
            model = %config.model,
            images = request.image_count(),
            instruction_len = instruction.len(),
            "opening stream"
        );

        // A token that never fires stands in when the caller passed none.
        let never = CancellationToken::new();
        let cancel = cancel.unwrap_or(&never);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(self.cancelled(0)),
            opened = self.backend.stream_generate(request) => opened,
        };
        let mut stream = opened.map_err(|e| self.failed(&e, 0))?;

        let mut session = StreamSession::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(session.fragment_count())),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    session.push(&fragment);
                    on_increment(&fragment);
                }
                Some(Err(e)) => return Err(self.failed(&e, session.fragment_count())),
                None => break,
            }
        }

        tracing::info!(
            target: "celestial.llm.client",
            fragments = session.fragment_count(),
            chars = session.text().chars().count(),
            "stream completed"
        );
        Ok(session.into_text())
    }

    fn failed(&self, raw: &ApiError, delivered: usize) -> InferenceError {
        let error = classify(raw);
        tracing::warn!(
            target: "celestial.llm.client",
            kind = %error.kind,
            delivered_fragments = delivered,
            error = %raw,
            "stream failed"
        );
        error
    }

    fn cancelled(&self, delivered: usize) -> InferenceError {
        tracing::debug!(
            target: "celestial.llm.client",
            delivered_fragments = delivered,
            "stream cancelled"
        );
        cancelled()
    }
}
