// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock inference backend for testing
//!
//! Provides a configurable implementation of the InferenceBackend trait that
//! streams scripted fragments without making real API calls.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, ApiResult};
use crate::llm::provider::{FragmentStream, GenerationRequest, InferenceBackend};

/// A scripted failure
#[derive(Clone, Debug)]
pub enum MockFailure {
    /// HTTP error status
    Status(u16),
    /// Transport failure while streaming
    Stream(String),
}

impl MockFailure {
    fn to_api_error(&self) -> ApiError {
        match self {
            MockFailure::Status(status) => ApiError::ServerError {
                status: *status,
                message: format!("mock status {}", status),
            },
            MockFailure::Stream(message) => ApiError::StreamError(message.clone()),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Script {
    fragments: Vec<String>,
    setup_failure: Option<MockFailure>,
    stream_failure: Option<MockFailure>,
    pending_tail: bool,
}

/// A mock backend for testing
#[derive(Clone)]
pub struct MockProvider {
    /// Backend name
    name: String,
    /// What each call streams
    script: Arc<Mutex<Script>>,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a mock that streams "Mock response" in one fragment
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            script: Arc::new(Mutex::new(Script {
                fragments: vec!["Mock response".to_string()],
                ..Default::default()
            })),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Mock provider script lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Stream these fragments, in order
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script().fragments = fragments.into_iter().map(Into::into).collect();
        self
    }

    /// Split `text` into fragments of `chunk_chars` characters
    pub fn with_chunked_text(self, text: &str, chunk_chars: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let fragments: Vec<String> = chars
            .chunks(chunk_chars.max(1))
            .map(|c| c.iter().collect())
            .collect();
        self.with_fragments(fragments)
    }

    /// Fail before any fragment is produced
    pub fn with_setup_failure(self, failure: MockFailure) -> Self {
        self.script().setup_failure = Some(failure);
        self
    }

    /// Fail after the scripted fragments
    pub fn with_stream_failure(self, failure: MockFailure) -> Self {
        self.script().stream_failure = Some(failure);
        self
    }

    /// Never finish after the scripted fragments
    pub fn with_pending_tail(self) -> Self {
        self.script().pending_tail = true;
        self
    }

    /// Number of times stream_generate() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// All recorded requests
    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.recorded_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The last request made
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.recorded_requests().pop()
    }
}

#[async_trait]
impl InferenceBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_generate(&self, request: GenerationRequest) -> ApiResult<FragmentStream> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut recorded) = self.recorded_requests.lock() {
            recorded.push(request);
        }

        let script = self.script().clone();
        if let Some(failure) = &script.setup_failure {
            return Err(failure.to_api_error());
        }

        let mut items: Vec<ApiResult<String>> = script.fragments.into_iter().map(Ok).collect();
        if let Some(failure) = &script.stream_failure {
            items.push(Err(failure.to_api_error()));
        }

        let head = stream::iter(items);
        if script.pending_tail {
            Ok(Box::pin(head.chain(stream::pending())))
        } else {
            Ok(Box::pin(head))
        }
    }
}
