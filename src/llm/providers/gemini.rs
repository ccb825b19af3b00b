// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google Gemini API provider implementation
//!
//! Implements the InferenceBackend trait on top of the
//! `streamGenerateContent` endpoint in SSE mode.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::llm::message::ContentPart;
use crate::llm::provider::{FragmentStream, GenerationRequest, InferenceBackend};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// A missing key is accepted here and reported when a request is made.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_API_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    /// Build the request body
    fn build_request(&self, request: &GenerationRequest) -> GeminiRequest {
        let parts = request
            .parts()
            .iter()
            .map(|part| match part {
                ContentPart::Image { media_type, data } => GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: media_type.clone(),
                        data: data.clone(),
                    },
                },
                ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
            })
            .collect();

        let config = request.config();
        let system_instruction = if config.system_instruction.is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction {
                parts: vec![GeminiPart::Text {
                    text: config.system_instruction.clone(),
                }],
            })
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                thinking_config: config.thinking_budget.map(|thinking_budget| {
                    GeminiThinkingConfig { thinking_budget }
                }),
            },
        }
    }

    /// Parse an error response
    fn parse_error(status: u16, body: &str) -> ApiError {
        match serde_json::from_str::<GeminiErrorResponse>(body) {
            Ok(response) => ApiError::ServerError {
                status,
                message: response.error.describe(),
            },
            Err(_) => ApiError::ServerError {
                status,
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl InferenceBackend for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream_generate(&self, request: GenerationRequest) -> ApiResult<FragmentStream> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ApiError::AuthenticationFailed)?;
        let body = self.build_request(&request);
        let url = self.stream_url(&request.config().model);

        tracing::debug!(target: "celestial.llm.gemini", %url, "sending request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status, &body));
        }

        let byte_stream = response.bytes_stream();

        let fragment_stream = byte_stream
            .map(|result| result.map_err(|e| ApiError::StreamError(e.to_string())))
            .scan(SseBuffer::default(), |buffer, result| {
                let items = match result {
                    Ok(bytes) => buffer.feed(&bytes),
                    Err(e) => vec![Err(e)],
                };
                futures::future::ready(Some(items))
            })
            .flat_map(futures::stream::iter)
            .filter(|item| futures::future::ready(!matches!(item, Ok(text) if text.is_empty())));

        Ok(Box::pin(fragment_stream))
    }
}

/// Incremental SSE frame splitter
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Consume bytes, returning the items of every completed frame
    fn feed(&mut self, bytes: &[u8]) -> Vec<ApiResult<String>> {
        // Bytes are buffered raw so multi-byte characters split across
        // chunks are decoded only once the frame is complete.
        self.pending.extend_from_slice(bytes);

        let mut items = Vec::new();
        while let Some((end, sep_len)) = find_frame_end(&self.pending) {
            let frame: Vec<u8> = self.pending.drain(..end + sep_len).take(end).collect();
            let frame = String::from_utf8_lossy(&frame);
            if let Some(item) = parse_sse_frame(&frame) {
                items.push(item);
            }
        }
        items
    }
}

/// Position and length of the first blank-line separator
fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Parse one Server-Sent Event frame into a text fragment or an error
fn parse_sse_frame(frame: &str) -> Option<ApiResult<String>> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.trim() == "[DONE]" {
        return None;
    }

    let chunk: GeminiStreamChunk = match serde_json::from_str(&data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(ApiError::InvalidResponse(format!(
                "unparseable stream frame: {}",
                e
            ))))
        }
    };

    if let Some(error) = chunk.error {
        return Some(Err(ApiError::ServerError {
            status: error.code.unwrap_or(0),
            message: error.describe(),
        }));
    }

    let text: String = chunk
        .candidates
        .iter()
        .take(1)
        .filter_map(|c| c.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter(|part| !part.thought)
        .filter_map(|part| part.text.as_deref())
        .collect();

    Some(Ok(text))
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: GeminiInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiErrorDetail {
    fn describe(&self) -> String {
        match &self.status {
            Some(status) => format!("{}: {}", status, self.message),
            None => self.message.clone(),
        }
    }
}
