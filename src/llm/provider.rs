// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Inference backend trait and request types
//!
//! Defines the abstraction layer over the remote streaming service.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::ApiResult;
use crate::llm::message::ContentPart;

/// System instruction of the deep profile
pub const DEEP_SYSTEM_INSTRUCTION: &str = "你是一位精通八字、紫微斗數、三元九運與現代職業戰略的頂尖玄學專家。你擅長將古老的東方智慧轉化為具備未來感、跨領域且符合現代趨勢的實戰建議。你的目標是幫助命主找到其在地球上的『原廠設定』並發揮最大天賦。解讀時請使用 Markdown 格式，表格必須清晰，語氣根據用戶要求調整。";

/// System instruction of the fast profile
pub const FAST_SYSTEM_INSTRUCTION: &str = "你是一位精通八字、紫微斗數、三元九運與現代職業戰略的頂尖玄學專家。你擅長將古老的東方智慧轉化為具備未來感、跨領域且符合現代趨勢的實戰建議。解讀時請使用 Markdown 格式，表格必須清晰。";

/// Ordered stream of text fragments
pub type FragmentStream = Pin<Box<dyn Stream<Item = ApiResult<String>> + Send>>;

/// Remote service that turns a multimodal request into streamed text
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name (e.g., "gemini")
    fn name(&self) -> &str;

    /// Open one streaming session for `request`
    async fn stream_generate(&self, request: GenerationRequest) -> ApiResult<FragmentStream>;
}

/// Model configuration of one deployment profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequestConfig {
    /// Model identifier
    pub model: String,

    /// Persona / formatting directive
    #[serde(default)]
    pub system_instruction: String,

    /// Sampling temperature (0-1)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling (0-1)
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Token allowance for extended reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<u32>,
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.95
}

impl InferenceRequestConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            thinking_budget: None,
        }
    }

    /// Pro model with a 32k thinking budget
    pub fn deep() -> Self {
        Self::new("gemini-3-pro-preview")
            .with_system_instruction(DEEP_SYSTEM_INSTRUCTION)
            .with_thinking_budget(32_768)
    }

    /// Flash model without extended reasoning
    pub fn fast() -> Self {
        Self::new("gemini-2.5-flash").with_system_instruction(FAST_SYSTEM_INSTRUCTION)
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}

/// A single multimodal request: images first, one trailing instruction
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    parts: Vec<ContentPart>,
    config: InferenceRequestConfig,
}

impl GenerationRequest {
    /// Build a request from encoded parts and the instruction text.
    ///
    /// The instruction always travels as the final part, after every image.
    pub fn new(
        parts: Vec<ContentPart>,
        instruction: impl Into<String>,
        config: InferenceRequestConfig,
    ) -> Self {
        let mut parts = parts;
        parts.push(ContentPart::text(instruction));
        Self { parts, config }
    }

    /// All parts in transmission order
    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// The trailing instruction
    pub fn instruction(&self) -> &str {
        self.parts.last().and_then(ContentPart::as_text).unwrap_or("")
    }

    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_image()).count()
    }

    pub fn config(&self) -> &InferenceRequestConfig {
        &self.config
    }
}
