// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Maps raw backend failures to user-facing errors

use std::fmt::Display;

use crate::error::{InferenceError, InferenceErrorKind};

/// Token marking a rate-limit / quota rejection
pub const RATE_LIMIT_MARKER: &str = "429";

pub const RATE_LIMITED_MESSAGE: &str =
    "請求過於頻繁或已超出配額 (429)，請稍候再試，並檢查 API 帳戶的計費與配額設定。";

pub const UNCLASSIFIED_MESSAGE: &str =
    "解讀過程中發生錯誤，可能與模型限制或網路有關，請稍後再試。";

pub const CANCELLED_MESSAGE: &str = "解讀已取消。";

/// Classify a raw failure by its message text only
pub fn classify(raw: &impl Display) -> InferenceError {
    let detail = raw.to_string();
    let error = if detail.contains(RATE_LIMIT_MARKER) {
        InferenceError::new(InferenceErrorKind::RateLimited, RATE_LIMITED_MESSAGE)
    } else {
        InferenceError::new(InferenceErrorKind::Unclassified, UNCLASSIFIED_MESSAGE)
    };
    error.with_detail(detail)
}

/// The error reported when the caller cancels a stream
pub fn cancelled() -> InferenceError {
    InferenceError::new(InferenceErrorKind::Cancelled, CANCELLED_MESSAGE)
}
