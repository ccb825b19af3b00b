// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use celestial_lens::error::{ApiError, InferenceErrorKind, LensError};
use celestial_lens::llm::classify;

#[test]
fn test_classify_api_errors() {
    let cases = [
        (
            ApiError::ServerError {
                status: 429,
                message: "quota".to_string(),
            },
            InferenceErrorKind::RateLimited,
        ),
        (
            ApiError::ServerError {
                status: 503,
                message: "overloaded".to_string(),
            },
            InferenceErrorKind::Unclassified,
        ),
        (
            ApiError::StreamError("connection reset".to_string()),
            InferenceErrorKind::Unclassified,
        ),
        (
            ApiError::AuthenticationFailed,
            InferenceErrorKind::Unclassified,
        ),
    ];

    for (raw, expected) in cases {
        let err = classify(&raw);
        assert_eq!(err.kind, expected, "{}", raw);
        assert_eq!(err.detail.as_deref(), Some(raw.to_string().as_str()));
    }
}

#[test]
fn test_429_anywhere_in_message_counts() {
    let err = classify(&ApiError::Network("upstream said 429 Too Many Requests".to_string()));
    assert!(err.is_rate_limited());
}

#[test]
fn test_lens_error_renders_inference_message_only() {
    let err: LensError = classify(&ApiError::Network("boom".to_string())).into();
    assert!(!err.to_string().contains("boom"));
}
