// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CelestialLens - streaming chart readings from a multimodal model.
//!
//! This crate exposes the runtime used by the `celestial-lens` CLI
//! (`src/main.rs`).
//!
//! Architecture highlights:
//! - `prompt`: template catalog, variable substitution and prompt composition
//! - `attachment`: image attachments and their concurrent base64 encoding
//! - `llm`: streaming inference client, failure classification, Gemini backend
//! - `session`: editable analysis state tying the pieces together
//! - `config`: settings file, deployment profiles and API key lookup

pub mod attachment;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod session;

pub use error::{LensError, Result};
