// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for CelestialLens
//!
//! Streaming client, failure classification and the remote backend
//! abstraction.

pub mod classifier;
pub mod client;
pub mod factory;
pub mod message;
pub mod mock_provider;
pub mod provider;
pub mod providers;

pub use classifier::classify;
pub use client::*;
pub use message::*;
pub use provider::*;
