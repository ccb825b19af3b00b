// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt module for CelestialLens
//!
//! Template catalog, variable substitution and final prompt composition.

pub mod catalog;
pub mod composer;
pub mod variables;

pub use catalog::*;
pub use composer::*;
pub use variables::*;
