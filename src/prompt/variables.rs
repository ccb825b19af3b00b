// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Placeholder substitution
//!
//! Templates refer to user-entered values with `{name}` placeholders. Only the
//! names in [`Variable`] are recognised; any other brace text is literal and
//! passes through untouched.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LensError;

/// Marker used when a variable was left empty
pub const DEFAULT_NOT_PROVIDED_MARKER: &str = "[未填寫]";

/// The fixed set of variables a template may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// The user's current occupation
    CurrentJob,
    /// First strength picked from the chart reading
    StrengthA,
    /// Second strength picked from the chart reading
    StrengthB,
}

impl Variable {
    pub const ALL: [Variable; 3] = [
        Variable::CurrentJob,
        Variable::StrengthA,
        Variable::StrengthB,
    ];

    /// Placeholder name, without braces
    pub fn name(self) -> &'static str {
        match self {
            Variable::CurrentJob => "current_job",
            Variable::StrengthA => "strength_a",
            Variable::StrengthB => "strength_b",
        }
    }

    /// Placeholder as it appears in template text
    pub fn placeholder(self) -> String {
        format!("{{{}}}", self.name())
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            LensError::InvalidInput(format!(
                "unknown variable '{}' (expected one of: current_job, strength_a, strength_b)",
                s
            ))
        })
    }
}

/// User-entered variable values for one analysis session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBag {
    values: HashMap<Variable, String>,
}

impl VariableBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, variable: Variable, value: impl Into<String>) -> Self {
        self.set(variable, value);
        self
    }

    pub fn set(&mut self, variable: Variable, value: impl Into<String>) {
        self.values.insert(variable, value.into());
    }

    pub fn clear(&mut self, variable: Variable) {
        self.values.remove(&variable);
    }

    /// Value for a variable; unset entries read as empty
    pub fn get(&self, variable: Variable) -> &str {
        self.values.get(&variable).map(String::as_str).unwrap_or("")
    }

    /// Whether a non-empty value is present
    pub fn is_provided(&self, variable: Variable) -> bool {
        !self.get(variable).is_empty()
    }
}

/// Fallback formatter producing a fixed marker for every unset variable
pub fn not_provided(marker: &str) -> impl Fn(Variable) -> String + '_ {
    move |_| marker.to_string()
}

/// Replace every recognised placeholder in `template`.
///
/// Empty or unset variables are replaced with `fallback(variable)`, so no
/// recognised `{name}` token survives. Unrecognised brace text is copied
/// verbatim. Substituted values are not rescanned.
pub fn substitute<F>(template: &str, bag: &VariableBag, fallback: F) -> String
where
    F: Fn(Variable) -> String,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let matched = after.find('}').and_then(|close| {
            Variable::from_name(&after[..close]).map(|variable| (variable, close))
        });

        match matched {
            Some((variable, close)) => {
                let value = bag.get(variable);
                if value.is_empty() {
                    out.push_str(&fallback(variable));
                } else {
                    out.push_str(value);
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Variables referenced by `template`, in first-use order
pub fn referenced_variables(template: &str) -> Vec<Variable> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        if let Some(close) = after.find('}') {
            if let Some(variable) = Variable::from_name(&after[..close]) {
                if !found.contains(&variable) {
                    found.push(variable);
                }
            }
        }
        rest = after;
    }
    found
}
