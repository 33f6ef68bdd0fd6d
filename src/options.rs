// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Result;

use serde::{Deserialize, Serialize};

/// Which failures of the target count as "this argument was rejected".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionPolicy {
    /// Any error raised by the target rejects the argument.
    #[default]
    AnyError,
    /// Only the target's bad-argument signal rejects the argument. Any other
    /// failure aborts generalization of that function.
    BadArgumentOnly,
}

/// Run configuration for the deducers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceOptions {
    /// Try to generalize components that never saw a value. Off by default
    /// so never-exercised kinds stay out of the inferred types.
    pub round_up_from_bottom: bool,
    pub rejection_policy: RejectionPolicy,
}

impl InferenceOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file {path}"))?;
        #[cfg(feature = "yaml")]
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            return Self::from_yaml_str(&contents)
                .with_context(|| format!("failed to parse options file {path}"));
        }
        Self::from_json_str(&contents).with_context(|| format!("failed to parse options file {path}"))
    }
}
