// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Errors raised while ingesting traces or generalizing types.
///
/// An oracle rejecting a hypothesized value is not an error; it is negative
/// evidence and travels through [`Validation`](crate::Validation) instead.
#[derive(Debug, thiserror::Error)]
pub enum InferError {
    /// A traced value falls outside the eight modeled kinds.
    #[error("unsupported value kind: {kind}")]
    UnsupportedValueKind { kind: String },
    /// The tracer saw a function exit without a matching entry (or the
    /// reverse), so the recorded calls cannot be trusted.
    #[error("unbalanced entry/exit: {0}")]
    UnbalancedEntryExit(String),
    /// The target failed in a way the rejection policy does not treat as an
    /// argument rejection.
    #[error("{function} failed while validating: {message}")]
    TargetFailed { function: String, message: String },
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML parsing error
    #[cfg(feature = "yaml")]
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = core::result::Result<T, InferError>;
