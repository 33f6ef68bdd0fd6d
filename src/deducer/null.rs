// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ArgumentType, FunctionTypeDefinition, TypeDeducer};
use crate::function::FunctionCalls;
use crate::types::Type;
use crate::value::Value;
use crate::Result;

/// Baseline that types every argument and the return value as `null`.
/// Ignores the observed values and never calls the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDeducer;

impl TypeDeducer for NullDeducer {
    fn type_for(&self, calls: &FunctionCalls) -> Result<FunctionTypeDefinition> {
        let null = Type::of(&Value::Null);
        let function = &calls.function;
        let arguments = function
            .parameters()
            .iter()
            .map(|p| ArgumentType {
                name: p.name.clone(),
                ty: null.clone(),
            })
            .collect();

        Ok(FunctionTypeDefinition {
            function: function.id().clone(),
            arguments,
            return_type: null,
            trails: vec![],
        })
    }
}
