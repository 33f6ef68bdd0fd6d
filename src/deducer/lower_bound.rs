// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ArgumentType, FunctionTypeDefinition, TypeDeducer};
use crate::function::FunctionCalls;
use crate::types::Type;
use crate::value::Value;
use crate::Result;

/// The union of exactly the observed values, position by position.
///
/// A call passing fewer arguments than the function declares is recorded
/// as passing `undefined` for the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBoundDeducer;

impl LowerBoundDeducer {
    pub fn lower_bound(calls: &FunctionCalls) -> FunctionTypeDefinition {
        let function = &calls.function;
        let mut arguments: Vec<ArgumentType> = function
            .parameters()
            .iter()
            .map(|p| ArgumentType {
                name: p.name.clone(),
                ty: Type::bottom(),
            })
            .collect();
        let mut return_type = Type::bottom();

        for call in calls.calls.iter() {
            for (i, argument) in arguments.iter_mut().enumerate() {
                let value = call.args.get(i).unwrap_or(&Value::Undefined);
                argument.ty = argument.ty.include(value);
            }
            return_type = return_type.include(&call.return_value);
        }

        FunctionTypeDefinition {
            function: function.id().clone(),
            arguments,
            return_type,
            trails: vec![],
        }
    }
}

impl TypeDeducer for LowerBoundDeducer {
    fn type_for(&self, calls: &FunctionCalls) -> Result<FunctionTypeDefinition> {
        Ok(Self::lower_bound(calls))
    }
}
