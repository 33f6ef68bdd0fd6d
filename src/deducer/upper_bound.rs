// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ArgumentType, FunctionTypeDefinition, TypeDeducer};
use crate::function::{FunctionCalls, GuardFacts};
use crate::types::Type;
use crate::Result;

/// Types read off the leading `typeof` guards alone. Never calls the
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperBoundDeducer;

impl UpperBoundDeducer {
    pub fn type_from_guards(guards: &GuardFacts) -> Type {
        if guards.must_equal.is_empty() {
            Type::top().exclude_kinds(guards.must_not_equal.as_slice())
        } else {
            Type::bottom()
                .include_kinds(guards.must_equal.as_slice())
                .exclude_kinds(guards.must_not_equal.as_slice())
        }
    }
}

impl TypeDeducer for UpperBoundDeducer {
    fn type_for(&self, calls: &FunctionCalls) -> Result<FunctionTypeDefinition> {
        let function = &calls.function;
        let arguments = function
            .parameters()
            .iter()
            .map(|p| ArgumentType {
                name: p.name.clone(),
                ty: Self::type_from_guards(&p.guards),
            })
            .collect();

        Ok(FunctionTypeDefinition {
            function: function.id().clone(),
            arguments,
            // Guards say nothing about what comes back.
            return_type: Type::top(),
            trails: vec![],
        })
    }
}
