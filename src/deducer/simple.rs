// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{FunctionTypeDefinition, LowerBoundDeducer, TypeDeducer};
use crate::function::FunctionCalls;
use crate::lattice::walk;
use crate::options::InferenceOptions;
use crate::types::RoundUpParameters;
use crate::validator::{validator_for, Position};
use crate::Result;

use tracing::{debug, warn};

/// Seeds every argument with its lower bound, then walks it up the lattice
/// against the real function.
///
/// Return types stay at their lower bound: there is no oracle for them.
#[derive(Debug, Clone, Default)]
pub struct SimpleDeducer {
    options: InferenceOptions,
}

impl SimpleDeducer {
    pub fn new(options: InferenceOptions) -> Self {
        Self { options }
    }
}

impl TypeDeducer for SimpleDeducer {
    fn type_for(&self, calls: &FunctionCalls) -> Result<FunctionTypeDefinition> {
        let mut definition = LowerBoundDeducer::lower_bound(calls);
        let params = RoundUpParameters::from(&self.options);
        let name = calls.function.name();

        for (index, argument) in definition.arguments.iter_mut().enumerate() {
            let oracle = validator_for(
                calls,
                Position::Argument(index),
                self.options.rejection_policy,
            );
            if !oracle.can_validate() {
                continue;
            }

            let identifier = format!("{name}_{}", argument.name);
            let start = core::mem::take(&mut argument.ty);
            let result = walk(start, &oracle, params, &identifier);
            debug!("{identifier}: {}", result.element);
            argument.ty = result.element;
            definition.trails.push(result.trail);

            if let Some(e) = result.error {
                warn!("stopping generalization of {name}: {e}");
                break;
            }
        }

        Ok(definition)
    }
}
