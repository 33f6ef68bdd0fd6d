// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Strategies that turn observed calls into per-function types.

mod lower_bound;
mod null;
mod simple;
mod upper_bound;

pub use lower_bound::LowerBoundDeducer;
pub use null::NullDeducer;
pub use simple::SimpleDeducer;
pub use upper_bound::UpperBoundDeducer;

use crate::function::{FunctionCalls, FunctionId};
use crate::lattice::{to_mermaid, Trail};
use crate::types::Type;
use crate::Result;

use core::fmt;

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentType {
    pub name: String,
    pub ty: Type,
}

/// The inferred signature of one function.
#[derive(Debug, Clone)]
pub struct FunctionTypeDefinition {
    pub function: FunctionId,
    pub arguments: Vec<ArgumentType>,
    pub return_type: Type,
    /// Walks that produced the argument types. Empty for strategies that do
    /// not consult the oracle.
    pub trails: Vec<Trail>,
}

impl FunctionTypeDefinition {
    pub fn argument(&self, name: &str) -> Option<&Type> {
        self.arguments.iter().find(|a| a.name == name).map(|a| &a.ty)
    }

    /// `name(a: A, b: B): R`
    pub fn signature(&self) -> String {
        let arguments: Vec<String> = self
            .arguments
            .iter()
            .map(|a| format!("{}: {}", a.name, a.ty))
            .collect();
        format!(
            "{}({}): {}",
            self.function.name,
            arguments.join(", "),
            self.return_type
        )
    }

    /// The audit trails as one Mermaid diagram.
    pub fn to_mermaid(&self) -> String {
        to_mermaid(&self.trails)
    }
}

impl fmt::Display for FunctionTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

pub trait TypeDeducer {
    fn type_for(&self, calls: &FunctionCalls) -> Result<FunctionTypeDefinition>;

    /// Types every function that was called at least once. Functions never
    /// called are reported and left out.
    fn all_type_definitions(&self, executions: &[FunctionCalls]) -> Result<Vec<FunctionTypeDefinition>> {
        let mut definitions = Vec::with_capacity(executions.len());
        let mut skipped = 0;
        for calls in executions {
            if calls.is_empty() {
                info!("no calls observed for {}; skipping", calls.function.id());
                skipped += 1;
                continue;
            }
            definitions.push(self.type_for(calls)?);
        }
        if skipped > 0 {
            info!("{skipped} function(s) had no observed calls");
        }
        Ok(definitions)
    }
}
