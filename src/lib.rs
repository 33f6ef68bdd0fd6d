// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod deducer;
mod error;
mod function;
mod kind;
mod lattice;
mod number;
mod options;
mod trace;
mod types;
mod validator;
mod value;

pub use deducer::{
    ArgumentType, FunctionTypeDefinition, LowerBoundDeducer, NullDeducer, SimpleDeducer,
    TypeDeducer, UpperBoundDeducer,
};
pub use error::{InferError, Result};
pub use function::{
    CallError, FunctionCalls, FunctionId, GuardFacts, Invocable, ObservedCall, Parameter,
    TargetFunction,
};
pub use kind::Kind;
pub use number::Number;
pub use options::{InferenceOptions, RejectionPolicy};
pub use trace::{read_instrumentation_file, read_instrumentation_output};
pub use types::{RoundUpParameters, Type, TypeComponent};
pub use validator::{
    validator_for, ArgumentValidator, NoopValidator, Oracle, Position, Trials, Validation,
    Validator, ValueProvider, DEFAULT_TRIALS,
};
pub use value::{FunctionValue, PathSegment, Record, Value};

/// Lattice internals. Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::lattice::*;
    pub use crate::types::{
        ArrayComponent, ArrayKind, BooleanComponent, BooleanDomain, BoundedDomain,
        BoundedValueComponent, Field, FunctionComponent, FunctionDomain, NullComponent,
        NullDomain, NumberComponent, NumberDomain, ObjectComponent, ObjectKind, OpenDomain,
        RecursiveComponent, SetComponent, Shape, StringComponent, StringDomain, StructuralKind,
        UndefinedComponent, UndefinedDomain,
    };
}

#[cfg(test)]
mod tests;
