// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;

use core::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Stable identity of a traced function.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct FunctionId {
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.location)
        }
    }
}

/// `typeof` tags that a leading guard in the function body requires or
/// forbids for one parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuardFacts {
    pub must_equal: Vec<String>,
    pub must_not_equal: Vec<String>,
}

impl GuardFacts {
    pub fn must_equal(tags: &[&str]) -> Self {
        Self {
            must_equal: tags.iter().map(|t| t.to_string()).collect(),
            must_not_equal: vec![],
        }
    }

    pub fn must_not_equal(tags: &[&str]) -> Self {
        Self {
            must_equal: vec![],
            must_not_equal: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub guards: GuardFacts,
}

impl Parameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            guards: GuardFacts::default(),
        }
    }
}

/// How a target signals that it did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The target's own argument validation refused the input.
    #[error("bad argument: {0}")]
    BadArgument(String),
    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl CallError {
    pub fn bad_argument(message: &str) -> Self {
        CallError::BadArgument(message.to_string())
    }

    pub fn failed(message: &str) -> Self {
        CallError::Failed(message.to_string())
    }
}

/// The real implementation behind a [`TargetFunction`].
///
/// Targets may mutate their arguments; callers hand them a private copy.
pub trait Invocable {
    fn invoke(&self, args: &mut [Value]) -> Result<Value, CallError>;
}

impl<F> Invocable for F
where
    F: Fn(&mut [Value]) -> Result<Value, CallError>,
{
    fn invoke(&self, args: &mut [Value]) -> Result<Value, CallError> {
        self(args)
    }
}

/// A function whose types are being inferred.
#[derive(Clone)]
pub struct TargetFunction {
    id: FunctionId,
    parameters: Vec<Parameter>,
    invocable: Rc<dyn Invocable>,
}

impl fmt::Debug for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetFunction")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl TargetFunction {
    pub fn new<F>(name: &str, parameters: &[&str], body: F) -> Self
    where
        F: Fn(&mut [Value]) -> Result<Value, CallError> + 'static,
    {
        Self::from_invocable(name, parameters, body)
    }

    pub fn from_invocable<I: Invocable + 'static>(
        name: &str,
        parameters: &[&str],
        invocable: I,
    ) -> Self {
        Self {
            id: FunctionId {
                name: name.to_string(),
                location: String::new(),
            },
            parameters: parameters.iter().map(|p| Parameter::new(p)).collect(),
            invocable: Rc::new(invocable),
        }
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.id.location = location.to_string();
        self
    }

    /// Attaches guard facts to the named parameter. Unknown names are
    /// ignored.
    pub fn with_guards(mut self, parameter: &str, guards: GuardFacts) -> Self {
        if let Some(p) = self.parameters.iter_mut().find(|p| p.name == parameter) {
            p.guards = guards;
        }
        self
    }

    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Grows the parameter list to `count`, naming the synthetic parameters
    /// by position. Traced calls may pass more arguments than declared.
    pub fn extend_parameters(&mut self, count: usize) {
        for i in self.parameters.len()..count {
            self.parameters.push(Parameter::new(&format!("arg{i}")));
        }
    }

    pub fn invoke(&self, args: &mut [Value]) -> Result<Value, CallError> {
        self.invocable.invoke(args)
    }
}

/// One recorded invocation of a target function.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedCall {
    pub args: Vec<Value>,
    #[serde(default)]
    pub return_value: Value,
}

impl ObservedCall {
    pub fn new(args: Vec<Value>, return_value: Value) -> Self {
        Self { args, return_value }
    }
}

/// A target function together with every call observed for it.
#[derive(Debug, Clone)]
pub struct FunctionCalls {
    pub function: TargetFunction,
    pub calls: Rc<[ObservedCall]>,
}

impl FunctionCalls {
    /// Pairs `function` with its calls, widening its parameter list to the
    /// longest observed argument list.
    pub fn new(mut function: TargetFunction, calls: Vec<ObservedCall>) -> Self {
        let observed = calls.iter().map(|c| c.args.len()).max().unwrap_or(0);
        function.extend_parameters(observed);
        Self {
            function,
            calls: calls.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
