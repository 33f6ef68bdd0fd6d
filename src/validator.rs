// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Oracles backed by the real target function.
//!
//! A validator answers "would the target accept this value here?" by
//! replaying real observed calls with one position substituted. Positions
//! may be nested: [`Validator::for_sub_expression`] narrows a validator to
//! an element of the value under test while the rest of the replayed
//! example stays as it was observed.

use crate::function::{CallError, FunctionCalls, ObservedCall, TargetFunction};
use crate::options::RejectionPolicy;
use crate::value::{PathSegment, Value};
use crate::{InferError, Result};

use std::rc::Rc;

use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::trace;

/// Number of replayed calls a repeated validation must survive.
pub const DEFAULT_TRIALS: usize = 5;

/// How many times to ask the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trials {
    /// Sample [`DEFAULT_TRIALS`] calls; used when the provider generates
    /// fresh values on each trial.
    Repeated,
    /// Exactly one trial, for a fixed known value.
    SingleValue,
}

impl Trials {
    fn count(&self) -> usize {
        match self {
            Trials::Repeated => DEFAULT_TRIALS,
            Trials::SingleValue => 1,
        }
    }
}

/// Outcome of asking the oracle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub accepted: bool,
    /// The values substituted at the position under test, in trial order.
    pub evidence: Vec<Value>,
}

impl Validation {
    pub fn accepted(evidence: Vec<Value>) -> Self {
        Self {
            accepted: true,
            evidence,
        }
    }

    pub fn rejected(evidence: Vec<Value>) -> Self {
        Self {
            accepted: false,
            evidence,
        }
    }
}

/// Supplies the value to try, given the value observed at the position.
pub type ValueProvider<'p> = &'p mut dyn FnMut(&Value) -> Value;

pub trait Validator {
    fn validate(&self, trials: Trials, provider: ValueProvider<'_>) -> Result<Validation>;

    /// A validator for the element at `segment` inside the value this one
    /// tests.
    fn for_sub_expression(&self, segment: PathSegment) -> Oracle;

    /// Whether asking this validator can ever produce acceptance.
    fn can_validate(&self) -> bool {
        true
    }
}

/// Shared handle to a validator. Lazily generated candidates hold on to one
/// until they are consumed.
pub type Oracle = Rc<dyn Validator>;

/// Where in a call a validator substitutes values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Argument(usize),
    Return,
}

/// Builds the oracle for one position of `calls`.
pub fn validator_for(calls: &FunctionCalls, position: Position, policy: RejectionPolicy) -> Oracle {
    match position {
        Position::Argument(index) => Rc::new(ArgumentValidator::new(
            calls.function.clone(),
            calls.calls.clone(),
            index,
            policy,
        )),
        // No generic "bad output" signal exists, so return values cannot be
        // validated.
        Position::Return => Rc::new(NoopValidator),
    }
}

/// Replays observed calls with one argument (or one element inside it)
/// substituted.
#[derive(Debug, Clone)]
pub struct ArgumentValidator {
    function: TargetFunction,
    calls: Rc<[ObservedCall]>,
    index: usize,
    path: Vec<PathSegment>,
    policy: RejectionPolicy,
}

impl ArgumentValidator {
    /// # Panics
    ///
    /// When `index` is not a parameter position of `function`.
    pub fn new(
        function: TargetFunction,
        calls: Rc<[ObservedCall]>,
        index: usize,
        policy: RejectionPolicy,
    ) -> Self {
        assert!(
            index < function.arity(),
            "argument {index} out of bounds for {} with {} parameters",
            function.name(),
            function.arity()
        );
        Self {
            function,
            calls,
            index,
            path: vec![],
            policy,
        }
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    // Prefers calls whose value already has the container the lens points
    // into, so that the rest of a real example is kept.
    fn sample(&self) -> Option<&ObservedCall> {
        let mut rng = thread_rng();
        let Some((last, parent)) = self.path.split_last() else {
            return self.calls.choose(&mut rng);
        };

        let compatible: Vec<&ObservedCall> = self
            .calls
            .iter()
            .filter(|call| {
                call.args
                    .get(self.index)
                    .is_some_and(|arg| arg.get_path(parent).is_container_for(last))
            })
            .collect();
        match compatible.choose(&mut rng) {
            Some(call) => Some(*call),
            None => self.calls.choose(&mut rng),
        }
    }

    fn rejects(&self, error: &CallError) -> bool {
        match (error, self.policy) {
            (CallError::BadArgument(_), _) => true,
            (CallError::Failed(_), RejectionPolicy::AnyError) => true,
            (CallError::Failed(_), RejectionPolicy::BadArgumentOnly) => false,
        }
    }
}

impl Validator for ArgumentValidator {
    fn validate(&self, trials: Trials, provider: ValueProvider<'_>) -> Result<Validation> {
        let mut evidence = vec![];
        for _ in 0..trials.count() {
            let Some(call) = self.sample() else {
                return Ok(Validation::rejected(evidence));
            };

            // The target may mutate its arguments. Cloning is copy-on-write,
            // so later trials always replay the call as it was observed.
            let mut args = call.args.clone();
            if args.len() < self.function.arity() {
                args.resize(self.function.arity(), Value::Undefined);
            }

            let slot = args[self.index].make_or_get_value_mut(&self.path);
            let tried = provider(&*slot);
            *slot = tried.clone();
            evidence.push(tried);

            match self.function.invoke(&mut args) {
                Ok(_) => (),
                Err(e) if self.rejects(&e) => {
                    trace!("{} rejected {:?}: {e}", self.function.name(), evidence.last());
                    return Ok(Validation::rejected(evidence));
                }
                Err(e) => {
                    return Err(InferError::TargetFailed {
                        function: self.function.name().to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
        Ok(Validation::accepted(evidence))
    }

    fn for_sub_expression(&self, segment: PathSegment) -> Oracle {
        let mut narrowed = self.clone();
        narrowed.path.push(segment);
        Rc::new(narrowed)
    }
}

/// Oracle for positions that cannot be validated. Every question is
/// answered with "not accepted" without calling anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl Validator for NoopValidator {
    fn validate(&self, _trials: Trials, _provider: ValueProvider<'_>) -> Result<Validation> {
        Ok(Validation::default())
    }

    fn for_sub_expression(&self, _segment: PathSegment) -> Oracle {
        Rc::new(NoopValidator)
    }

    fn can_validate(&self) -> bool {
        false
    }
}
