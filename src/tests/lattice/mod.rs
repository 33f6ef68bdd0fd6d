// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use super::common::{value, Scripted};
use crate::unstable::*;
use crate::*;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

// Accepts the first `budget` questions, then fails like a crashing target.
struct Flaky {
    budget: Cell<usize>,
}

impl Validator for Flaky {
    fn validate(&self, _trials: Trials, provider: ValueProvider<'_>) -> crate::Result<Validation> {
        let tried = provider(&Value::Undefined);
        match self.budget.get() {
            0 => Err(InferError::TargetFailed {
                function: "f".to_string(),
                message: "crashed".to_string(),
            }),
            n => {
                self.budget.set(n - 1);
                Ok(Validation::accepted(vec![tried]))
            }
        }
    }

    fn for_sub_expression(&self, _segment: PathSegment) -> Oracle {
        Rc::new(Flaky {
            budget: Cell::new(self.budget.get()),
        })
    }
}

#[test]
fn walk_reaches_a_fixpoint() -> Result<()> {
    let oracle = Scripted::accepting();
    let walked = walk(
        Type::of(&Value::from(true)),
        &oracle.oracle(),
        RoundUpParameters::default(),
        "f_x",
    );

    assert!(walked.error.is_none());
    assert_eq!(walked.element.to_definition(), "boolean");
    assert_eq!(walked.trail.identifier, "f_x");
    assert_eq!(walked.trail.start, "true");
    assert_eq!(walked.trail.steps.len(), 1);
    assert_eq!(walked.trail.steps[0].rule, "INCLUDE-VALUE");
    Ok(())
}

#[test]
fn rejected_moves_are_recorded() -> Result<()> {
    let oracle = Scripted::rejecting();
    let start = Type::of(&Value::from(1));
    let walked = walk(start.clone(), &oracle.oracle(), RoundUpParameters::default(), "f_x");

    assert_eq!(walked.element, start);
    assert_eq!(walked.trail.steps.len(), 1);
    assert!(!walked.trail.steps[0].accepted);
    assert_eq!(walked.trail.steps[0].definition, "number");
    assert_eq!(walked.trail.accepted_steps().count(), 0);
    Ok(())
}

#[test]
fn first_accepted_move_wins() -> Result<()> {
    // Only the record's field is ever accepted.
    let oracle = Scripted::new(|path, _| path == ".n");
    let start = Type::of(&value(r#"{"n": 1}"#)).include(&Value::from("s"));
    let walked = walk(start, &oracle.oracle(), RoundUpParameters::default(), "f_x");

    assert!(walked.error.is_none());
    assert_eq!(walked.element.to_definition(), r#""s"|{n: number}"#);
    let rules: Vec<&str> = walked.trail.steps.iter().map(|s| s.rule).collect();
    // After adopting the field move, the walk starts over from the new element.
    assert_eq!(rules, vec!["ROUND-UP", "ROUND-UP", "ROUND-UP", "REMOVE-FIELD"]);
    assert_eq!(walked.trail.accepted_steps().count(), 1);
    Ok(())
}

#[test]
fn errors_keep_the_last_adopted_element() -> Result<()> {
    let oracle: Oracle = Rc::new(Flaky {
        budget: Cell::new(1),
    });
    let start = Type::of(&Value::from(true)).include(&Value::from(1));
    let walked = walk(start, &oracle, RoundUpParameters::default(), "f_x");

    assert_eq!(walked.element.to_definition(), "boolean|1");
    assert!(matches!(
        walked.error,
        Some(InferError::TargetFailed { .. })
    ));
    assert_eq!(walked.trail.steps.len(), 1);
    Ok(())
}

#[test]
fn walk_is_monotonic() -> Result<()> {
    let oracle = Scripted::new(|path, v| path.is_empty() && !v.is_null());
    let start = Type::of(&value("[1]")).include(&Value::from(false));
    let walked = walk(start.clone(), &oracle.oracle(), from_bottom(), "f_x");

    assert!(start.is_subtype_of(&walked.element));
    assert!(!walked.element.accepts(&Value::Null));
    assert!(walked.element.accepts(&Value::from("anything")));
    Ok(())
}

fn from_bottom() -> RoundUpParameters {
    RoundUpParameters {
        round_up_from_bottom: true,
    }
}

#[test]
fn mermaid_marks_rejected_steps() {
    let oracle = Scripted::rejecting();
    let walked = walk(
        Type::of(&Value::from("a")),
        &oracle.oracle(),
        RoundUpParameters::default(),
        "f_s",
    );

    assert_eq!(
        to_mermaid([&walked.trail]),
        "graph BT\nsubgraph f_s\n1[\"'a'\"]\n1-->|\"ROUND-UP\"|2[\"string\"]\nstyle 2 stroke:#f66;\nend\n"
    );
}
