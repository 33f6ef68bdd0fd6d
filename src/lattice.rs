// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Greedy oracle-gated search up a type lattice.
//!
//! An element offers its ascending paths lazily. The walker adopts the first
//! accepted one and starts over from there until nothing is accepted. There
//! is no backtracking, so different candidate orders may end at different,
//! mutually incomparable fixed points.

use crate::types::RoundUpParameters;
use crate::validator::{Oracle, Validation};
use crate::value::Value;
use crate::{InferError, Result};

use core::fmt::Write;

use tracing::{debug, trace, warn};

/// One generalization move away from an element.
#[derive(Debug, Clone)]
pub struct Ascent<T> {
    pub candidate: T,
    pub accepted: bool,
    /// Name of the move, for the audit trail.
    pub rule: &'static str,
    pub evidence: Vec<Value>,
}

impl<T> Ascent<T> {
    pub fn new(candidate: T, validation: Validation, rule: &'static str) -> Self {
        Self {
            candidate,
            accepted: validation.accepted,
            rule,
            evidence: validation.evidence,
        }
    }

    /// A move taken without asking the oracle.
    pub fn unconditional(candidate: T, rule: &'static str) -> Self {
        Self {
            candidate,
            accepted: true,
            rule,
            evidence: vec![],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Ascent<U> {
        Ascent {
            candidate: f(self.candidate),
            accepted: self.accepted,
            rule: self.rule,
            evidence: self.evidence,
        }
    }
}

/// Lazily generated ascending paths. Oracle calls happen as the iterator is
/// advanced, so candidates after the first accepted one are never checked.
pub type Ascents<'a, T> = Box<dyn Iterator<Item = Result<Ascent<T>>> + 'a>;

pub trait LatticeElement: Sized {
    fn ascending_paths<'a>(&'a self, oracle: &Oracle, params: RoundUpParameters) -> Ascents<'a, Self>;

    /// Rendering used in the audit trail.
    fn definition(&self) -> String;
}

/// A recorded move, accepted or not.
#[derive(Debug, Clone)]
pub struct Step {
    pub rule: &'static str,
    pub definition: String,
    pub accepted: bool,
    pub evidence: Vec<Value>,
}

/// Audit trail of one walk.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    pub identifier: String,
    pub start: String,
    pub steps: Vec<Step>,
}

impl Trail {
    pub fn accepted_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.accepted)
    }

    /// Appends this trail as a Mermaid subgraph. Accepted moves chain from
    /// the start node; rejected candidates hang off the element they were
    /// tried from and are stroked red.
    pub fn write_mermaid(&self, out: &mut String, next_id: &mut usize) -> core::fmt::Result {
        writeln!(out, "subgraph {}", self.identifier)?;
        *next_id += 1;
        let mut current = *next_id;
        writeln!(out, "{current}[\"{}\"]", escape(&self.start))?;
        for step in &self.steps {
            *next_id += 1;
            let id = *next_id;
            writeln!(
                out,
                "{current}-->|\"{}\"|{id}[\"{}\"]",
                step.rule,
                escape(&step.definition)
            )?;
            if step.accepted {
                current = id;
            } else {
                writeln!(out, "style {id} stroke:#f66;")?;
            }
        }
        writeln!(out, "end")
    }
}

/// Renders a set of trails as one Mermaid `graph BT` diagram.
pub fn to_mermaid<'t>(trails: impl IntoIterator<Item = &'t Trail>) -> String {
    let mut out = String::from("graph BT\n");
    let mut next_id = 0;
    for trail in trails {
        // Writing into a String cannot fail.
        let _ = trail.write_mermaid(&mut out, &mut next_id);
    }
    out
}

fn escape(definition: &str) -> String {
    definition.replace('"', "'")
}

/// Result of a walk.
#[derive(Debug)]
pub struct Walk<T> {
    /// The last adopted element.
    pub element: T,
    pub trail: Trail,
    /// Set when candidate generation failed structurally. `element` is then
    /// the last element adopted before the failure.
    pub error: Option<InferError>,
}

enum Next<T> {
    Adopt(T),
    Fixpoint,
    Failed(InferError),
}

/// Walks up from `start` until no ascending path is accepted.
pub fn walk<T: LatticeElement>(
    start: T,
    oracle: &Oracle,
    params: RoundUpParameters,
    identifier: &str,
) -> Walk<T> {
    let mut trail = Trail {
        identifier: identifier.to_string(),
        start: start.definition(),
        steps: vec![],
    };
    let mut current = start;

    loop {
        let next = {
            let mut paths = current.ascending_paths(oracle, params);
            loop {
                match paths.next() {
                    None => break Next::Fixpoint,
                    Some(Err(e)) => break Next::Failed(e),
                    Some(Ok(ascent)) => {
                        let definition = ascent.candidate.definition();
                        if ascent.accepted {
                            debug!("{identifier}: {} -> {definition}", ascent.rule);
                        } else {
                            trace!("{identifier}: rejected {} -> {definition}", ascent.rule);
                        }
                        trail.steps.push(Step {
                            rule: ascent.rule,
                            definition,
                            accepted: ascent.accepted,
                            evidence: ascent.evidence,
                        });
                        if ascent.accepted {
                            break Next::Adopt(ascent.candidate);
                        }
                    }
                }
            }
        };

        match next {
            Next::Adopt(candidate) => current = candidate,
            Next::Fixpoint => {
                return Walk {
                    element: current,
                    trail,
                    error: None,
                }
            }
            Next::Failed(e) => {
                warn!("{identifier}: generalization aborted: {e}");
                return Walk {
                    element: current,
                    trail,
                    error: Some(e),
                };
            }
        }
    }
}
