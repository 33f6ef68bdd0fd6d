// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reader for the tracer's JSON-lines instrumentation output.

use crate::function::{FunctionCalls, FunctionId, ObservedCall, TargetFunction};
use crate::value::Value;
use crate::InferError;

use std::io::BufRead;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum InstrumentationLine {
    FunctionCall {
        tag: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
        #[serde(default, rename = "returnValue", deserialize_with = "present")]
        return_value: Option<serde_json::Value>,
    },
    UnbalancedEntryExit {
        #[serde(flatten)]
        details: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> core::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

enum Lookup<'t> {
    Found(&'t TargetFunction),
    Unknown,
    Ambiguous(usize),
}

fn find_target<'t>(targets: &'t [TargetFunction], tag: &str) -> Lookup<'t> {
    if let Some(target) = targets.iter().find(|t| t.id().to_string() == tag) {
        return Lookup::Found(target);
    }
    let named: Vec<&TargetFunction> = targets.iter().filter(|t| t.name() == tag).collect();
    match named.as_slice() {
        [] => Lookup::Unknown,
        [target] => Lookup::Found(*target),
        _ => Lookup::Ambiguous(named.len()),
    }
}

/// Groups the recorded calls by function, in the order functions were
/// first seen. A tag names a function either by its full
/// `name (location)` identity or by a name no other target shares. Calls
/// whose tag matches several targets are skipped with a warning.
///
/// Each function's parameter list is widened to the longest argument list
/// observed for it. Targets that were never called are reported and left
/// out of the result.
pub fn read_instrumentation_output<R: BufRead>(
    reader: R,
    targets: &[TargetFunction],
) -> Result<Vec<FunctionCalls>> {
    let mut grouped: IndexMap<FunctionId, (TargetFunction, Vec<ObservedCall>)> = IndexMap::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: InstrumentationLine = serde_json::from_str(&line)
            .map_err(InferError::from)
            .with_context(|| format!("malformed instrumentation at line {}", number + 1))?;

        match parsed {
            InstrumentationLine::FunctionCall {
                tag,
                args,
                return_value,
            } => {
                let target = match find_target(targets, &tag) {
                    Lookup::Found(target) => target,
                    Lookup::Unknown => {
                        warn!("calls recorded for unknown function {tag}");
                        continue;
                    }
                    Lookup::Ambiguous(count) => {
                        warn!("{tag} names {count} functions; skipping call at line {}", number + 1);
                        continue;
                    }
                };
                let args = args
                    .iter()
                    .map(Value::from_wire)
                    .collect::<crate::Result<Vec<Value>>>()
                    .with_context(|| format!("cannot ingest call to {tag} at line {}", number + 1))?;
                let return_value = match return_value {
                    Some(raw) => Value::from_wire(&raw)
                        .with_context(|| format!("cannot ingest call to {tag} at line {}", number + 1))?,
                    None => Value::Undefined,
                };
                grouped
                    .entry(target.id().clone())
                    .or_insert_with(|| (target.clone(), vec![]))
                    .1
                    .push(ObservedCall::new(args, return_value));
            }
            InstrumentationLine::UnbalancedEntryExit { details } => {
                let details = serde_json::Value::Object(details).to_string();
                return Err(InferError::UnbalancedEntryExit(details).into());
            }
            InstrumentationLine::Other => (),
        }
    }

    info!("read instrumentation for {} functions", grouped.len());

    let uncalled = targets
        .iter()
        .filter(|t| !grouped.contains_key(t.id()))
        .inspect(|t| info!("{} has no calls and will have no type signature", t.id()))
        .count();
    if uncalled > 0 {
        info!("{uncalled}/{} functions have no calls", targets.len());
    }

    Ok(grouped
        .into_values()
        .map(|(function, calls)| FunctionCalls::new(function, calls))
        .collect())
}

pub fn read_instrumentation_file(path: &str, targets: &[TargetFunction]) -> Result<Vec<FunctionCalls>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open instrumentation output {path}"))?;
    read_instrumentation_output(std::io::BufReader::new(file), targets)
}
