// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::{bail, Result};
use std::rc::Rc;
use typesynth::unstable::*;
use typesynth::*;

fn record(fields: &[(&str, Value)]) -> Value {
    let mut r = Record::new();
    for (k, v) in fields {
        r.insert((*k).into(), v.clone());
    }
    Value::from(r)
}

fn samples() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Undefined,
        Value::from(true),
        Value::from(false),
        Value::from(42),
        Value::from(0.5),
        Value::from("foo"),
        Value::function("f"),
        Value::from(vec![Value::from(1), Value::from("a")]),
        Value::from(vec![]),
        record(&[("a", Value::from(1))]),
        record(&[("b", Value::from(vec![Value::Null]))]),
    ]
}

fn tuple(items: &[Value]) -> Value {
    Value::from(items.to_vec())
}

// Follows moves named by rule and resulting definition. The oracle rejects
// everything, so each move is looked up among the candidates rather than
// taken.
fn walk(start: &Type, moves: &[(&str, &str)]) -> Result<Type> {
    let oracle: Oracle = Rc::new(NoopValidator);
    let mut current = start.clone();
    for (rule, definition) in moves {
        let next = current
            .ascending_paths(&oracle, RoundUpParameters::default())
            .find_map(|ascent| match ascent {
                Ok(a) if a.rule == *rule && a.candidate.to_definition() == *definition => {
                    Some(Ok(a.candidate))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            });
        match next {
            Some(ty) => current = ty?,
            None => bail!("no {rule} move from {current} to {definition}"),
        }
    }
    Ok(current)
}

// Values that tell the shapes in `types()` apart.
fn extra_samples() -> Vec<Value> {
    vec![
        record(&[("x", Value::from(0))]),
        record(&[("x", Value::from(0)), ("y", Value::from(1))]),
        record(&[("x", Value::from(0)), ("y", Value::from("s"))]),
        record(&[("x", Value::from(2)), ("z", Value::from(1))]),
        record(&[("x", Value::from(0)), ("y", Value::Undefined)]),
        tuple(&[Value::from(1)]),
        tuple(&[Value::from(1), Value::from(2)]),
        tuple(&[Value::from(1), Value::from("b")]),
    ]
}

fn types() -> Result<Vec<Type>> {
    let mut types = vec![Type::bottom(), Type::top()];
    for v in samples() {
        types.push(Type::of(&v));
    }
    types.push(samples().iter().fold(Type::bottom(), |t, v| t.include(v)));
    types.push(Type::top().exclude_kinds(&["string", "object"]));

    let xy = record(&[("x", Value::from(0)), ("y", Value::from(1))]);
    let xz = record(&[("x", Value::from(0)), ("z", Value::from(1))]);
    types.push(walk(
        &Type::of(&xy).include(&xz),
        &[("MERGE-SHAPES", "{x: 0, y?: 1, z?: 1}")],
    )?);

    let single = tuple(&[Value::from(1)]);
    let pair = tuple(&[Value::from(1), Value::from(2)]);
    types.push(walk(
        &Type::of(&single).include(&pair),
        &[("MERGE-SHAPES", "[1, 2?]")],
    )?);

    let mixed = tuple(&[Value::from(1), Value::from("a")]);
    types.push(walk(&Type::of(&mixed), &[("REMOVE-FIELD", "[1, \"a\"?]")])?);

    types.push(walk(
        &Type::of(&record(&[("x", Value::from(0))])),
        &[("ROUND-UP", "{x: number}")],
    )?);
    types.push(walk(
        &Type::of(&xy),
        &[
            ("ROUND-UP", "{x: number, y: 1}"),
            ("ROUND-UP", "{x: number, y: number}"),
            ("REMOVE-FIELD", "{x: number, y?: number}"),
        ],
    )?);
    Ok(types)
}

#[test]
fn include_is_monotonic_and_idempotent() -> Result<()> {
    for t in types()? {
        for v in samples() {
            let once = t.include(&v);
            assert!(t.is_subtype_of(&once), "{t} not below {once}");
            assert!(once.accepts(&v), "{once} does not accept {v}");
            assert_eq!(
                once.include(&v).to_definition(),
                once.to_definition(),
                "including {v} twice"
            );
        }
    }
    Ok(())
}

#[test]
fn union_laws() -> Result<()> {
    let all = types()?;
    for t in &all {
        assert_eq!(t.include_type(&Type::bottom()).to_definition(), t.to_definition());
        assert_eq!(t.include_type(&Type::top()).to_definition(), "{}");
        for u in &all {
            let tu = t.include_type(u);
            assert_eq!(tu.to_definition(), u.include_type(t).to_definition());
            assert!(t.is_subtype_of(&tu) && u.is_subtype_of(&tu));
            for w in &all {
                assert_eq!(
                    tu.include_type(w).to_definition(),
                    t.include_type(&u.include_type(w)).to_definition()
                );
            }
        }
    }
    Ok(())
}

#[test]
fn subtyping_is_a_partial_order() -> Result<()> {
    let all = types()?;
    for t in &all {
        assert!(t.is_subtype_of(t));
        assert!(Type::bottom().is_subtype_of(t));
        assert!(t.is_subtype_of(&Type::top()));
        for u in &all {
            if t.is_subtype_of(u) && u.is_subtype_of(t) {
                assert_eq!(t.to_definition(), u.to_definition());
            }
            for w in &all {
                if t.is_subtype_of(u) && u.is_subtype_of(w) {
                    assert!(t.is_subtype_of(w), "{t} <= {u} <= {w}");
                }
            }
        }
    }
    Ok(())
}

#[test]
fn subtyping_agrees_with_acceptance() -> Result<()> {
    let all = types()?;
    let values: Vec<Value> = samples().into_iter().chain(extra_samples()).collect();
    for t in &all {
        for u in &all {
            if !t.is_subtype_of(u) {
                continue;
            }
            for v in &values {
                if t.accepts(v) {
                    assert!(u.accepts(v), "{t} <= {u} but only {t} accepts {v}");
                }
            }
        }
    }
    Ok(())
}

#[test]
fn record_width() -> Result<()> {
    let all = types()?;
    let find = |definition: &str| all.iter().find(|t| t.to_definition() == definition);
    let (Some(wide), Some(narrow), Some(merged)) = (
        find("{x: number}"),
        find("{x: number, y?: number}"),
        find("{x: 0, y?: 1, z?: 1}"),
    ) else {
        bail!("record fixtures missing");
    };

    assert!(narrow.is_subtype_of(wide));
    assert!(!wide.is_subtype_of(narrow));
    assert!(merged.is_subtype_of(wide));

    // A merge keeps the observed layouts but gives up extra keys.
    let xy = record(&[("x", Value::from(0)), ("y", Value::from(1))]);
    let xz = record(&[("x", Value::from(0)), ("z", Value::from(1))]);
    assert!(merged.accepts(&xy) && merged.accepts(&xz));
    assert!(!Type::of(&xy).is_subtype_of(merged));
    Ok(())
}

#[test]
fn extremes() -> Result<()> {
    for v in samples() {
        assert!(!Type::bottom().accepts(&v));
        assert!(Type::top().accepts(&v));
    }
    assert_eq!(Type::bottom().to_definition(), "never");
    assert_eq!(Type::top().to_definition(), "{}");
    assert!(Type::bottom().is_bottom());
    assert!(Type::top().is_top());
    Ok(())
}

#[test]
fn rendering_order() -> Result<()> {
    let t = samples().iter().fold(Type::bottom(), |t, v| t.include(v));
    assert_eq!(
        t.to_definition(),
        "null|undefined|boolean|0.5|42|\"foo\"|((...args: any[]) => any)|[1, \"a\"]|[]|{a: 1}|{b: [null]}"
    );
    Ok(())
}

#[test]
fn optional_fields() -> Result<()> {
    let shape: Shape<Rc<str>> = Shape::new(
        [
            ("a".into(), Field::required(Type::of(&Value::from(1)))),
            (
                "b".into(),
                Field {
                    ty: Type::of(&Value::from("x")),
                    optional: true,
                },
            ),
        ]
        .into_iter()
        .collect(),
        Value::Undefined,
    );
    let component: ObjectComponent = RecursiveComponent::Shapes {
        array_like: Rc::default(),
        tuple_like: Rc::new(vec![shape]),
    };

    assert_eq!(component.to_definition(), vec!["{a: 1, b?: \"x\"}"]);
    assert!(component.accepts(&record(&[("a", Value::from(1))])));
    assert!(component.accepts(&record(&[("a", Value::from(1)), ("b", Value::Undefined)])));
    assert!(component.accepts(&record(&[("a", Value::from(1)), ("b", Value::from("x"))])));
    assert!(!component.accepts(&record(&[("a", Value::from(1)), ("b", Value::from("y"))])));
    assert!(!component.accepts(&record(&[("b", Value::from("x"))])));

    // Requiring `b` narrows the type.
    let required = ObjectComponent::bottom().include(&record(&[
        ("a", Value::from(1)),
        ("b", Value::from("x")),
    ]));
    assert!(required.is_subtype_of(&component));
    assert!(!component.is_subtype_of(&required));
    Ok(())
}

#[test]
fn array_like_shapes() -> Result<()> {
    let numbers = ArrayComponent::array_like(Type::top().exclude_kinds(&[
        "object",
        "undefined",
        "boolean",
        "string",
        "function",
    ]));
    assert_eq!(numbers.to_definition(), vec!["number[]"]);
    assert!(numbers.accepts(&Value::from(vec![])));
    assert!(numbers.accepts(&Value::from(vec![Value::from(1), Value::from(2.5)])));
    assert!(!numbers.accepts(&Value::from(vec![Value::from("a")])));

    let mixed = ArrayComponent::array_like(Type::of(&Value::from(1)).include(&Value::from("a")));
    assert_eq!(mixed.to_definition(), vec!["(1|\"a\")[]"]);

    let values = ObjectComponent::array_like(Type::of(&Value::from(true)));
    assert_eq!(values.to_definition(), vec!["{[key: string]: true}"]);
    assert!(values.accepts(&record(&[("k", Value::from(true))])));
    Ok(())
}

#[test]
fn tuples_are_positional() -> Result<()> {
    let pair = ArrayComponent::bottom().include(&Value::from(vec![Value::from(1), Value::from(2)]));
    let single = ArrayComponent::bottom().include(&Value::from(vec![Value::from(1)]));

    assert!(!pair.accepts(&Value::from(vec![Value::from(1)])));
    assert!(!pair.accepts(&Value::from(vec![
        Value::from(1),
        Value::from(2),
        Value::from(3)
    ])));
    assert!(!pair.is_subtype_of(&single));
    assert!(!single.is_subtype_of(&pair));
    Ok(())
}

#[test]
fn include_kinds_and_exclude_kinds() -> Result<()> {
    let t = Type::bottom().include_kinds(&["object"]);
    assert_eq!(t.to_definition(), "null|{}[]|object");
    let t = t.exclude_kinds(&["object"]);
    assert!(t.is_bottom());

    let t = Type::of(&Value::from(1)).include_kinds(&["boolean"]);
    assert_eq!(t.to_definition(), "boolean|1");
    Ok(())
}

#[test]
fn mermaid_marks_rejected_candidates() -> Result<()> {
    let trail = Trail {
        identifier: "f_x".to_string(),
        start: "\"a\"".to_string(),
        steps: vec![
            Step {
                rule: "ROUND-UP",
                definition: "string".to_string(),
                accepted: false,
                evidence: vec![],
            },
            Step {
                rule: "INCLUDE-VALUE",
                definition: "null|\"a\"".to_string(),
                accepted: true,
                evidence: vec![Value::Null],
            },
        ],
    };
    let other = Trail {
        identifier: "f_y".to_string(),
        start: "1".to_string(),
        steps: vec![],
    };

    assert_eq!(
        to_mermaid([&trail, &other]),
        "graph BT\n\
         subgraph f_x\n\
         1[\"'a'\"]\n\
         1-->|\"ROUND-UP\"|2[\"string\"]\n\
         style 2 stroke:#f66;\n\
         1-->|\"INCLUDE-VALUE\"|3[\"null|'a'\"]\n\
         end\n\
         subgraph f_y\n\
         4[\"1\"]\n\
         end\n"
    );
    assert_eq!(trail.accepted_steps().count(), 1);
    Ok(())
}
