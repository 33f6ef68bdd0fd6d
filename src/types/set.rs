// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ascent, RoundUpParameters, TypeComponent};
use crate::lattice::{Ascents, LatticeElement};
use crate::number::Number;
use crate::validator::{Oracle, Trials};
use crate::value::Value;

use core::fmt;
use std::collections::BTreeSet;
use std::rc::Rc;

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of the random strings tried against an open string domain.
const RANDOM_STRING_LENGTH: usize = 32;

/// A domain too large to enumerate. It is tracked as a set of seen
/// literals until generalized to the whole domain.
pub trait OpenDomain: 'static {
    type Literal: Ord + Clone + fmt::Debug;

    fn literal_of(value: &Value) -> Option<Self::Literal>;
    fn to_value(literal: &Self::Literal) -> Value;
    fn random_literal<R: Rng>(rng: &mut R) -> Self::Literal;

    /// Literal type syntax, JSON-encoded.
    fn render(literal: &Self::Literal) -> String;
    fn name() -> &'static str;
}

pub struct NumberDomain;
pub struct StringDomain;

impl OpenDomain for NumberDomain {
    type Literal = Number;

    fn literal_of(value: &Value) -> Option<Number> {
        match value {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn to_value(literal: &Number) -> Value {
        Value::Number(*literal)
    }

    fn random_literal<R: Rng>(rng: &mut R) -> Number {
        Number::from(rng.gen::<f64>())
    }

    fn render(literal: &Number) -> String {
        literal.format_decimal()
    }

    fn name() -> &'static str {
        "number"
    }
}

impl OpenDomain for StringDomain {
    type Literal = Rc<str>;

    fn literal_of(value: &Value) -> Option<Rc<str>> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn to_value(literal: &Rc<str>) -> Value {
        Value::String(literal.clone())
    }

    fn random_literal<R: Rng>(rng: &mut R) -> Rc<str> {
        let s: String = rng
            .sample_iter(&Alphanumeric)
            .take(RANDOM_STRING_LENGTH)
            .map(char::from)
            .collect();
        s.into()
    }

    fn render(literal: &Rc<str>) -> String {
        serde_json::Value::String(literal.to_string()).to_string()
    }

    fn name() -> &'static str {
        "string"
    }
}

/// Either the whole open domain or the finite set of literals seen so far.
pub enum SetComponent<D: OpenDomain> {
    Open,
    Literals(Rc<BTreeSet<D::Literal>>),
}

impl<D: OpenDomain> SetComponent<D> {
    pub fn literals(&self) -> Option<&BTreeSet<D::Literal>> {
        match self {
            SetComponent::Open => None,
            SetComponent::Literals(set) => Some(set),
        }
    }

    // Draws until it finds a literal outside the set. Only called on a
    // finite set, which cannot exhaust either domain.
    fn literal_not_in_set<R: Rng>(&self, rng: &mut R) -> D::Literal {
        loop {
            let literal = D::random_literal(rng);
            if !self.literals().is_some_and(|set| set.contains(&literal)) {
                return literal;
            }
        }
    }
}

impl<D: OpenDomain> Clone for SetComponent<D> {
    fn clone(&self) -> Self {
        match self {
            SetComponent::Open => SetComponent::Open,
            SetComponent::Literals(set) => SetComponent::Literals(set.clone()),
        }
    }
}

impl<D: OpenDomain> PartialEq for SetComponent<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SetComponent::Open, SetComponent::Open) => true,
            (SetComponent::Literals(a), SetComponent::Literals(b)) => a == b,
            _ => false,
        }
    }
}

impl<D: OpenDomain> fmt::Debug for SetComponent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetComponent::Open => write!(f, "{}", D::name()),
            SetComponent::Literals(set) => f.debug_set().entries(set.iter()).finish(),
        }
    }
}

impl<D: OpenDomain> TypeComponent for SetComponent<D> {
    fn bottom() -> Self {
        SetComponent::Literals(Rc::default())
    }

    fn top() -> Self {
        SetComponent::Open
    }

    fn include(&self, value: &Value) -> Self {
        match (self, D::literal_of(value)) {
            (SetComponent::Literals(set), Some(literal)) if !set.contains(&literal) => {
                let mut set = set.clone();
                Rc::make_mut(&mut set).insert(literal);
                SetComponent::Literals(set)
            }
            _ => self.clone(),
        }
    }

    fn include_type(&self, other: &Self) -> Self {
        match (self, other) {
            (SetComponent::Literals(a), SetComponent::Literals(b)) => {
                let mut merged = a.clone();
                for literal in b.iter() {
                    if !merged.contains(literal) {
                        Rc::make_mut(&mut merged).insert(literal.clone());
                    }
                }
                SetComponent::Literals(merged)
            }
            _ => SetComponent::Open,
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, SetComponent::Open)
    }

    fn is_bottom(&self) -> bool {
        self.literals().is_some_and(|set| set.is_empty())
    }

    fn is_subtype_of(&self, other: &Self) -> bool {
        match (self, other) {
            (_, SetComponent::Open) => true,
            (SetComponent::Open, _) => false,
            (SetComponent::Literals(a), SetComponent::Literals(b)) => a.is_subset(b),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match D::literal_of(value) {
            Some(literal) => match self {
                SetComponent::Open => true,
                SetComponent::Literals(set) => set.contains(&literal),
            },
            None => false,
        }
    }

    fn to_definition(&self) -> Vec<String> {
        match self {
            SetComponent::Open => vec![D::name().to_string()],
            SetComponent::Literals(set) => set.iter().map(D::render).collect(),
        }
    }
}

impl<D: OpenDomain> LatticeElement for SetComponent<D> {
    /// Promotes the set to the whole domain if the target accepts fresh
    /// random literals it has never seen.
    fn ascending_paths<'a>(&'a self, oracle: &Oracle, params: RoundUpParameters) -> Ascents<'a, Self> {
        if self.is_top() || (self.is_bottom() && !params.round_up_from_bottom) {
            return Box::new(core::iter::empty());
        }
        let oracle = oracle.clone();
        Box::new(core::iter::once_with(move || {
            let mut rng = thread_rng();
            let validation = oracle.validate(Trials::Repeated, &mut |_: &Value| {
                D::to_value(&self.literal_not_in_set(&mut rng))
            });
            ascent(SetComponent::Open, validation, "ROUND-UP")
        }))
    }

    fn definition(&self) -> String {
        self.to_definition().join("|")
    }
}
