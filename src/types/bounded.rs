// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ascent, RoundUpParameters, TypeComponent};
use crate::lattice::{Ascents, LatticeElement};
use crate::validator::{Oracle, Trials};
use crate::value::{FunctionValue, Value};

use core::fmt;
use core::marker::PhantomData;

/// A finite domain small enough to enumerate.
pub trait BoundedDomain: 'static {
    /// Number of values in the domain; at most 8.
    const SIZE: usize;

    /// Position of `value` in the domain, if it belongs to it.
    fn index_of(value: &Value) -> Option<usize>;

    /// The literal substituted when probing whether position `index` is
    /// accepted.
    fn value_at(index: usize) -> Value;

    fn name_for(index: usize) -> String;

    /// Rendering of the whole domain.
    fn name() -> String;
}

pub struct NullDomain;
pub struct UndefinedDomain;
pub struct BooleanDomain;

/// Every function is one value: the model only tracks whether callables
/// are accepted, never which ones.
pub struct FunctionDomain;

impl BoundedDomain for NullDomain {
    const SIZE: usize = 1;

    fn index_of(value: &Value) -> Option<usize> {
        value.is_null().then_some(0)
    }

    fn value_at(_index: usize) -> Value {
        Value::Null
    }

    fn name_for(_index: usize) -> String {
        Self::name()
    }

    fn name() -> String {
        "null".to_string()
    }
}

impl BoundedDomain for UndefinedDomain {
    const SIZE: usize = 1;

    fn index_of(value: &Value) -> Option<usize> {
        value.is_undefined().then_some(0)
    }

    fn value_at(_index: usize) -> Value {
        Value::Undefined
    }

    fn name_for(_index: usize) -> String {
        Self::name()
    }

    fn name() -> String {
        "undefined".to_string()
    }
}

impl BoundedDomain for BooleanDomain {
    const SIZE: usize = 2;

    fn index_of(value: &Value) -> Option<usize> {
        match value {
            Value::Bool(b) => Some(usize::from(*b)),
            _ => None,
        }
    }

    fn value_at(index: usize) -> Value {
        Value::Bool(index == 1)
    }

    fn name_for(index: usize) -> String {
        (index == 1).to_string()
    }

    fn name() -> String {
        "boolean".to_string()
    }
}

impl BoundedDomain for FunctionDomain {
    const SIZE: usize = 1;

    fn index_of(value: &Value) -> Option<usize> {
        matches!(value, Value::Function(_)).then_some(0)
    }

    fn value_at(_index: usize) -> Value {
        Value::Function(FunctionValue::identity())
    }

    fn name_for(_index: usize) -> String {
        Self::name()
    }

    fn name() -> String {
        "((...args: any[]) => any)".to_string()
    }
}

/// Membership over a [`BoundedDomain`], one bit per domain value.
pub struct BoundedValueComponent<D: BoundedDomain> {
    allowed: u8,
    domain: PhantomData<D>,
}

impl<D: BoundedDomain> BoundedValueComponent<D> {
    const ALL: u8 = ((1u16 << D::SIZE) - 1) as u8;

    fn with_allowed(allowed: u8) -> Self {
        Self {
            allowed,
            domain: PhantomData,
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.allowed & (1 << index) != 0
    }

    fn with_index(&self, index: usize) -> Self {
        Self::with_allowed(self.allowed | (1 << index))
    }
}

impl<D: BoundedDomain> Clone for BoundedValueComponent<D> {
    fn clone(&self) -> Self {
        Self::with_allowed(self.allowed)
    }
}

impl<D: BoundedDomain> PartialEq for BoundedValueComponent<D> {
    fn eq(&self, other: &Self) -> bool {
        self.allowed == other.allowed
    }
}

impl<D: BoundedDomain> fmt::Debug for BoundedValueComponent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition())
    }
}

impl<D: BoundedDomain> TypeComponent for BoundedValueComponent<D> {
    fn bottom() -> Self {
        Self::with_allowed(0)
    }

    fn top() -> Self {
        Self::with_allowed(Self::ALL)
    }

    fn include(&self, value: &Value) -> Self {
        match D::index_of(value) {
            Some(index) => self.with_index(index),
            None => self.clone(),
        }
    }

    fn include_type(&self, other: &Self) -> Self {
        Self::with_allowed(self.allowed | other.allowed)
    }

    fn is_top(&self) -> bool {
        self.allowed == Self::ALL
    }

    fn is_bottom(&self) -> bool {
        self.allowed == 0
    }

    fn is_subtype_of(&self, other: &Self) -> bool {
        self.allowed & !other.allowed == 0
    }

    fn accepts(&self, value: &Value) -> bool {
        D::index_of(value).is_some_and(|index| self.contains(index))
    }

    fn to_definition(&self) -> Vec<String> {
        if self.is_top() {
            return vec![D::name()];
        }
        (0..D::SIZE)
            .filter(|i| self.contains(*i))
            .map(D::name_for)
            .collect()
    }
}

impl<D: BoundedDomain> LatticeElement for BoundedValueComponent<D> {
    /// One candidate per domain value not yet accepted, each checked with a
    /// single call substituting that literal.
    fn ascending_paths<'a>(&'a self, oracle: &Oracle, params: RoundUpParameters) -> Ascents<'a, Self> {
        if self.is_bottom() && !params.round_up_from_bottom {
            return Box::new(core::iter::empty());
        }
        let oracle = oracle.clone();
        Box::new(
            (0..D::SIZE)
                .filter(move |i| !self.contains(*i))
                .map(move |i| {
                    let literal = D::value_at(i);
                    let validation =
                        oracle.validate(Trials::SingleValue, &mut |_: &Value| literal.clone());
                    ascent(self.with_index(i), validation, "INCLUDE-VALUE")
                }),
        )
    }

    fn definition(&self) -> String {
        self.to_definition().join("|")
    }
}
