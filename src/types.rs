// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The type lattice.
//!
//! A [`Type`] is a fixed product of eight independent components, one per
//! [`Kind`]. Every operation returns a new value; nothing is mutated in
//! place, so types can be shared freely between walks.

mod bounded;
mod recursive;
mod set;

pub use bounded::*;
pub use recursive::*;
pub use set::*;

use crate::kind::Kind;
use crate::lattice::{Ascent, Ascents, LatticeElement};
use crate::options::InferenceOptions;
use crate::validator::Oracle;
use crate::value::Value;

use core::fmt;

/// Knobs that change which moves a component offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundUpParameters {
    /// Offer moves out of a bottom component.
    pub round_up_from_bottom: bool,
}

impl From<&InferenceOptions> for RoundUpParameters {
    fn from(options: &InferenceOptions) -> Self {
        Self {
            round_up_from_bottom: options.round_up_from_bottom,
        }
    }
}

/// One sub-lattice of a [`Type`].
///
/// `include` and `include_type` are monotonic: the result is never a
/// subtype of anything the input was not already a subtype of.
pub trait TypeComponent: LatticeElement + Clone + PartialEq + fmt::Debug {
    fn bottom() -> Self;
    fn top() -> Self;

    /// Adds one observed value. Values of another kind are ignored.
    fn include(&self, value: &Value) -> Self;
    fn include_type(&self, other: &Self) -> Self;

    fn is_top(&self) -> bool;
    fn is_bottom(&self) -> bool;
    fn is_subtype_of(&self, other: &Self) -> bool;
    fn accepts(&self, value: &Value) -> bool;

    /// Alternatives contributed to a union, in rendering order.
    fn to_definition(&self) -> Vec<String>;
}

pub type NullComponent = BoundedValueComponent<NullDomain>;
pub type UndefinedComponent = BoundedValueComponent<UndefinedDomain>;
pub type BooleanComponent = BoundedValueComponent<BooleanDomain>;
pub type FunctionComponent = BoundedValueComponent<FunctionDomain>;
pub type NumberComponent = SetComponent<NumberDomain>;
pub type StringComponent = SetComponent<StringDomain>;
pub type ArrayComponent = RecursiveComponent<ArrayKind>;
pub type ObjectComponent = RecursiveComponent<ObjectKind>;

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub null: NullComponent,
    pub undefined: UndefinedComponent,
    pub boolean: BooleanComponent,
    pub number: NumberComponent,
    pub string: StringComponent,
    pub function: FunctionComponent,
    pub array: ArrayComponent,
    pub object: ObjectComponent,
}

impl Default for Type {
    fn default() -> Self {
        Type::bottom()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_definition())
    }
}

impl Type {
    /// Accepts nothing.
    pub fn bottom() -> Self {
        Self {
            null: TypeComponent::bottom(),
            undefined: TypeComponent::bottom(),
            boolean: TypeComponent::bottom(),
            number: TypeComponent::bottom(),
            string: TypeComponent::bottom(),
            function: TypeComponent::bottom(),
            array: TypeComponent::bottom(),
            object: TypeComponent::bottom(),
        }
    }

    /// Accepts everything.
    pub fn top() -> Self {
        Self {
            null: TypeComponent::top(),
            undefined: TypeComponent::top(),
            boolean: TypeComponent::top(),
            number: TypeComponent::top(),
            string: TypeComponent::top(),
            function: TypeComponent::top(),
            array: TypeComponent::top(),
            object: TypeComponent::top(),
        }
    }

    /// The most specific type containing exactly `value`.
    pub fn of(value: &Value) -> Self {
        Type::bottom().include(value)
    }

    pub fn include(&self, value: &Value) -> Self {
        let mut t = self.clone();
        match value.kind() {
            Kind::Null => t.null = t.null.include(value),
            Kind::Undefined => t.undefined = t.undefined.include(value),
            Kind::Boolean => t.boolean = t.boolean.include(value),
            Kind::Number => t.number = t.number.include(value),
            Kind::String => t.string = t.string.include(value),
            Kind::Function => t.function = t.function.include(value),
            Kind::Array => t.array = t.array.include(value),
            Kind::Object => t.object = t.object.include(value),
        }
        t
    }

    pub fn include_type(&self, other: &Type) -> Self {
        Self {
            null: self.null.include_type(&other.null),
            undefined: self.undefined.include_type(&other.undefined),
            boolean: self.boolean.include_type(&other.boolean),
            number: self.number.include_type(&other.number),
            string: self.string.include_type(&other.string),
            function: self.function.include_type(&other.function),
            array: self.array.include_type(&other.array),
            object: self.object.include_type(&other.object),
        }
    }

    pub fn is_top(&self) -> bool {
        self.null.is_top()
            && self.undefined.is_top()
            && self.boolean.is_top()
            && self.number.is_top()
            && self.string.is_top()
            && self.function.is_top()
            && self.array.is_top()
            && self.object.is_top()
    }

    pub fn is_bottom(&self) -> bool {
        self.null.is_bottom()
            && self.undefined.is_bottom()
            && self.boolean.is_bottom()
            && self.number.is_bottom()
            && self.string.is_bottom()
            && self.function.is_bottom()
            && self.array.is_bottom()
            && self.object.is_bottom()
    }

    pub fn is_subtype_of(&self, other: &Type) -> bool {
        self.null.is_subtype_of(&other.null)
            && self.undefined.is_subtype_of(&other.undefined)
            && self.boolean.is_subtype_of(&other.boolean)
            && self.number.is_subtype_of(&other.number)
            && self.string.is_subtype_of(&other.string)
            && self.function.is_subtype_of(&other.function)
            && self.array.is_subtype_of(&other.array)
            && self.object.is_subtype_of(&other.object)
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match value.kind() {
            Kind::Null => self.null.accepts(value),
            Kind::Undefined => self.undefined.accepts(value),
            Kind::Boolean => self.boolean.accepts(value),
            Kind::Number => self.number.accepts(value),
            Kind::String => self.string.accepts(value),
            Kind::Function => self.function.accepts(value),
            Kind::Array => self.array.accepts(value),
            Kind::Object => self.object.accepts(value),
        }
    }

    pub fn to_definition(&self) -> String {
        if self.is_top() {
            return "{}".to_string();
        }

        let alternatives: Vec<String> = [
            self.null.to_definition(),
            self.undefined.to_definition(),
            self.boolean.to_definition(),
            self.number.to_definition(),
            self.string.to_definition(),
            self.function.to_definition(),
            self.array.to_definition(),
            self.object.to_definition(),
        ]
        .concat();

        if alternatives.is_empty() {
            "never".to_string()
        } else {
            alternatives.join("|")
        }
    }

    /// Raises every kind covered by the given `typeof` tags to top.
    pub fn include_kinds<S: AsRef<str>>(&self, tags: &[S]) -> Self {
        let mut t = self.clone();
        for kind in covered_kinds(tags) {
            t.set_component_extreme(kind, true);
        }
        t
    }

    /// Lowers every kind covered by the given `typeof` tags to bottom.
    pub fn exclude_kinds<S: AsRef<str>>(&self, tags: &[S]) -> Self {
        let mut t = self.clone();
        for kind in covered_kinds(tags) {
            t.set_component_extreme(kind, false);
        }
        t
    }

    fn set_component_extreme(&mut self, kind: Kind, top: bool) {
        fn pick<C: TypeComponent>(top: bool) -> C {
            if top {
                C::top()
            } else {
                C::bottom()
            }
        }
        match kind {
            Kind::Null => self.null = pick(top),
            Kind::Undefined => self.undefined = pick(top),
            Kind::Boolean => self.boolean = pick(top),
            Kind::Number => self.number = pick(top),
            Kind::String => self.string = pick(top),
            Kind::Function => self.function = pick(top),
            Kind::Array => self.array = pick(top),
            Kind::Object => self.object = pick(top),
        }
    }
}

fn covered_kinds<S: AsRef<str>>(tags: &[S]) -> impl Iterator<Item = Kind> + '_ {
    tags.iter()
        .flat_map(|tag| Kind::from_typeof_tag(tag.as_ref()).iter().copied())
}

// Lifts the moves of one component into moves of the whole type, holding
// the other components fixed.
fn lift<'a, C: 'a>(paths: Ascents<'a, C>, into: impl Fn(C) -> Type + 'a) -> Ascents<'a, Type> {
    Box::new(paths.map(move |ascent| ascent.map(|a| a.map(&into))))
}

impl LatticeElement for Type {
    fn ascending_paths<'a>(
        &'a self,
        oracle: &Oracle,
        params: RoundUpParameters,
    ) -> Ascents<'a, Type> {
        let paths = lift(self.null.ascending_paths(oracle, params), move |c| Type {
            null: c,
            ..self.clone()
        })
        .chain(lift(
            self.undefined.ascending_paths(oracle, params),
            move |c| Type {
                undefined: c,
                ..self.clone()
            },
        ))
        .chain(lift(self.boolean.ascending_paths(oracle, params), move |c| {
            Type {
                boolean: c,
                ..self.clone()
            }
        }))
        .chain(lift(self.number.ascending_paths(oracle, params), move |c| {
            Type {
                number: c,
                ..self.clone()
            }
        }))
        .chain(lift(self.string.ascending_paths(oracle, params), move |c| {
            Type {
                string: c,
                ..self.clone()
            }
        }))
        .chain(lift(self.function.ascending_paths(oracle, params), move |c| {
            Type {
                function: c,
                ..self.clone()
            }
        }))
        .chain(lift(self.array.ascending_paths(oracle, params), move |c| {
            Type {
                array: c,
                ..self.clone()
            }
        }))
        .chain(lift(self.object.ascending_paths(oracle, params), move |c| {
            Type {
                object: c,
                ..self.clone()
            }
        }));
        Box::new(paths)
    }

    fn definition(&self) -> String {
        self.to_definition()
    }
}

/// Candidate constructor shared by the component implementations.
pub(crate) fn ascent<T>(
    candidate: T,
    validation: crate::Result<crate::validator::Validation>,
    rule: &'static str,
) -> crate::Result<Ascent<T>> {
    Ok(Ascent::new(candidate, validation?, rule))
}
