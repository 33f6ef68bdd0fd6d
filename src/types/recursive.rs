// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ascent, RoundUpParameters, Type, TypeComponent};
use crate::lattice::{Ascent, Ascents, LatticeElement};
use crate::validator::{Oracle, Trials};
use crate::value::{PathSegment, Value};

use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A structural value kind whose contents are typed per index or key.
pub trait StructuralKind: 'static {
    type Index: Ord + Clone + fmt::Debug;

    /// Whether the set of indices is fixed. Positional shapes reject values
    /// carrying indices they do not know.
    const POSITIONAL: bool;

    fn segment(index: &Self::Index) -> PathSegment;

    /// The indexed contents of `value`, or `None` for a value of another
    /// kind.
    fn fields_of(value: &Value) -> Option<Vec<(Self::Index, &Value)>>;

    fn lookup<'v>(value: &'v Value, index: &Self::Index) -> Option<&'v Value>;

    /// Indices of `shape` whose removal may be proposed.
    fn removable(fields: &BTreeMap<Self::Index, Field>) -> Vec<Self::Index>;

    fn top_name() -> &'static str;
    fn array_like_name(element: &Type) -> String;
    fn shape_name(fields: &BTreeMap<Self::Index, Field>) -> String;
}

/// Arrays, typed position by position as tuples.
pub struct ArrayKind;

/// Records, typed key by key.
pub struct ObjectKind;

impl StructuralKind for ArrayKind {
    type Index = usize;

    const POSITIONAL: bool = true;

    fn segment(index: &usize) -> PathSegment {
        PathSegment::Index(*index)
    }

    fn fields_of(value: &Value) -> Option<Vec<(usize, &Value)>> {
        match value {
            Value::Array(items) => Some(items.iter().enumerate().collect()),
            _ => None,
        }
    }

    fn lookup<'v>(value: &'v Value, index: &usize) -> Option<&'v Value> {
        match value {
            Value::Array(items) => items.get(*index),
            _ => None,
        }
    }

    // Only the last required position. Dropping an earlier one would shift
    // the meaning of every position after it.
    fn removable(fields: &BTreeMap<usize, Field>) -> Vec<usize> {
        fields
            .iter()
            .rev()
            .find(|(_, field)| !field.optional)
            .map(|(index, _)| *index)
            .into_iter()
            .collect()
    }

    fn top_name() -> &'static str {
        "{}[]"
    }

    fn array_like_name(element: &Type) -> String {
        let definition = element.to_definition();
        if definition.contains('|') {
            format!("({definition})[]")
        } else {
            format!("{definition}[]")
        }
    }

    fn shape_name(fields: &BTreeMap<usize, Field>) -> String {
        let elements: Vec<String> = fields
            .values()
            .map(|field| {
                let optional = if field.optional { "?" } else { "" };
                format!("{}{optional}", field.ty.to_definition())
            })
            .collect();
        format!("[{}]", elements.join(", "))
    }
}

impl StructuralKind for ObjectKind {
    type Index = Rc<str>;

    const POSITIONAL: bool = false;

    fn segment(index: &Rc<str>) -> PathSegment {
        PathSegment::Key(index.clone())
    }

    fn fields_of(value: &Value) -> Option<Vec<(Rc<str>, &Value)>> {
        match value {
            Value::Object(fields) => Some(fields.iter().map(|(k, v)| (k.clone(), v)).collect()),
            _ => None,
        }
    }

    fn lookup<'v>(value: &'v Value, index: &Rc<str>) -> Option<&'v Value> {
        match value {
            Value::Object(fields) => fields.get(index),
            _ => None,
        }
    }

    fn removable(fields: &BTreeMap<Rc<str>, Field>) -> Vec<Rc<str>> {
        fields
            .iter()
            .filter(|(_, field)| !field.optional)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn top_name() -> &'static str {
        "object"
    }

    fn array_like_name(element: &Type) -> String {
        format!("{{[key: string]: {}}}", element.to_definition())
    }

    fn shape_name(fields: &BTreeMap<Rc<str>, Field>) -> String {
        if fields.is_empty() {
            return "object".to_string();
        }
        let members: Vec<String> = fields
            .iter()
            .map(|(key, field)| {
                let optional = if field.optional { "?" } else { "" };
                format!("{}{optional}: {}", property_name(key), field.ty.to_definition())
            })
            .collect();
        format!("{{{}}}", members.join(", "))
    }
}

fn property_name(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        serde_json::Value::String(key.to_string()).to_string()
    }
}

/// The type of one index of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: Type,
    /// The index may be absent or `undefined`.
    pub optional: bool,
}

impl Field {
    pub fn required(ty: Type) -> Self {
        Self {
            ty,
            optional: false,
        }
    }

    fn accepts(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Undefined) if self.optional => true,
            None => false,
            Some(v) => self.ty.accepts(v),
        }
    }

    fn is_subtype_of(&self, other: &Field) -> bool {
        (!self.optional || other.optional) && self.ty.is_subtype_of(&other.ty)
    }
}

/// One observed structural layout, with the value it was observed as.
///
/// The example is kept for replay by field removal. It plays no part in
/// equality.
#[derive(Debug, Clone)]
pub struct Shape<I: Ord> {
    fields: Rc<BTreeMap<I, Field>>,
    example: Value,
}

impl<I: Ord> PartialEq for Shape<I> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<I: Ord + Clone> Shape<I> {
    pub fn new(fields: BTreeMap<I, Field>, example: Value) -> Self {
        Self {
            fields: Rc::new(fields),
            example,
        }
    }

    pub fn fields(&self) -> &BTreeMap<I, Field> {
        &self.fields
    }

    pub fn example(&self) -> &Value {
        &self.example
    }

    fn with_field(&self, index: &I, field: Field) -> Self {
        let mut shape = self.clone();
        Rc::make_mut(&mut shape.fields).insert(index.clone(), field);
        shape
    }

    // Indices present in only one of the shapes become optional.
    fn merge(&self, other: &Self) -> Self {
        let mut fields = BTreeMap::new();
        for (index, field) in self.fields.iter() {
            let merged = match other.fields.get(index) {
                Some(theirs) => Field {
                    ty: field.ty.include_type(&theirs.ty),
                    optional: field.optional || theirs.optional,
                },
                None => Field {
                    ty: field.ty.clone(),
                    optional: true,
                },
            };
            fields.insert(index.clone(), merged);
        }
        for (index, field) in other.fields.iter() {
            if !self.fields.contains_key(index) {
                fields.insert(
                    index.clone(),
                    Field {
                        ty: field.ty.clone(),
                        optional: true,
                    },
                );
            }
        }
        Shape::new(fields, self.example.clone())
    }
}

/// Arrays or records: either any value of the kind, or a union of shapes.
pub enum RecursiveComponent<K: StructuralKind> {
    Top,
    Shapes {
        /// Homogeneous open-length shapes. No move produces these.
        array_like: Rc<Vec<Type>>,
        tuple_like: Rc<Vec<Shape<K::Index>>>,
    },
}

impl<K: StructuralKind> Clone for RecursiveComponent<K> {
    fn clone(&self) -> Self {
        match self {
            RecursiveComponent::Top => RecursiveComponent::Top,
            RecursiveComponent::Shapes {
                array_like,
                tuple_like,
            } => RecursiveComponent::Shapes {
                array_like: array_like.clone(),
                tuple_like: tuple_like.clone(),
            },
        }
    }
}

impl<K: StructuralKind> PartialEq for RecursiveComponent<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecursiveComponent::Top, RecursiveComponent::Top) => true,
            (
                RecursiveComponent::Shapes {
                    array_like: a1,
                    tuple_like: t1,
                },
                RecursiveComponent::Shapes {
                    array_like: a2,
                    tuple_like: t2,
                },
            ) => a1 == a2 && t1 == t2,
            _ => false,
        }
    }
}

impl<K: StructuralKind> fmt::Debug for RecursiveComponent<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition())
    }
}

impl<K: StructuralKind> RecursiveComponent<K> {
    /// A component accepting exactly the values whose every element is of
    /// type `element`.
    pub fn array_like(element: Type) -> Self {
        RecursiveComponent::Shapes {
            array_like: Rc::new(vec![element]),
            tuple_like: Rc::default(),
        }
    }

    pub fn shapes(&self) -> &[Shape<K::Index>] {
        match self {
            RecursiveComponent::Top => &[],
            RecursiveComponent::Shapes { tuple_like, .. } => tuple_like,
        }
    }

    fn array_like_types(&self) -> &[Type] {
        match self {
            RecursiveComponent::Top => &[],
            RecursiveComponent::Shapes { array_like, .. } => array_like,
        }
    }

    // Equal shapes collapse, keeping the first.
    fn from_parts(array_like: Vec<Type>, tuple_like: Vec<Shape<K::Index>>) -> Self {
        let mut unique_arrays: Vec<Type> = vec![];
        for ty in array_like {
            if !unique_arrays.contains(&ty) {
                unique_arrays.push(ty);
            }
        }
        let mut unique_shapes: Vec<Shape<K::Index>> = vec![];
        for shape in tuple_like {
            if !unique_shapes.contains(&shape) {
                unique_shapes.push(shape);
            }
        }
        RecursiveComponent::Shapes {
            array_like: Rc::new(unique_arrays),
            tuple_like: Rc::new(unique_shapes),
        }
    }

    fn with_shape(&self, position: usize, shape: Shape<K::Index>) -> Self {
        let mut tuple_like = self.shapes().to_vec();
        tuple_like[position] = shape;
        Self::from_parts(self.array_like_types().to_vec(), tuple_like)
    }

    fn with_merged(&self, i: usize, j: usize) -> Self {
        let shapes = self.shapes();
        let merged = shapes[i].merge(&shapes[j]);
        let mut tuple_like: Vec<Shape<K::Index>> = shapes
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != i && *k != j)
            .map(|(_, s)| s.clone())
            .collect();
        tuple_like.push(merged);
        Self::from_parts(self.array_like_types().to_vec(), tuple_like)
    }

    fn shape_accepts(shape: &Shape<K::Index>, value: &Value) -> bool {
        let Some(contents) = K::fields_of(value) else {
            return false;
        };
        if K::POSITIONAL && contents.iter().any(|(i, _)| !shape.fields.contains_key(i)) {
            return false;
        }
        shape
            .fields
            .iter()
            .all(|(index, field)| field.accepts(K::lookup(value, index)))
    }

    fn shape_is_subtype_of(shape: &Shape<K::Index>, other: &Shape<K::Index>) -> bool {
        if K::POSITIONAL && shape.fields.keys().any(|i| !other.fields.contains_key(i)) {
            return false;
        }
        other
            .fields
            .iter()
            .all(|(index, theirs)| match shape.fields.get(index) {
                Some(ours) => ours.is_subtype_of(theirs),
                // Record shapes admit any value under keys they do not name.
                None => theirs.optional && (K::POSITIONAL || theirs.ty.is_top()),
            })
    }

    // Moves that generalize one field of one shape, judged by the field's
    // own oracle.
    fn field_paths<'a>(&'a self, oracle: &Oracle, params: RoundUpParameters) -> Ascents<'a, Self> {
        let oracle = oracle.clone();
        Box::new(
            self.shapes()
                .iter()
                .enumerate()
                .flat_map(move |(position, shape)| {
                    let oracle = oracle.clone();
                    shape.fields.iter().flat_map(move |(index, field)| {
                        let lens = oracle.for_sub_expression(K::segment(index));
                        field.ty.ascending_paths(&lens, params).map(move |ascent| {
                            ascent.map(|a| {
                                a.map(|ty| {
                                    let field = Field {
                                        ty,
                                        optional: field.optional,
                                    };
                                    self.with_shape(position, shape.with_field(index, field))
                                })
                            })
                        })
                    })
                }),
        )
    }

    // Moves that make one field optional, judged by replaying the shape's
    // example without it.
    fn removal_paths<'a>(&'a self, oracle: &Oracle) -> Ascents<'a, Self> {
        let oracle = oracle.clone();
        Box::new(
            self.shapes()
                .iter()
                .enumerate()
                .flat_map(|(position, shape)| {
                    K::removable(&shape.fields)
                        .into_iter()
                        .map(move |index| (position, shape, index))
                })
                .map(move |(position, shape, index)| {
                    let stripped = shape.example.without_segment(&K::segment(&index));
                    let validation =
                        oracle.validate(Trials::SingleValue, &mut |_: &Value| stripped.clone());
                    let field = Field {
                        ty: shape.fields[&index].ty.clone(),
                        optional: true,
                    };
                    ascent(
                        self.with_shape(position, shape.with_field(&index, field)),
                        validation,
                        "REMOVE-FIELD",
                    )
                }),
        )
    }

    // Every pair of shapes may be merged. Merges are taken without asking
    // the oracle.
    fn merge_paths<'a>(&'a self) -> Ascents<'a, Self> {
        let count = self.shapes().len();
        Box::new(
            (0..count)
                .flat_map(move |i| (i + 1..count).map(move |j| (i, j)))
                .map(move |(i, j)| Ok(Ascent::unconditional(self.with_merged(i, j), "MERGE-SHAPES"))),
        )
    }
}

impl<K: StructuralKind> TypeComponent for RecursiveComponent<K> {
    fn bottom() -> Self {
        RecursiveComponent::Shapes {
            array_like: Rc::default(),
            tuple_like: Rc::default(),
        }
    }

    fn top() -> Self {
        RecursiveComponent::Top
    }

    fn include(&self, value: &Value) -> Self {
        let (RecursiveComponent::Shapes { .. }, Some(contents)) = (self, K::fields_of(value)) else {
            return self.clone();
        };
        let fields = contents
            .into_iter()
            .map(|(index, v)| (index, Field::required(Type::of(v))))
            .collect();
        let mut tuple_like = self.shapes().to_vec();
        tuple_like.push(Shape::new(fields, value.clone()));
        Self::from_parts(self.array_like_types().to_vec(), tuple_like)
    }

    fn include_type(&self, other: &Self) -> Self {
        if self.is_top() || other.is_top() {
            return RecursiveComponent::Top;
        }
        let array_like = [self.array_like_types(), other.array_like_types()].concat();
        let tuple_like = [self.shapes(), other.shapes()].concat();
        Self::from_parts(array_like, tuple_like)
    }

    fn is_top(&self) -> bool {
        matches!(self, RecursiveComponent::Top)
    }

    fn is_bottom(&self) -> bool {
        !self.is_top() && self.shapes().is_empty() && self.array_like_types().is_empty()
    }

    fn is_subtype_of(&self, other: &Self) -> bool {
        match (self, other) {
            (_, RecursiveComponent::Top) => true,
            (RecursiveComponent::Top, _) => false,
            _ => {
                self.array_like_types().iter().all(|ours| {
                    other
                        .array_like_types()
                        .iter()
                        .any(|theirs| ours.is_subtype_of(theirs))
                }) && self.shapes().iter().all(|ours| {
                    other
                        .shapes()
                        .iter()
                        .any(|theirs| Self::shape_is_subtype_of(ours, theirs))
                })
            }
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        let Some(contents) = K::fields_of(value) else {
            return false;
        };
        if self.is_top() {
            return true;
        }
        self.array_like_types()
            .iter()
            .any(|element| contents.iter().all(|(_, v)| element.accepts(v)))
            || self
                .shapes()
                .iter()
                .any(|shape| Self::shape_accepts(shape, value))
    }

    fn to_definition(&self) -> Vec<String> {
        if self.is_top() {
            return vec![K::top_name().to_string()];
        }
        let mut definitions: Vec<String> = self
            .array_like_types()
            .iter()
            .map(K::array_like_name)
            .chain(self.shapes().iter().map(|s| K::shape_name(&s.fields)))
            .collect();
        definitions.sort();
        definitions.dedup();
        definitions
    }
}

impl<K: StructuralKind> LatticeElement for RecursiveComponent<K> {
    fn ascending_paths<'a>(&'a self, oracle: &Oracle, params: RoundUpParameters) -> Ascents<'a, Self> {
        if self.is_top() {
            return Box::new(core::iter::empty());
        }
        Box::new(
            self.field_paths(oracle, params)
                .chain(self.removal_paths(oracle))
                .chain(self.merge_paths()),
        )
    }

    fn definition(&self) -> String {
        self.to_definition().join("|")
    }
}
