//! Structural decomposition of values into comparable shapes.
//!
//! The comparer never reflects over types: a value opts into deep
//! comparison by implementing [`Inspect`], which records its structure as a
//! [`Shape`] tree of scalars, sequences, maps, and named structures.
//! Back-references through `Rc`/`Arc`/`RefCell` are detected by the
//! [`Recorder`], which tracks the identity of every ancestor on the current
//! path and emits [`Shape::Cycle`] on re-entry, so decomposition of cyclic
//! graphs always terminates.
//!
//! Implementations are provided for primitives, strings, options, common
//! containers, smart pointers, and (with the `json` feature)
//! `serde_json::Value`. For your own structs the [`structure!`] macro keeps
//! the impl to one expression:
//!
//! ```rust,ignore
//! use attest::{structure, Inspect, Recorder, Shape};
//!
//! struct Point { x: i32, y: i32 }
//!
//! impl Inspect for Point {
//!     fn inspect(&self, rec: &mut Recorder) -> Shape {
//!         structure!(rec, "Point", { x: &self.x, y: &self.y })
//!     }
//! }
//! ```
//!
//! [`structure!`]: crate::structure

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// A leaf value. Scalars are compared by value and never descended into.
#[derive(Debug, Clone)]
pub enum Scalar {
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Char(char),
    Str(String),
}

impl Scalar {
    /// Value equality with numeric widening across signed/unsigned integers.
    /// Floats follow equality semantics where NaN equals NaN; integers never
    /// equal floats.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Uint(a), Scalar::Uint(b)) => a == b,
            (Scalar::Int(a), Scalar::Uint(b)) | (Scalar::Uint(b), Scalar::Int(a)) => {
                i128::try_from(*b).map(|b| *a == b).unwrap_or(false)
            }
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }

    /// Numeric view, for tolerance-style custom comparers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Uint(u) => Some(*u as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Uint(u) => write!(f, "{u}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Char(c) => write!(f, "{c:?}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A recorded snapshot of a value's structure.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Absent value (`None`, JSON null, dangling `Weak`).
    Null,
    Scalar(Scalar),
    Sequence(Vec<Shape>),
    /// Keyed entries, sorted by rendered key.
    Map(Vec<(String, Shape)>),
    /// Named fields of a struct, in declaration order.
    Structure {
        type_name: String,
        fields: Vec<(String, Shape)>,
    },
    /// A back-reference to an ancestor on the decomposition path.
    Cycle,
}

impl Shape {
    /// Compact single-line rendering for failure messages.
    pub fn describe(&self) -> String {
        match self {
            Shape::Null => "null".to_string(),
            Shape::Scalar(scalar) => scalar.to_string(),
            Shape::Sequence(items) => {
                let rendered: Vec<String> = items.iter().map(Shape::describe).collect();
                format!("[{}]", rendered.join(", "))
            }
            Shape::Map(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("[{key}] = {}", value.describe()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Shape::Structure { type_name, fields } => {
                if fields.is_empty() {
                    format!("{type_name} {{}}")
                } else {
                    let rendered: Vec<String> = fields
                        .iter()
                        .map(|(name, value)| format!("{name}: {}", value.describe()))
                        .collect();
                    format!("{type_name} {{ {} }}", rendered.join(", "))
                }
            }
            Shape::Cycle => "<cycle>".to_string(),
        }
    }
}

/// Threads the ancestor-identity path through a decomposition.
pub struct Recorder {
    ancestors: Vec<usize>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            ancestors: Vec::new(),
        }
    }

    /// Record a child value's shape, emitting [`Shape::Cycle`] if the value
    /// is an ancestor of itself on the current path.
    pub fn child(&mut self, value: &dyn Inspect) -> Shape {
        match value.identity() {
            Some(id) if self.ancestors.contains(&id) => Shape::Cycle,
            Some(id) => {
                self.ancestors.push(id);
                let shape = value.inspect(self);
                self.ancestors.pop();
                shape
            }
            None => value.inspect(self),
        }
    }
}

/// Decompose a value into its [`Shape`].
pub fn shape_of(value: &dyn Inspect) -> Shape {
    Recorder::new().child(value)
}

/// Structural decomposition: how a value describes itself to the
/// equivalence comparer.
pub trait Inspect {
    /// A stable address used to detect back-references. Plain values return
    /// `None`; shared/interior-mutable containers return their allocation
    /// address.
    fn identity(&self) -> Option<usize> {
        None
    }

    /// Record this value's structure. Nested values must be recorded
    /// through [`Recorder::child`] so cycle detection stays on the path.
    fn inspect(&self, rec: &mut Recorder) -> Shape;
}

/// Record a named structure shape from a [`Recorder`] and a field list.
///
/// # Example
///
/// ```rust,ignore
/// impl Inspect for Account {
///     fn inspect(&self, rec: &mut Recorder) -> Shape {
///         structure!(rec, "Account", { id: &self.id, owner: &self.owner })
///     }
/// }
/// ```
#[macro_export]
macro_rules! structure {
    ($rec:expr, $name:expr, { $($field:ident : $value:expr),* $(,)? }) => {
        $crate::equivalence::Shape::Structure {
            type_name: ($name).to_string(),
            fields: vec![
                $( (stringify!($field).to_string(), $rec.child($value)) ),*
            ],
        }
    };
}

macro_rules! inspect_signed {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self, _rec: &mut Recorder) -> Shape {
                    Shape::Scalar(Scalar::Int(*self as i128))
                }
            }
        )*
    };
}

macro_rules! inspect_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self, _rec: &mut Recorder) -> Shape {
                    Shape::Scalar(Scalar::Uint(*self as u128))
                }
            }
        )*
    };
}

inspect_signed!(i8, i16, i32, i64, i128, isize);
inspect_unsigned!(u8, u16, u32, u64, u128, usize);

impl Inspect for f32 {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Float(f64::from(*self)))
    }
}

impl Inspect for f64 {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Float(*self))
    }
}

impl Inspect for bool {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Bool(*self))
    }
}

impl Inspect for char {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Char(*self))
    }
}

impl Inspect for str {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Str(self.to_string()))
    }
}

impl Inspect for String {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Str(self.clone()))
    }
}

impl Inspect for chrono::DateTime<chrono::Utc> {
    fn inspect(&self, _rec: &mut Recorder) -> Shape {
        Shape::Scalar(Scalar::Str(self.to_rfc3339()))
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn identity(&self) -> Option<usize> {
        (**self).identity()
    }

    fn inspect(&self, rec: &mut Recorder) -> Shape {
        (**self).inspect(rec)
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn identity(&self) -> Option<usize> {
        (**self).identity()
    }

    fn inspect(&self, rec: &mut Recorder) -> Shape {
        (**self).inspect(rec)
    }
}

impl<T: Inspect> Inspect for Rc<T> {
    fn identity(&self) -> Option<usize> {
        Some(Rc::as_ptr(self).cast::<()>() as usize)
    }

    fn inspect(&self, rec: &mut Recorder) -> Shape {
        (**self).inspect(rec)
    }
}

impl<T: Inspect> Inspect for Arc<T> {
    fn identity(&self) -> Option<usize> {
        Some(Arc::as_ptr(self).cast::<()>() as usize)
    }

    fn inspect(&self, rec: &mut Recorder) -> Shape {
        (**self).inspect(rec)
    }
}

impl<T: Inspect> Inspect for std::rc::Weak<T> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        match self.upgrade() {
            Some(strong) => rec.child(&strong),
            None => Shape::Null,
        }
    }
}

impl<T: Inspect> Inspect for std::sync::Weak<T> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        match self.upgrade() {
            Some(strong) => rec.child(&strong),
            None => Shape::Null,
        }
    }
}

impl<T: Inspect> Inspect for RefCell<T> {
    fn identity(&self) -> Option<usize> {
        Some(self as *const Self as *const () as usize)
    }

    fn inspect(&self, rec: &mut Recorder) -> Shape {
        self.borrow().inspect(rec)
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        match self {
            Some(value) => rec.child(value),
            None => Shape::Null,
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        let mut items = Vec::with_capacity(self.len());
        for item in self {
            items.push(rec.child(item));
        }
        Shape::Sequence(items)
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        self.as_slice().inspect(rec)
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        self.as_slice().inspect(rec)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        let mut items = Vec::with_capacity(self.len());
        for item in self {
            items.push(rec.child(item));
        }
        Shape::Sequence(items)
    }
}

impl<A: Inspect, B: Inspect> Inspect for (A, B) {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        Shape::Sequence(vec![rec.child(&self.0), rec.child(&self.1)])
    }
}

impl<A: Inspect, B: Inspect, C: Inspect> Inspect for (A, B, C) {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        Shape::Sequence(vec![
            rec.child(&self.0),
            rec.child(&self.1),
            rec.child(&self.2),
        ])
    }
}

impl<A: Inspect, B: Inspect, C: Inspect, D: Inspect> Inspect for (A, B, C, D) {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        Shape::Sequence(vec![
            rec.child(&self.0),
            rec.child(&self.1),
            rec.child(&self.2),
            rec.child(&self.3),
        ])
    }
}

impl<K: fmt::Display, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        let mut entries = Vec::with_capacity(self.len());
        for (key, value) in self {
            entries.push((key.to_string(), rec.child(value)));
        }
        Shape::Map(entries)
    }
}

impl<K: fmt::Display, V: Inspect, S: BuildHasher> Inspect for HashMap<K, V, S> {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        let mut entries: Vec<(String, Shape)> = Vec::with_capacity(self.len());
        for (key, value) in self {
            entries.push((key.to_string(), rec.child(value)));
        }
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Shape::Map(entries)
    }
}

#[cfg(feature = "json")]
impl Inspect for serde_json::Value {
    fn inspect(&self, rec: &mut Recorder) -> Shape {
        match self {
            serde_json::Value::Null => Shape::Null,
            serde_json::Value::Bool(b) => Shape::Scalar(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Shape::Scalar(Scalar::Int(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Shape::Scalar(Scalar::Uint(u128::from(u)))
                } else {
                    Shape::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Shape::Scalar(Scalar::Str(s.clone())),
            serde_json::Value::Array(items) => {
                let mut shapes = Vec::with_capacity(items.len());
                for item in items {
                    shapes.push(rec.child(item));
                }
                Shape::Sequence(shapes)
            }
            serde_json::Value::Object(entries) => {
                let mut shapes = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    shapes.push((key.clone(), rec.child(value)));
                }
                Shape::Map(shapes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shapes() {
        assert!(matches!(shape_of(&5i32), Shape::Scalar(Scalar::Int(5))));
        assert!(matches!(shape_of(&5u8), Shape::Scalar(Scalar::Uint(5))));
        assert!(matches!(shape_of(&true), Shape::Scalar(Scalar::Bool(true))));
        assert!(matches!(shape_of(&"hi"), Shape::Scalar(Scalar::Str(_))));
    }

    #[test]
    fn test_cross_width_integer_match() {
        assert!(Scalar::Int(3).matches(&Scalar::Uint(3)));
        assert!(!Scalar::Int(-1).matches(&Scalar::Uint(1)));
        assert!(!Scalar::Int(3).matches(&Scalar::Float(3.0)));
    }

    #[test]
    fn test_nan_matches_nan() {
        assert!(Scalar::Float(f64::NAN).matches(&Scalar::Float(f64::NAN)));
        assert!(!Scalar::Float(f64::NAN).matches(&Scalar::Float(0.0)));
    }

    #[test]
    fn test_option_and_sequence_shapes() {
        let none: Option<i32> = None;
        assert!(matches!(shape_of(&none), Shape::Null));

        match shape_of(&vec![1, 2, 3]) {
            Shape::Sequence(items) => assert_eq!(items.len(), 3),
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_structure_macro() {
        struct Point {
            x: i32,
            y: i32,
        }

        impl Inspect for Point {
            fn inspect(&self, rec: &mut Recorder) -> Shape {
                structure!(rec, "Point", { x: &self.x, y: &self.y })
            }
        }

        match shape_of(&Point { x: 1, y: 2 }) {
            Shape::Structure { type_name, fields } => {
                assert_eq!(type_name, "Point");
                assert_eq!(fields[0].0, "x");
                assert_eq!(fields[1].0, "y");
            }
            other => panic!("expected a structure, got {other:?}"),
        }
    }

    #[test]
    fn test_back_reference_becomes_cycle_marker() {
        struct Node {
            value: i32,
            parent: Option<std::rc::Weak<RefCell<Node>>>,
            children: Vec<Rc<RefCell<Node>>>,
        }

        impl Inspect for Node {
            fn inspect(&self, rec: &mut Recorder) -> Shape {
                structure!(rec, "Node", {
                    value: &self.value,
                    parent: &self.parent,
                    children: &self.children,
                })
            }
        }

        let parent = Rc::new(RefCell::new(Node {
            value: 1,
            parent: None,
            children: Vec::new(),
        }));
        let child = Rc::new(RefCell::new(Node {
            value: 2,
            parent: Some(Rc::downgrade(&parent)),
            children: Vec::new(),
        }));
        parent.borrow_mut().children.push(Rc::clone(&child));

        // Terminates, and the back-reference shows up as a cycle marker.
        let shape = shape_of(&parent);
        let rendered = format!("{shape:?}");
        assert!(rendered.contains("Cycle"));
    }

    #[test]
    fn test_describe_rendering() {
        assert_eq!(shape_of(&vec![1, 2]).describe(), "[1, 2]");
        assert_eq!(shape_of(&Some("a")).describe(), "\"a\"");
        let none: Option<i32> = None;
        assert_eq!(shape_of(&none).describe(), "null");
    }
}
