//! The dynamic value model carried by every entry.
//!
//! Sequences are keyed by and carry [`Value`]s: a closed tagged union over
//! null, booleans, numbers, strings, lists, ordered maps and opaque object
//! handles. Callbacks receive `&Value` and return `Value`, so any mix of data
//! can flow through one pipeline.
//!
//! Two kinds of comparison are offered:
//! - `==` (derived [`PartialEq`]) is *strict*: `Int(1) != Float(1.0)` and two
//!   handles are equal only when they point to the same object.
//! - [`Value::compare`] is a *total loose ordering* used for sorting:
//!   numbers compare numerically across `Int`/`Float`, other kinds compare
//!   within their kind and by a fixed kind rank across kinds.

use crate::sequence::Entry;
use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque, shared reference to an arbitrary object.
///
/// Handles compare and hash by identity. A handle wrapping a [`Value`] is
/// transparent to path lookups (see [`Value::pluck`]).
#[derive(Clone)]
pub struct Handle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Handle {
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self {
            inner: Arc::new(object),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>", self.type_name)
    }
}

/// A dynamically typed value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    /// Values keyed `0..n`.
    List(Vec<Value>),
    /// Ordered key/value pairs whose keys are not exactly `0..n`.
    Map(Vec<(Value, Value)>),
    Handle(Handle),
}

impl Value {
    pub fn float(f: f64) -> Self {
        Self::Float(OrderedFloat(f))
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a keyed value from pairs; see [`Value::from_entries`].
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::from_entries(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a container from entries, in canonical form.
    ///
    /// Entries keyed exactly `0, 1, .., n-1` in that order become a `List`;
    /// anything else (including duplicate keys) stays a `Map`.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let sequential = entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| matches!(k, Value::Int(n) if usize::try_from(*n) == Ok(i)));
        if sequential {
            Self::List(entries.into_iter().map(|(_, v)| v).collect())
        } else {
            Self::Map(entries)
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Handle(h) => h.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Boolean interpretation: null, `false`, zero, `""`, `"0"` and empty
    /// containers are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => f.0 != 0.0,
            Self::Str(s) => !(s.is_empty() || s == "0"),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
            Self::Handle(_) => true,
        }
    }

    /// `true` for lists, maps and handles wrapping one of those.
    pub fn is_container(&self) -> bool {
        match self {
            Self::List(_) | Self::Map(_) => true,
            Self::Handle(h) => h.downcast_ref::<Value>().is_some_and(Value::is_container),
            _ => false,
        }
    }

    /// The entries of a container, `None` for scalars.
    pub fn entries(&self) -> Option<Vec<Entry>> {
        match self {
            Self::List(items) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (Value::from(i), v.clone()))
                    .collect(),
            ),
            Self::Map(pairs) => Some(pairs.clone()),
            Self::Handle(h) => h.downcast_ref::<Value>().and_then(Value::entries),
            _ => None,
        }
    }

    /// The values of a container in order, `None` for scalars.
    pub fn values(&self) -> Option<Vec<Value>> {
        match self {
            Self::List(items) => Some(items.clone()),
            Self::Map(pairs) => Some(pairs.iter().map(|(_, v)| v.clone()).collect()),
            Self::Handle(h) => h.downcast_ref::<Value>().and_then(Value::values),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Map(pairs) => pairs.len(),
            Self::Str(s) => s.chars().count(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; floats with no fractional part and numeric strings convert.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.0.fract() == 0.0 && f.0.is_finite() => Some(f.0 as i64),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(f.0),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Int(_) | Self::Float(_) => true,
            Self::Str(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        }
    }

    /// Direct child lookup. Lists accept integer keys; maps match keys strictly
    /// and return the first matching pair.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::List(items) => key
                .as_i64()
                .filter(|_| matches!(key, Value::Int(_) | Value::Str(_)))
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| items.get(i)),
            Self::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Self::Handle(h) => h.downcast_ref::<Value>().and_then(|v| v.get(key)),
            _ => None,
        }
    }

    /// Resolve a dotted path (`"foo.bar"`, `"*.id"`) or a list of segments.
    ///
    /// A `*` segment fans out over every child of the current container and
    /// yields a list of the resolved children. Missing segments produce
    /// `default`.
    pub fn pluck(&self, path: &Value, default: &Value) -> Value {
        let segments = parse_path(path);
        resolve(self, &segments, default)
    }

    /// Total loose ordering used by sorting.
    pub fn compare(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Int(_) | Float(_), Int(_) | Float(_)) => {
                let (a, b) = (self.as_f64().unwrap_or(0.0), other.as_f64().unwrap_or(0.0));
                OrderedFloat(a).cmp(&OrderedFloat(b))
            }
            (Bool(a), Bool(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (List(a), List(b)) => compare_seq(a.iter(), b.iter()),
            (Map(a), Map(b)) => {
                let left = a.iter().flat_map(|(k, v)| [k, v]);
                let right = b.iter().flat_map(|(k, v)| [k, v]);
                compare_seq(left, right)
            }
            (Handle(a), Handle(b)) => a.addr().cmp(&b.addr()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::List(_) => 4,
            Self::Map(_) => 5,
            Self::Handle(_) => 6,
        }
    }
}

fn compare_seq<'a>(
    mut a: impl Iterator<Item = &'a Value>,
    mut b: impl Iterator<Item = &'a Value>,
) -> Ordering {
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.compare(y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

fn parse_path(path: &Value) -> Vec<Value> {
    match path {
        Value::Str(s) => s
            .split('.')
            .map(|seg| match seg.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Str(seg.to_string()),
            })
            .collect(),
        Value::List(segments) => segments.clone(),
        other => vec![other.clone()],
    }
}

fn resolve(target: &Value, segments: &[Value], default: &Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return target.clone();
    };
    if head.as_str() == Some("*") {
        return match target.values() {
            Some(children) => Value::List(
                children
                    .iter()
                    .map(|child| resolve(child, rest, default))
                    .collect(),
            ),
            None => default.clone(),
        };
    }
    match target.get(head) {
        Some(child) => resolve(child, rest, default),
        None => default.clone(),
    }
}

/// Render a float the way a textual join expects: `2.0` as `2`.
fn float_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

/// Textual form: strings verbatim, `true` as `1`, null and `false` as empty,
/// containers as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Bool(false) => Ok(()),
            Self::Bool(true) => f.write_str("1"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&float_text(x.0)),
            Self::Str(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
            Self::Handle(h) => write!(f, "{h:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(x.0),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    let key = match k {
                        Value::Str(s) => s.clone(),
                        Value::List(_) | Value::Map(_) => {
                            serde_json::to_string(k).map_err(serde::ser::Error::custom)?
                        }
                        other => other.to_string(),
                    };
                    map.serialize_entry(&key, v)?;
                }
                map.end()
            }
            Self::Handle(h) => {
                if let Some(inner) = h.downcast_ref::<Value>() {
                    inner.serialize(serializer)
                } else {
                    serializer.collect_str(&format_args!("{h:?}"))
                }
            }
        }
    }
}

// ---------- conversions ----------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Self::Int(i64::from(i))
            }
        })*
    };
}
from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::float(f64::from(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Str(c.to_string())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<Handle> for Value {
    fn from(h: Handle) -> Self {
        Self::Handle(h)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Self::list(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Self::Null,
            J::Bool(b) => Self::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Self::Str(s),
            J::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            J::Object(obj) => Self::from_entries(
                obj.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
