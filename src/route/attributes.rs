//! Free-form attribute store carried by a [`RequestContext`](super::context::RequestContext).
//!
//! Pipeline stages use it to hand state to each other. There is no schema: any
//! stage may read or overwrite any key, and avoiding key collisions is up to
//! the stages themselves.
//!
//! Values are tagged ([`AttrValue`]) so a reader gets a checked, typed view
//! (`as_int`, `as_str`, ...) rather than an unchecked cast. Types without a
//! dedicated variant go through [`AttrValue::Extension`] and are recovered with
//! [`AttrValue::downcast_ref`].

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<AttrValue>),
    Extension(Arc<dyn Any + Send + Sync>),
}

impl AttrValue {
    /// Wraps an arbitrary value.
    pub fn extension<T: Any + Send + Sync>(value: T) -> Self {
        AttrValue::Extension(Arc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttrValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The wrapped value of an `Extension`, if it holds a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            AttrValue::Extension(ext) => ext.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            AttrValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            AttrValue::Float(x) => f.debug_tuple("Float").field(x).finish(),
            AttrValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            AttrValue::Bytes(b) => f.debug_tuple("Bytes").field(b).finish(),
            AttrValue::List(items) => f.debug_tuple("List").field(items).finish(),
            AttrValue::Extension(_) => f.write_str("Extension(..)"),
        }
    }
}

// Extensions are compared by identity.
impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Bytes(a), AttrValue::Bytes(b)) => a == b,
            (AttrValue::List(a), AttrValue::List(b)) => a == b,
            (AttrValue::Extension(a), AttrValue::Extension(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! attr_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    AttrValue::$variant(value.into())
                }
            }
        )*
    };
}

attr_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Vec<AttrValue> => List,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.values.insert(key.into(), value.into())
    }

    /// `None` when `key` was never set; absence is not an error.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.values.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
