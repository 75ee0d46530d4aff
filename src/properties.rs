//! Property bags of enumerated keys with typed values.
//!
//! Values are stored as the `i32` the platform attribute lists carry, so
//! materialising a bag into a `(key, value, ..., 0)` array is a straight
//! copy in key order.

use std::{fmt, marker};
use vec_map::VecMap;

/// An enumerated property key.
pub trait Key: Copy + fmt::Debug + Eq + 'static {
    /// Every key, ordered by [`index`](#tymethod.index).
    const ALL: &'static [Self];

    /// Dense index of the key, used as storage slot and ordering.
    fn index(self) -> usize;

    /// The platform attribute token the key materialises as.
    fn token(self) -> i32;

    /// Appends the attribute list entries for `value`.
    fn encode(self, value: i32, list: &mut Vec<i32>) {
        list.push(self.token());
        list.push(value);
    }
}

/// A typed property value.
pub trait Value: Sized {
    /// Converts the value into its attribute list representation.
    fn to_raw(self) -> i32;

    /// Converts an attribute list representation back, if valid.
    fn from_raw(raw: i32) -> Option<Self>;
}

impl Value for i32 {
    fn to_raw(self) -> i32 {
        self
    }

    fn from_raw(raw: i32) -> Option<Self> {
        Some(raw)
    }
}

impl Value for u32 {
    fn to_raw(self) -> i32 {
        self as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        Some(raw as u32)
    }
}

impl Value for u8 {
    fn to_raw(self) -> i32 {
        self as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        if raw >= 0 && raw <= u8::max_value() as i32 {
            Some(raw as u8)
        } else {
            None
        }
    }
}

impl Value for bool {
    fn to_raw(self) -> i32 {
        self as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        Some(raw != 0)
    }
}

/// A set of defined keys and their values.
#[derive(Clone, Eq, PartialEq)]
pub struct Properties<K> {
    /// Raw values indexed by `Key::index`.
    values: VecMap<i32>,

    _key: marker::PhantomData<K>,
}

impl<K: Key> Properties<K> {
    /// An empty bag.
    pub fn new() -> Self {
        Self {
            values: VecMap::new(),
            _key: marker::PhantomData,
        }
    }

    /// Defines `key`, replacing any previous value.
    pub fn define<V: Value>(&mut self, key: K, value: V) -> &mut Self {
        self.values.insert(key.index(), value.to_raw());
        self
    }

    /// Builder form of [`define`](#method.define).
    pub fn with<V: Value>(mut self, key: K, value: V) -> Self {
        self.define(key, value);
        self
    }

    /// Removes `key`, returning its raw value if it was defined.
    pub fn undefine(&mut self, key: K) -> Option<i32> {
        self.values.remove(key.index())
    }

    /// Builder form of [`undefine`](#method.undefine).
    pub fn without(mut self, key: K) -> Self {
        self.undefine(key);
        self
    }

    /// Returns `true` if `key` is defined.
    pub fn is_defined(&self, key: K) -> bool {
        self.values.contains_key(key.index())
    }

    /// Returns the raw value of `key`.
    pub fn raw(&self, key: K) -> Option<i32> {
        self.values.get(key.index()).cloned()
    }

    /// Returns the typed value of `key`, or `None` if undefined or not
    /// representable as `V`.
    pub fn try_get<V: Value>(&self, key: K) -> Option<V> {
        self.raw(key).and_then(V::from_raw)
    }

    /// Returns the typed value of `key`, or `default`.
    pub fn get<V: Value>(&self, key: K, default: V) -> V {
        self.try_get(key).unwrap_or(default)
    }

    /// Returns the number of defined keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no key is defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the defined keys and raw values in key order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (K, i32)> + 'a {
        self.values.iter().map(|(index, value)| (K::ALL[index], *value))
    }

    /// Materialises the bag as a zero-terminated `(key, value, ...)`
    /// attribute list for the platform APIs.
    pub fn to_attrib_list(&self) -> Vec<i32> {
        let mut list = Vec::with_capacity(self.len() * 2 + 1);
        self.encode_into(&mut list);
        list.push(0);
        list
    }

    /// Appends the `(key, value)` pairs without a terminator.
    pub fn encode_into(&self, list: &mut Vec<i32>) {
        for (key, value) in self.iter() {
            key.encode(value, list);
        }
    }
}

impl<K: Key> Default for Properties<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> fmt::Debug for Properties<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
