//! Lenient decoding helpers
//!
//! Some API fields are documented as arrays but come back as a bare scalar
//! when they hold a single element.

use serde::{Deserialize, Deserializer, Serialize};

/// Either a single value or a list of values.
///
/// A list is always read as `Many`, even when `T` could hold a list itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A list of values
    Many(Vec<T>),
    /// A bare value
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a list
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        value.into_vec()
    }
}

/// Use with `#[serde(deserialize_with = "one_or_many")]` on a `Vec<T>` field
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(OneOrMany::into_vec)
}
