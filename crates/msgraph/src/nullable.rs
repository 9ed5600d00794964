//! Tri-state JSON fields
//!
//! Graph distinguishes between a property that was not returned (for example
//! because `$select` excluded it) and one that was returned as `null`.
//! `Option<T>` collapses the two, so resource records use [`Nullable<T>`].
//!
//! Fields must be declared with `#[serde(default)]` so a missing key
//! deserializes to [`Nullable::Absent`], and with
//! `#[serde(skip_serializing_if = "Nullable::is_absent")]` so absent fields
//! are omitted again on output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that may be present, explicitly `null`, or absent from the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    /// The key was not in the payload
    Absent,
    /// The key was present with a `null` value
    Null,
    /// The key was present with a value
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Nullable::Value(_))
    }

    /// Returns the value, collapsing `Null` and `Absent` to `None`
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Nullable::Value(value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Value(value) => value.serialize(serializer),
            // Absent fields are skipped by the containing struct; if one is
            // serialized anyway it is written as null.
            Nullable::Null | Nullable::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only called when the key is present; absence is handled by `#[serde(default)]`.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Nullable::Value(value),
            None => Nullable::Null,
        })
    }
}
