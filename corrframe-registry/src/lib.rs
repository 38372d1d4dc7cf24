#![forbid(unsafe_code)]
//! Field registry for multi-field cortical surface registration.
//!
//! Every registration field is identified by a numeric code in `0..=13`. The registry answers
//! two questions about a code: which on-disk name the field is loaded from (or that it is
//! computed directly from the surface), and whether it is a subcortical distance field.
//! The table is constant data; nothing here allocates, locks or performs I/O.

pub mod macros;
mod fields;

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub use fields::FieldCode;

/// Number of fields in the vectorial field list.
pub const NUMBER_OF_FIELDS: usize = 14;

/// Largest valid field code.
pub const MAX_FIELD_CODE: u8 = (NUMBER_OF_FIELDS - 1) as u8;

/// Codes from here up to `MAX_FIELD_CODE` are distance fields.
pub const FIRST_DISTANCE_CODE: u8 = 7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid field code {code} (expected 0..={max})", max = MAX_FIELD_CODE)]
    InvalidFieldCode { code: i128 },
    #[error("unknown field: {key}")]
    UnknownField { key: String },
}

/// Result of name resolution. Computed fields have no name and are not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    Named(&'static str),
    DirectlyComputed,
}

impl FieldName {
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            FieldName::Named(name) => Some(name),
            FieldName::DirectlyComputed => None,
        }
    }

    pub const fn is_directly_computed(self) -> bool {
        matches!(self, FieldName::DirectlyComputed)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldName::Named(name) => f.write_str(name),
            FieldName::DirectlyComputed => f.write_str("(computed)"),
        }
    }
}

/// Partition of the field codes. Every code belongs to exactly one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Curvature-type field derived from the surface at runtime.
    DirectlyComputed,
    /// Named surface-intrinsic field (sulcal depth, sampled intensity).
    Surface,
    /// Named distance-to-structure field.
    Distance,
}

impl FieldClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldClass::DirectlyComputed => "directly_computed",
            FieldClass::Surface => "surface",
            FieldClass::Distance => "distance",
        }
    }
}

impl FieldCode {
    pub const fn class(self) -> FieldClass {
        if self.is_distance_field() {
            FieldClass::Distance
        } else if self.name().is_directly_computed() {
            FieldClass::DirectlyComputed
        } else {
            FieldClass::Surface
        }
    }

    /// Reverse lookup from a canonical on-disk name. Case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().as_str() == Some(name))
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl TryFrom<i128> for FieldCode {
    type Error = RegistryError;

    fn try_from(code: i128) -> Result<Self, Self::Error> {
        FieldCode::from_code(code).ok_or(RegistryError::InvalidFieldCode { code })
    }
}

impl TryFrom<i64> for FieldCode {
    type Error = RegistryError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        FieldCode::try_from(i128::from(code))
    }
}

impl TryFrom<i32> for FieldCode {
    type Error = RegistryError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        FieldCode::try_from(i128::from(code))
    }
}

impl TryFrom<u8> for FieldCode {
    type Error = RegistryError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FieldCode::try_from(i128::from(code))
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accepts a decimal code, a symbolic key or a canonical name.
impl FromStr for FieldCode {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i128>() {
            return FieldCode::try_from(code);
        }
        FieldCode::from_key(s)
            .or_else(|| FieldCode::from_name(s))
            .ok_or_else(|| RegistryError::UnknownField { key: s.to_string() })
    }
}

impl Serialize for FieldCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRef {
    Code(i64),
    LargeCode(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for FieldCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let field = match FieldRef::deserialize(deserializer)? {
            FieldRef::Code(code) => FieldCode::try_from(code),
            FieldRef::LargeCode(code) => FieldCode::try_from(i128::from(code)),
            FieldRef::Text(text) => text.parse(),
        };
        field.map_err(de::Error::custom)
    }
}

/// Canonical name of the field with the given code.
pub fn resolve_name(code: i32) -> Result<FieldName, RegistryError> {
    FieldCode::try_from(code).map(FieldCode::name)
}

/// Whether the field with the given code is a distance field.
pub fn is_distance_field(code: i32) -> Result<bool, RegistryError> {
    FieldCode::try_from(code).map(FieldCode::is_distance_field)
}
