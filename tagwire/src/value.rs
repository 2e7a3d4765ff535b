// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field value views exchanged between records and the codec.
//!
//! [`FieldRef`] is the borrowed view a record hands to the encoder;
//! [`FieldValue`] is the owned value the decoder hands back through
//! [`Record::set_field`](crate::schema::Record::set_field). The wire does
//! not distinguish strings from raw bytes, so decoded string-kind payloads
//! arrive as bytes and the [`FieldValue::into_string`] helper performs the
//! UTF-8 conversion.

use core::any::Any;
use core::fmt;

use crate::error::Error;
use crate::schema::{Fields, Record};

/// A borrowed view of one field's value, consumed by the encoder.
pub enum FieldRef<'a> {
    /// Integer scalar.
    Int(i64),
    /// Boolean scalar.
    Bool(bool),
    /// Double scalar.
    Double(f64),
    /// UTF-8 string scalar.
    Str(&'a str),
    /// Raw byte-sequence scalar (string kind on the wire).
    Bytes(&'a [u8]),
    /// Nested record scalar.
    Record(&'a dyn Fields),
    /// Integer array.
    IntArray(&'a [i64]),
    /// Boolean array.
    BoolArray(&'a [bool]),
    /// Double array.
    DoubleArray(&'a [f64]),
    /// String array.
    StrArray(&'a [String]),
    /// Byte-sequence array.
    BytesArray(&'a [Vec<u8>]),
    /// Record array; `None` elements encode as empty messages.
    RecordArray(Vec<Option<&'a dyn Fields>>),
    /// Simple-map entries as `(key, value)` scalar pairs.
    MapEntries(Vec<(FieldRef<'a>, FieldRef<'a>)>),
}

impl FieldRef<'_> {
    /// Returns a short name for this value's kind, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Record(_) => "record",
            Self::IntArray(_) => "integer array",
            Self::BoolArray(_) => "boolean array",
            Self::DoubleArray(_) => "double array",
            Self::StrArray(_) => "string array",
            Self::BytesArray(_) => "bytes array",
            Self::RecordArray(_) => "record array",
            Self::MapEntries(_) => "map entries",
        }
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Double(v) => write!(f, "Double({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            Self::Record(_) => write!(f, "Record(..)"),
            Self::IntArray(v) => write!(f, "IntArray({v:?})"),
            Self::BoolArray(v) => write!(f, "BoolArray({v:?})"),
            Self::DoubleArray(v) => write!(f, "DoubleArray({v:?})"),
            Self::StrArray(v) => write!(f, "StrArray({v:?})"),
            Self::BytesArray(v) => write!(f, "BytesArray({} elements)", v.len()),
            Self::RecordArray(v) => write!(f, "RecordArray({} elements)", v.len()),
            Self::MapEntries(v) => write!(f, "MapEntries({} entries)", v.len()),
        }
    }
}

/// An owned decoded field value, delivered to
/// [`Record::set_field`](crate::schema::Record::set_field).
pub enum FieldValue {
    /// Integer scalar.
    Int(i64),
    /// Boolean scalar.
    Bool(bool),
    /// Double scalar.
    Double(f64),
    /// String-kind scalar payload (raw bytes; see [`FieldValue::into_string`]).
    Bytes(Vec<u8>),
    /// Nested record scalar (boxed concrete record type).
    Record(Box<dyn Any>),
    /// Integer array.
    IntArray(Vec<i64>),
    /// Boolean array.
    BoolArray(Vec<bool>),
    /// Double array.
    DoubleArray(Vec<f64>),
    /// String-kind array payloads.
    BytesArray(Vec<Vec<u8>>),
    /// Record array; `None` marks elements decoded from empty messages.
    RecordArray(Vec<Option<Box<dyn Any>>>),
    /// Simple-map entries as `(key, value)` scalar pairs.
    MapEntries(Vec<(FieldValue, FieldValue)>),
}

impl FieldValue {
    /// Returns a short name for this value's kind, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Double(_) => "double",
            Self::Bytes(_) => "bytes",
            Self::Record(_) => "record",
            Self::IntArray(_) => "integer array",
            Self::BoolArray(_) => "boolean array",
            Self::DoubleArray(_) => "double array",
            Self::BytesArray(_) => "bytes array",
            Self::RecordArray(_) => "record array",
            Self::MapEntries(_) => "map entries",
        }
    }

    fn mismatch(self, expected: &'static str) -> Error {
        Error::Type {
            expected,
            got: self.kind_name(),
        }
    }

    /// Extracts an integer scalar.
    pub fn into_int(self) -> Result<i64, Error> {
        match self {
            Self::Int(v) => Ok(v),
            other => Err(other.mismatch("integer")),
        }
    }

    /// Extracts a boolean scalar.
    pub fn into_bool(self) -> Result<bool, Error> {
        match self {
            Self::Bool(v) => Ok(v),
            other => Err(other.mismatch("boolean")),
        }
    }

    /// Extracts a double scalar.
    pub fn into_double(self) -> Result<f64, Error> {
        match self {
            Self::Double(v) => Ok(v),
            other => Err(other.mismatch("double")),
        }
    }

    /// Extracts a raw byte-sequence scalar.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Bytes(v) => Ok(v),
            other => Err(other.mismatch("bytes")),
        }
    }

    /// Extracts a string scalar, validating UTF-8.
    pub fn into_string(self) -> Result<String, Error> {
        let bytes = self.into_bytes()?;
        String::from_utf8(bytes).map_err(|_| Error::Type {
            expected: "utf-8 string",
            got: "bytes",
        })
    }

    /// Extracts a nested record of concrete type `T`.
    pub fn into_record<T: Record>(self) -> Result<T, Error> {
        match self {
            Self::Record(b) => match b.downcast::<T>() {
                Ok(rec) => Ok(*rec),
                Err(_) => Err(Error::Type {
                    expected: core::any::type_name::<T>(),
                    got: "record",
                }),
            },
            other => Err(other.mismatch("record")),
        }
    }

    /// Extracts an integer array.
    pub fn into_int_array(self) -> Result<Vec<i64>, Error> {
        match self {
            Self::IntArray(v) => Ok(v),
            other => Err(other.mismatch("integer array")),
        }
    }

    /// Extracts a boolean array.
    pub fn into_bool_array(self) -> Result<Vec<bool>, Error> {
        match self {
            Self::BoolArray(v) => Ok(v),
            other => Err(other.mismatch("boolean array")),
        }
    }

    /// Extracts a double array.
    pub fn into_double_array(self) -> Result<Vec<f64>, Error> {
        match self {
            Self::DoubleArray(v) => Ok(v),
            other => Err(other.mismatch("double array")),
        }
    }

    /// Extracts a byte-sequence array.
    pub fn into_bytes_array(self) -> Result<Vec<Vec<u8>>, Error> {
        match self {
            Self::BytesArray(v) => Ok(v),
            other => Err(other.mismatch("bytes array")),
        }
    }

    /// Extracts a string array, validating UTF-8 per element.
    pub fn into_string_array(self) -> Result<Vec<String>, Error> {
        let items = self.into_bytes_array()?;
        items
            .into_iter()
            .map(|b| {
                String::from_utf8(b).map_err(|_| Error::Type {
                    expected: "utf-8 string",
                    got: "bytes",
                })
            })
            .collect()
    }

    /// Extracts an array of nested records of concrete type `T`.
    ///
    /// `None` elements were decoded from empty messages.
    pub fn into_record_array<T: Record>(self) -> Result<Vec<Option<T>>, Error> {
        match self {
            Self::RecordArray(items) => items
                .into_iter()
                .map(|item| match item {
                    None => Ok(None),
                    Some(b) => match b.downcast::<T>() {
                        Ok(rec) => Ok(Some(*rec)),
                        Err(_) => Err(Error::Type {
                            expected: core::any::type_name::<T>(),
                            got: "record",
                        }),
                    },
                })
                .collect(),
            other => Err(other.mismatch("record array")),
        }
    }

    /// Extracts simple-map `(key, value)` entries.
    pub fn into_map_entries(self) -> Result<Vec<(FieldValue, FieldValue)>, Error> {
        match self {
            Self::MapEntries(v) => Ok(v),
            other => Err(other.mismatch("map entries")),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Double(v) => write!(f, "Double({v})"),
            Self::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            Self::Record(_) => write!(f, "Record(..)"),
            Self::IntArray(v) => write!(f, "IntArray({v:?})"),
            Self::BoolArray(v) => write!(f, "BoolArray({v:?})"),
            Self::DoubleArray(v) => write!(f, "DoubleArray({v:?})"),
            Self::BytesArray(v) => write!(f, "BytesArray({} elements)", v.len()),
            Self::RecordArray(v) => write!(f, "RecordArray({} elements)", v.len()),
            Self::MapEntries(v) => write!(f, "MapEntries({} entries)", v.len()),
        }
    }
}

/// Wraps an integer into a present optional scalar.
#[must_use]
pub fn opt_int(v: i64) -> Option<i64> {
    Some(v)
}

/// Wraps a boolean into a present optional scalar.
#[must_use]
pub fn opt_bool(v: bool) -> Option<bool> {
    Some(v)
}

/// Wraps a double into a present optional scalar.
#[must_use]
pub fn opt_double(v: f64) -> Option<f64> {
    Some(v)
}

/// Wraps a string into a present optional scalar.
#[must_use]
pub fn opt_string(v: impl Into<String>) -> Option<String> {
    Some(v.into())
}

/// Wraps a byte sequence into a present optional scalar.
#[must_use]
pub fn opt_bytes(v: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
    Some(v.into())
}
