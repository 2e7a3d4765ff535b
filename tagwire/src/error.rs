// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error surface for encoding, decoding, and schema construction.

use core::fmt;

/// An error raised by the tagwire codec.
///
/// Unknown wire tags are *not* errors; decoders consume and discard them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A record type's field metadata is unusable.
    Schema(SchemaError),
    /// A runtime value does not match the wire kind its descriptor declares.
    Type {
        /// The kind the descriptor (or extraction helper) expected.
        expected: &'static str,
        /// The kind that was actually provided.
        got: &'static str,
    },
    /// Input ended before a required header, length, or payload could be read.
    Truncated,
    /// A header slot or tag sequence violates the wire grammar.
    MalformedHeader,
    /// A length prefix or payload width disagrees with the field's type.
    Length,
    /// An internal integrity failure (a wire field overflowed its width).
    Internal {
        /// Short description of the failure.
        reason: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::Type { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::Truncated => write!(f, "unexpected end of input"),
            Self::MalformedHeader => write!(f, "malformed message header"),
            Self::Length => write!(f, "inconsistent length or width"),
            Self::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

/// A descriptor-construction failure for a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// A field tag is negative and not the `-1` "never encoded" sentinel.
    NegativeTag {
        /// Record type name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The offending tag.
        tag: i32,
    },
    /// Two fields of one record share a tag.
    DuplicateTag {
        /// Record type name.
        record: &'static str,
        /// The duplicated tag.
        tag: i32,
    },
    /// A struct or map field has no nested record type.
    MissingNestedType {
        /// Record type name.
        record: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// A map field is not declared as a record array.
    InvalidMapField {
        /// Record type name.
        record: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// A map key or value tag does not exist on the element record.
    MapTagNotFound {
        /// Record type name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The tag that could not be resolved.
        tag: i32,
    },
    /// A map key or value tag resolves to a field that cannot serve the role.
    MapTagUnusable {
        /// Record type name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// The tag that resolved to an unusable field.
        tag: i32,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTag { record, field, tag } => {
                write!(f, "{record}.{field}: negative tag {tag}")
            }
            Self::DuplicateTag { record, tag } => {
                write!(f, "{record}: duplicate tag {tag}")
            }
            Self::MissingNestedType { record, field } => {
                write!(f, "{record}.{field}: struct field without a nested record type")
            }
            Self::InvalidMapField { record, field } => {
                write!(f, "{record}.{field}: map field must be a record array")
            }
            Self::MapTagNotFound { record, field, tag } => {
                write!(f, "{record}.{field}: map tag {tag} not found on element record")
            }
            Self::MapTagUnusable { record, field, tag } => {
                write!(f, "{record}.{field}: map tag {tag} is not usable for its role")
            }
        }
    }
}

impl core::error::Error for SchemaError {}
