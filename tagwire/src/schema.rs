// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The schema binding layer: per-field metadata and the record traits.
//!
//! A record type declares its wire schema as a static [`RecordDef`] (one
//! [`FieldDef`] per field, in declaration order) and exposes its values
//! through the object-safe [`Fields`] view plus the [`Record`] trait. The
//! codec never inspects host types directly; everything it knows about a
//! record flows through these tables, which makes the field metadata the
//! single source of truth for wire layout.

use core::any::Any;

use crate::descriptor::{RecordDescriptor, descriptor_of};
use crate::error::Error;
use crate::value::{FieldRef, FieldValue};

/// The closed set of wire kinds a field can have.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed 64-bit integer (4- or 8-byte wire width, value-dependent).
    Integer,
    /// Boolean (always embedded in the header when scalar).
    Boolean,
    /// IEEE 754 64-bit float.
    Double,
    /// UTF-8 string or raw byte sequence.
    Str,
    /// Nested record.
    Record,
}

impl FieldKind {
    /// Returns the annotation name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Str => "string",
            Self::Record => "record",
        }
    }
}

/// Map wiring for a field that serializes an associative container.
///
/// Both tags point at fields of the element record. A "simple" map carries
/// an explicit value tag and is synthesized pairwise on the wire; a "normal"
/// map (`value_tag == -1`) stores the element record itself as the value,
/// with `key_tag` naming the element field that serves as the map key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapDef {
    /// Element-record tag holding the map key.
    pub key_tag: i32,
    /// Element-record tag holding the map value, or `-1` for a normal map.
    pub value_tag: i32,
}

impl MapDef {
    /// Map wiring for a simple map (`key_tag` and `value_tag` both name
    /// element fields).
    #[must_use]
    pub const fn simple(key_tag: i32, value_tag: i32) -> Self {
        Self { key_tag, value_tag }
    }

    /// Map wiring for a normal map (the element record is the value).
    #[must_use]
    pub const fn normal(key_tag: i32) -> Self {
        Self {
            key_tag,
            value_tag: -1,
        }
    }

    /// Returns `true` when the element record itself is the map value.
    #[must_use]
    pub const fn is_normal(self) -> bool {
        self.value_tag == -1
    }
}

/// Lazy access to a nested record type.
///
/// Struct-kind fields cannot reference another type's descriptor directly
/// (record types may be mutually or self-recursive), so they carry function
/// pointers instead: the raw definition for schema validation, the memoized
/// descriptor for encoding, and a monomorphized decoder that produces a
/// boxed instance of the concrete nested type.
#[derive(Copy, Clone, Debug)]
pub struct NestedType {
    /// Returns the nested record's raw field metadata.
    pub def: fn() -> &'static RecordDef,
    /// Resolves the nested record's validated descriptor table.
    pub descriptor: fn() -> Result<&'static RecordDescriptor, Error>,
    /// Decodes one complete message into a boxed nested record.
    pub decode_boxed: fn(&[u8]) -> Result<Box<dyn Any>, Error>,
}

impl NestedType {
    /// Builds the nested-type hooks for record type `T`.
    #[must_use]
    pub const fn of<T: Record>() -> Self {
        Self {
            def: T::record_def,
            descriptor: descriptor_of::<T>,
            decode_boxed: crate::decode::decode_boxed::<T>,
        }
    }
}

/// Raw metadata for one field: the Rust rendition of a `kind, tag[, array]`
/// field annotation.
#[derive(Copy, Clone, Debug)]
pub struct FieldDef {
    /// Field name, for diagnostics.
    pub name: &'static str,
    /// Wire tag. `-1` marks a field that is never encoded or decoded.
    pub tag: i32,
    /// Wire kind.
    pub kind: FieldKind,
    /// Whether the field is a homogeneous sequence.
    pub array: bool,
    /// Map wiring, present only for map fields.
    pub map: Option<MapDef>,
    /// Nested record type, present for struct-kind fields.
    pub nested: Option<NestedType>,
}

impl FieldDef {
    /// A scalar field of a non-record kind.
    #[must_use]
    pub const fn scalar(name: &'static str, tag: i32, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            array: false,
            map: None,
            nested: None,
        }
    }

    /// An array field of a non-record kind.
    #[must_use]
    pub const fn array(name: &'static str, tag: i32, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            array: true,
            map: None,
            nested: None,
        }
    }

    /// A scalar nested-record field.
    #[must_use]
    pub const fn record(name: &'static str, tag: i32, nested: NestedType) -> Self {
        Self {
            name,
            tag,
            kind: FieldKind::Record,
            array: false,
            map: None,
            nested: Some(nested),
        }
    }

    /// An array of nested records.
    #[must_use]
    pub const fn record_array(name: &'static str, tag: i32, nested: NestedType) -> Self {
        Self {
            name,
            tag,
            kind: FieldKind::Record,
            array: true,
            map: None,
            nested: Some(nested),
        }
    }

    /// A map field, lowered on the wire to an array of element records.
    #[must_use]
    pub const fn map(name: &'static str, tag: i32, nested: NestedType, map: MapDef) -> Self {
        Self {
            name,
            tag,
            kind: FieldKind::Record,
            array: true,
            map: Some(map),
            nested: Some(nested),
        }
    }
}

/// A record type's raw schema: its name and fields in declaration order.
#[derive(Copy, Clone, Debug)]
pub struct RecordDef {
    /// Record type name, for diagnostics.
    pub name: &'static str,
    /// Field metadata in declaration order; a field's position here is the
    /// index used by [`Fields::field`] and [`Record::set_field`].
    pub fields: &'static [FieldDef],
}

/// Object-safe read access to a record's field values.
///
/// The encoder walks a record exclusively through this view. Returning
/// `None` marks the field absent: no header slot is emitted for it.
pub trait Fields {
    /// Returns a borrowed view of the field at `index` (declaration order),
    /// or `None` when the field is absent.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;
}

/// A record type bound to a tagwire schema.
pub trait Record: Fields + Default + 'static {
    /// Returns the raw field metadata for this record type.
    fn record_def() -> &'static RecordDef;

    /// Stores a decoded value into the field at `index` (declaration order).
    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error>;
}
