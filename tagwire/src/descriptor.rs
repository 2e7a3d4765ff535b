// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validated descriptor tables and the process-wide descriptor cache.
//!
//! A [`RecordDescriptor`] is built from a record type's raw [`RecordDef`]
//! on first use, memoized per type, and never mutated afterwards. Both the
//! encoder and the decoder drive their field walks off these tables.

use core::any::TypeId;
use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

use crate::error::{Error, SchemaError};
use crate::schema::{FieldDef, FieldKind, MapDef, NestedType, Record, RecordDef};

/// A validated field descriptor. Immutable after construction.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Field name, for diagnostics.
    pub name: &'static str,
    /// Position of the field in its record's declaration order; the index
    /// passed to `Fields::field` and `Record::set_field`.
    pub index: usize,
    /// Wire tag (`-1` for fields that never travel).
    pub tag: i32,
    /// Wire kind.
    pub kind: FieldKind,
    /// Whether the field is a homogeneous sequence.
    pub array: bool,
    /// Map wiring, present only for map fields.
    pub map: Option<MapDef>,
    /// Nested record hooks, present for struct-kind fields.
    pub nested: Option<NestedType>,
}

impl FieldDescriptor {
    /// Resolves the nested record descriptor for a struct-kind field.
    pub(crate) fn nested_descriptor(&self) -> Result<&'static RecordDescriptor, Error> {
        match self.nested {
            Some(nested) => (nested.descriptor)(),
            None => Err(Error::Internal {
                reason: "missing nested record type",
            }),
        }
    }

    /// Returns the label used when reporting a kind mismatch on this field.
    pub(crate) fn kind_label(&self) -> &'static str {
        if self.map.is_some_and(|m| !m.is_normal()) {
            return "map entries";
        }
        match (self.kind, self.array) {
            (FieldKind::Integer, false) => "integer",
            (FieldKind::Integer, true) => "integer array",
            (FieldKind::Boolean, false) => "boolean",
            (FieldKind::Boolean, true) => "boolean array",
            (FieldKind::Double, false) => "double",
            (FieldKind::Double, true) => "double array",
            (FieldKind::Str, false) => "string",
            (FieldKind::Str, true) => "string array",
            (FieldKind::Record, false) => "record",
            (FieldKind::Record, true) => "record array",
        }
    }
}

/// A validated, ordered catalog of one record type's fields.
#[derive(Clone, Debug)]
pub struct RecordDescriptor {
    /// Record type name, for diagnostics.
    pub name: &'static str,
    /// Field descriptors in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Indexes into `fields` sorted by ascending tag, excluding `-1` fields.
    order: Vec<usize>,
}

impl RecordDescriptor {
    /// Iterates the encodable fields in ascending tag order.
    pub fn ordered(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.order.iter().map(|&i| &self.fields[i])
    }

    /// Looks up a field descriptor by wire tag.
    #[must_use]
    pub fn field_by_tag(&self, tag: i32) -> Option<&FieldDescriptor> {
        self.order
            .binary_search_by(|&i| self.fields[i].tag.cmp(&tag))
            .ok()
            .map(|pos| &self.fields[self.order[pos]])
    }

    pub(crate) fn build(def: &RecordDef) -> Result<Self, SchemaError> {
        let record = def.name;
        let mut fields = Vec::with_capacity(def.fields.len());
        for (index, fd) in def.fields.iter().enumerate() {
            if fd.tag < -1 {
                return Err(SchemaError::NegativeTag {
                    record,
                    field: fd.name,
                    tag: fd.tag,
                });
            }
            if fd.kind == FieldKind::Record && fd.nested.is_none() {
                return Err(SchemaError::MissingNestedType {
                    record,
                    field: fd.name,
                });
            }
            if let Some(map) = fd.map {
                validate_map_field(record, fd.name, fd, map)?;
            }
            fields.push(FieldDescriptor {
                name: fd.name,
                index,
                tag: fd.tag,
                kind: fd.kind,
                array: fd.array,
                map: fd.map,
                nested: fd.nested,
            });
        }

        let mut order: Vec<usize> = (0..fields.len())
            .filter(|&i| fields[i].tag >= 0)
            .collect();
        order.sort_by_key(|&i| fields[i].tag);
        for pair in order.windows(2) {
            if fields[pair[0]].tag == fields[pair[1]].tag {
                return Err(SchemaError::DuplicateTag {
                    record,
                    tag: fields[pair[0]].tag,
                });
            }
        }

        Ok(Self {
            name: record,
            fields,
            order,
        })
    }
}

fn validate_map_field(
    record: &'static str,
    field: &'static str,
    fd: &FieldDef,
    map: MapDef,
) -> Result<(), SchemaError> {
    if fd.kind != FieldKind::Record || !fd.array {
        return Err(SchemaError::InvalidMapField { record, field });
    }
    // Map validation needs only the element's raw metadata, so recursive
    // element types cannot re-enter descriptor construction here.
    let elem = match fd.nested {
        Some(nested) => (nested.def)(),
        None => return Err(SchemaError::MissingNestedType { record, field }),
    };
    let key = elem
        .fields
        .iter()
        .find(|f| f.tag >= 0 && f.tag == map.key_tag)
        .ok_or(SchemaError::MapTagNotFound {
            record,
            field,
            tag: map.key_tag,
        })?;
    if key.array || key.kind == FieldKind::Record {
        return Err(SchemaError::MapTagUnusable {
            record,
            field,
            tag: map.key_tag,
        });
    }
    if !map.is_normal() {
        if map.value_tag == map.key_tag {
            return Err(SchemaError::MapTagUnusable {
                record,
                field,
                tag: map.value_tag,
            });
        }
        let value = elem
            .fields
            .iter()
            .find(|f| f.tag >= 0 && f.tag == map.value_tag)
            .ok_or(SchemaError::MapTagNotFound {
                record,
                field,
                tag: map.value_tag,
            })?;
        if value.array {
            return Err(SchemaError::MapTagUnusable {
                record,
                field,
                tag: map.value_tag,
            });
        }
    }
    Ok(())
}

static CACHE: OnceLock<Mutex<BTreeMap<TypeId, &'static RecordDescriptor>>> = OnceLock::new();

/// Returns the memoized descriptor table for record type `T`.
///
/// The first call for a given type validates its [`RecordDef`] and publishes
/// the result into a process-wide write-once cache; later calls (from any
/// thread) return the published reference. Construction failures are not
/// cached and surface as [`Error::Schema`] on every call.
pub fn descriptor_of<T: Record>() -> Result<&'static RecordDescriptor, Error> {
    let cache = CACHE.get_or_init(|| Mutex::new(BTreeMap::new()));
    let mut map = cache.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(&published) = map.get(&TypeId::of::<T>()) {
        return Ok(published);
    }
    let built = RecordDescriptor::build(T::record_def())?;
    let published: &'static RecordDescriptor = Box::leak(Box::new(built));
    map.insert(TypeId::of::<T>(), published);
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, Fields, RecordDef};
    use crate::value::{FieldRef, FieldValue};

    #[derive(Default)]
    struct Elem;

    impl Fields for Elem {
        fn field(&self, _index: usize) -> Option<FieldRef<'_>> {
            None
        }
    }

    impl Record for Elem {
        fn record_def() -> &'static RecordDef {
            static FIELDS: [FieldDef; 2] = [
                FieldDef::scalar("key", 0, FieldKind::Integer),
                FieldDef::scalar("value", 1, FieldKind::Str),
            ];
            static DEF: RecordDef = RecordDef {
                name: "Elem",
                fields: &FIELDS,
            };
            &DEF
        }

        fn set_field(&mut self, _index: usize, _value: FieldValue) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn order_sorts_by_tag_and_skips_sentinels() {
        static FIELDS: [FieldDef; 4] = [
            FieldDef::scalar("c", 7, FieldKind::Integer),
            FieldDef::scalar("hidden", -1, FieldKind::Integer),
            FieldDef::scalar("a", 0, FieldKind::Str),
            FieldDef::scalar("b", 3, FieldKind::Boolean),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Jumbled",
            fields: &FIELDS,
        };
        let desc = RecordDescriptor::build(&DEF).unwrap();
        let tags: Vec<i32> = desc.ordered().map(|f| f.tag).collect();
        assert_eq!(tags, vec![0, 3, 7]);
        assert_eq!(desc.field_by_tag(3).unwrap().name, "b");
        assert!(desc.field_by_tag(1).is_none());
        assert!(desc.field_by_tag(-1).is_none());
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::scalar("a", 2, FieldKind::Integer),
            FieldDef::scalar("b", 2, FieldKind::Str),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Dup",
            fields: &FIELDS,
        };
        let err = RecordDescriptor::build(&DEF).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateTag {
                record: "Dup",
                tag: 2,
            }
        );
    }

    #[test]
    fn negative_tags_other_than_sentinel_are_rejected() {
        static FIELDS: [FieldDef; 1] = [FieldDef::scalar("a", -2, FieldKind::Integer)];
        static DEF: RecordDef = RecordDef {
            name: "Neg",
            fields: &FIELDS,
        };
        let err = RecordDescriptor::build(&DEF).unwrap_err();
        assert!(matches!(err, SchemaError::NegativeTag { tag: -2, .. }));
    }

    #[test]
    fn map_tags_must_resolve_on_the_element() {
        static FIELDS: [FieldDef; 1] = [FieldDef::map(
            "m",
            0,
            NestedType::of::<Elem>(),
            MapDef::simple(0, 9),
        )];
        static DEF: RecordDef = RecordDef {
            name: "BadMap",
            fields: &FIELDS,
        };
        let err = RecordDescriptor::build(&DEF).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MapTagNotFound {
                record: "BadMap",
                field: "m",
                tag: 9,
            }
        );
    }

    #[test]
    fn valid_map_field_builds() {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::map("simple", 0, NestedType::of::<Elem>(), MapDef::simple(0, 1)),
            FieldDef::map("normal", 1, NestedType::of::<Elem>(), MapDef::normal(0)),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Maps",
            fields: &FIELDS,
        };
        let desc = RecordDescriptor::build(&DEF).unwrap();
        assert!(desc.field_by_tag(0).unwrap().map.unwrap().value_tag == 1);
        assert!(desc.field_by_tag(1).unwrap().map.unwrap().is_normal());
    }

    #[test]
    fn descriptor_cache_returns_the_same_table() {
        let a = descriptor_of::<Elem>().unwrap();
        let b = descriptor_of::<Elem>().unwrap();
        assert!(core::ptr::eq(a, b));
    }
}
