// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixture records for the tagwire conformance tests and benches.
//!
//! These are hand-written [`Record`] bindings of the shapes a schema
//! generator would emit: optional scalars, arrays, nested records, and both
//! map flavors. Tag numbering (including the gap at `Data` tag 6) is part
//! of the fixtures' contract with the golden vectors.

#![allow(missing_docs, reason = "test fixture crate")]

use std::collections::BTreeMap;

use tagwire::Error;
use tagwire::schema::{FieldDef, FieldKind, Fields, MapDef, NestedType, Record, RecordDef};
use tagwire::value::{FieldRef, FieldValue, opt_int, opt_string};

fn record_array_ref<'a, T: Fields>(items: &'a [Option<T>]) -> FieldRef<'a> {
    FieldRef::RecordArray(
        items
            .iter()
            .map(|e| e.as_ref().map(|r| r as &dyn Fields))
            .collect(),
    )
}

/// A person with optional scalars and a recursive child array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Human {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub marital: Option<bool>,
    pub children: Option<Vec<Option<Human>>>,
}

impl Fields for Human {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.name.as_deref().map(FieldRef::Str),
            1 => self.age.map(FieldRef::Int),
            2 => self.marital.map(FieldRef::Bool),
            3 => self.children.as_deref().map(record_array_ref),
            _ => None,
        }
    }
}

impl Record for Human {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 4] = [
            FieldDef::scalar("name", 0, FieldKind::Str),
            FieldDef::scalar("age", 1, FieldKind::Integer),
            FieldDef::scalar("marital", 2, FieldKind::Boolean),
            FieldDef::record_array("children", 3, NestedType::of::<Human>()),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Human",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.name = Some(value.into_string()?),
            1 => self.age = Some(value.into_int()?),
            2 => self.marital = Some(value.into_bool()?),
            3 => self.children = Some(value.into_record_array::<Human>()?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhoneNumber {
    pub number: Option<String>,
    pub kind: Option<i64>,
}

impl Fields for PhoneNumber {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.number.as_deref().map(FieldRef::Str),
            1 => self.kind.map(FieldRef::Int),
            _ => None,
        }
    }
}

impl Record for PhoneNumber {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::scalar("number", 0, FieldKind::Str),
            FieldDef::scalar("kind", 1, FieldKind::Integer),
        ];
        static DEF: RecordDef = RecordDef {
            name: "PhoneNumber",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.number = Some(value.into_string()?),
            1 => self.kind = Some(value.into_int()?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub name: Option<String>,
    pub id: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<Vec<Option<PhoneNumber>>>,
}

impl Fields for Person {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.name.as_deref().map(FieldRef::Str),
            1 => self.id.map(FieldRef::Int),
            2 => self.email.as_deref().map(FieldRef::Str),
            3 => self.phone.as_deref().map(record_array_ref),
            _ => None,
        }
    }
}

impl Record for Person {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 4] = [
            FieldDef::scalar("name", 0, FieldKind::Str),
            FieldDef::scalar("id", 1, FieldKind::Integer),
            FieldDef::scalar("email", 2, FieldKind::Str),
            FieldDef::record_array("phone", 3, NestedType::of::<PhoneNumber>()),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Person",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.name = Some(value.into_string()?),
            1 => self.id = Some(value.into_int()?),
            2 => self.email = Some(value.into_string()?),
            3 => self.phone = Some(value.into_record_array::<PhoneNumber>()?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressBook {
    pub person: Option<Vec<Option<Person>>>,
}

impl Fields for AddressBook {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.person.as_deref().map(record_array_ref),
            _ => None,
        }
    }
}

impl Record for AddressBook {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 1] = [FieldDef::record_array(
            "person",
            0,
            NestedType::of::<Person>(),
        )];
        static DEF: RecordDef = RecordDef {
            name: "AddressBook",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        if index == 0 {
            self.person = Some(value.into_record_array::<Person>()?);
        }
        Ok(())
    }
}

/// One field of every non-record wire shape, with a tag gap before
/// `strings` to exercise skip slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Data {
    pub numbers: Option<Vec<i64>>,
    pub bools: Option<Vec<bool>>,
    pub number: Option<i64>,
    pub big_number: Option<i64>,
    pub double: Option<f64>,
    pub doubles: Option<Vec<f64>>,
    pub strings: Option<Vec<String>>,
    pub bytes: Option<Vec<u8>>,
}

impl Fields for Data {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.numbers.as_deref().map(FieldRef::IntArray),
            1 => self.bools.as_deref().map(FieldRef::BoolArray),
            2 => self.number.map(FieldRef::Int),
            3 => self.big_number.map(FieldRef::Int),
            4 => self.double.map(FieldRef::Double),
            5 => self.doubles.as_deref().map(FieldRef::DoubleArray),
            6 => self.strings.as_deref().map(FieldRef::StrArray),
            7 => self.bytes.as_deref().map(FieldRef::Bytes),
            _ => None,
        }
    }
}

impl Record for Data {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 8] = [
            FieldDef::array("numbers", 0, FieldKind::Integer),
            FieldDef::array("bools", 1, FieldKind::Boolean),
            FieldDef::scalar("number", 2, FieldKind::Integer),
            FieldDef::scalar("big_number", 3, FieldKind::Integer),
            FieldDef::scalar("double", 4, FieldKind::Double),
            FieldDef::array("doubles", 5, FieldKind::Double),
            FieldDef::array("strings", 7, FieldKind::Str),
            FieldDef::scalar("bytes", 8, FieldKind::Str),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Data",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.numbers = Some(value.into_int_array()?),
            1 => self.bools = Some(value.into_bool_array()?),
            2 => self.number = Some(value.into_int()?),
            3 => self.big_number = Some(value.into_int()?),
            4 => self.double = Some(value.into_double()?),
            5 => self.doubles = Some(value.into_double_array()?),
            6 => self.strings = Some(value.into_string_array()?),
            7 => self.bytes = Some(value.into_bytes()?),
            _ => {}
        }
        Ok(())
    }
}

/// Element record for [`Roster::sessions`]; `id` doubles as the map key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub id: Option<i64>,
    pub addr: Option<String>,
}

impl Fields for Session {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.id.map(FieldRef::Int),
            1 => self.addr.as_deref().map(FieldRef::Str),
            _ => None,
        }
    }
}

impl Record for Session {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::scalar("id", 0, FieldKind::Integer),
            FieldDef::scalar("addr", 1, FieldKind::Str),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Session",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.id = Some(value.into_int()?),
            1 => self.addr = Some(value.into_string()?),
            _ => {}
        }
        Ok(())
    }
}

/// Synthetic element record backing [`Roster::labels`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelPair {
    pub key: Option<i64>,
    pub value: Option<String>,
}

impl Fields for LabelPair {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.key.map(FieldRef::Int),
            1 => self.value.as_deref().map(FieldRef::Str),
            _ => None,
        }
    }
}

impl Record for LabelPair {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::scalar("key", 0, FieldKind::Integer),
            FieldDef::scalar("value", 1, FieldKind::Str),
        ];
        static DEF: RecordDef = RecordDef {
            name: "LabelPair",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.key = Some(value.into_int()?),
            1 => self.value = Some(value.into_string()?),
            _ => {}
        }
        Ok(())
    }
}

/// Carries both map flavors: a normal map of [`Session`] records keyed by
/// their own `id`, and a simple map lowered through [`LabelPair`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    pub sessions: Option<BTreeMap<i64, Session>>,
    pub labels: Option<BTreeMap<i64, String>>,
}

impl Fields for Roster {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.sessions.as_ref().map(|m| {
                FieldRef::RecordArray(m.values().map(|s| Some(s as &dyn Fields)).collect())
            }),
            1 => self.labels.as_ref().map(|m| {
                FieldRef::MapEntries(
                    m.iter()
                        .map(|(k, v)| (FieldRef::Int(*k), FieldRef::Str(v.as_str())))
                        .collect(),
                )
            }),
            _ => None,
        }
    }
}

impl Record for Roster {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 2] = [
            FieldDef::map("sessions", 0, NestedType::of::<Session>(), MapDef::normal(0)),
            FieldDef::map(
                "labels",
                1,
                NestedType::of::<LabelPair>(),
                MapDef::simple(0, 1),
            ),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Roster",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => {
                let mut sessions = BTreeMap::new();
                for elem in value.into_record_array::<Session>()? {
                    let Some(session) = elem else {
                        return Err(Error::MalformedHeader);
                    };
                    let Some(id) = session.id else {
                        return Err(Error::MalformedHeader);
                    };
                    sessions.insert(id, session);
                }
                self.sessions = Some(sessions);
            }
            1 => {
                let mut labels = BTreeMap::new();
                for (key, val) in value.into_map_entries()? {
                    labels.insert(key.into_int()?, val.into_string()?);
                }
                self.labels = Some(labels);
            }
            _ => {}
        }
        Ok(())
    }
}

/// The two-person address book used by the reference vectors and benches.
#[must_use]
pub fn address_book() -> AddressBook {
    AddressBook {
        person: Some(vec![
            Some(Person {
                name: opt_string("Alice"),
                id: opt_int(10000),
                email: None,
                phone: Some(vec![
                    Some(PhoneNumber {
                        number: opt_string("123456789"),
                        kind: opt_int(1),
                    }),
                    Some(PhoneNumber {
                        number: opt_string("87654321"),
                        kind: opt_int(2),
                    }),
                ]),
            }),
            Some(Person {
                name: opt_string("Bob"),
                id: opt_int(20000),
                email: None,
                phone: Some(vec![Some(PhoneNumber {
                    number: opt_string("01234567890"),
                    kind: opt_int(3),
                })]),
            }),
        ]),
    }
}
