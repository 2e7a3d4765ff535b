// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire-dump example.
//!
//! Run with:
//! `cargo run -p tagwire --example dump`

use tagwire::Error;
use tagwire::dump::dump_message;
use tagwire::schema::{FieldDef, FieldKind, Fields, NestedType, Record, RecordDef};
use tagwire::value::{FieldRef, FieldValue};

#[derive(Debug, Default, PartialEq)]
struct Ticket {
    title: Option<String>,
    priority: Option<i64>,
    open: Option<bool>,
    watchers: Option<Vec<Option<Ticket>>>,
}

impl Fields for Ticket {
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => self.title.as_deref().map(FieldRef::Str),
            1 => self.priority.map(FieldRef::Int),
            2 => self.open.map(FieldRef::Bool),
            3 => self.watchers.as_ref().map(|ws| {
                FieldRef::RecordArray(
                    ws.iter()
                        .map(|w| w.as_ref().map(|t| t as &dyn Fields))
                        .collect(),
                )
            }),
            _ => None,
        }
    }
}

impl Record for Ticket {
    fn record_def() -> &'static RecordDef {
        static FIELDS: [FieldDef; 4] = [
            FieldDef::scalar("title", 0, FieldKind::Str),
            FieldDef::scalar("priority", 1, FieldKind::Integer),
            FieldDef::scalar("open", 2, FieldKind::Boolean),
            FieldDef::record_array("watchers", 4, NestedType::of::<Ticket>()),
        ];
        static DEF: RecordDef = RecordDef {
            name: "Ticket",
            fields: &FIELDS,
        };
        &DEF
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        match index {
            0 => self.title = Some(value.into_string()?),
            1 => self.priority = Some(value.into_int()?),
            2 => self.open = Some(value.into_bool()?),
            3 => self.watchers = Some(value.into_record_array::<Ticket>()?),
            _ => {}
        }
        Ok(())
    }
}

fn main() {
    let ticket = Ticket {
        title: Some("flaky wire dump".into()),
        priority: Some(2),
        open: Some(true),
        watchers: Some(vec![
            Some(Ticket {
                title: Some("alice".into()),
                ..Ticket::default()
            }),
            None,
        ]),
    };

    let bytes = tagwire::must_encode(&ticket);
    println!("{} encoded byte(s)", bytes.len());
    println!("{}", dump_message(&bytes).unwrap());

    let packed = tagwire::encode_packed(&ticket).unwrap();
    println!("{} packed byte(s)", packed.len());
}
