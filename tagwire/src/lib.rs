// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tagwire`: a compact tag/slot binary message codec with a zero-packed
//! transport.
//!
//! Records declare their wire schema as a static field table and expose
//! their values through the [`schema::Fields`] / [`schema::Record`] traits;
//! the codec turns them into self-delimiting messages with a two-region
//! header/data layout. The packed transform shrinks the zero-dense output
//! further for transport.
//!
//! ## Example
//!
//! ```
//! use tagwire::schema::{FieldDef, FieldKind, Fields, Record, RecordDef};
//! use tagwire::value::{FieldRef, FieldValue};
//! use tagwire::Error;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Contact {
//!     name: Option<String>,
//!     id: Option<i64>,
//! }
//!
//! impl Fields for Contact {
//!     fn field(&self, index: usize) -> Option<FieldRef<'_>> {
//!         match index {
//!             0 => self.name.as_deref().map(FieldRef::Str),
//!             1 => self.id.map(FieldRef::Int),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl Record for Contact {
//!     fn record_def() -> &'static RecordDef {
//!         static FIELDS: [FieldDef; 2] = [
//!             FieldDef::scalar("name", 0, FieldKind::Str),
//!             FieldDef::scalar("id", 1, FieldKind::Integer),
//!         ];
//!         static DEF: RecordDef = RecordDef {
//!             name: "Contact",
//!             fields: &FIELDS,
//!         };
//!         &DEF
//!     }
//!
//!     fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
//!         match index {
//!             0 => self.name = Some(value.into_string()?),
//!             1 => self.id = Some(value.into_int()?),
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let contact = Contact {
//!     name: Some("Ada".into()),
//!     id: Some(7),
//! };
//! let bytes = tagwire::encode(&contact)?;
//!
//! let mut back = Contact::default();
//! let used = tagwire::decode(&bytes, &mut back)?;
//! assert_eq!(used, bytes.len());
//! assert_eq!(back, contact);
//!
//! let packed = tagwire::encode_packed(&contact)?;
//! assert_eq!(tagwire::unpack(&packed)?, bytes);
//! # Ok::<(), tagwire::Error>(())
//! ```

pub mod decode;
pub mod descriptor;
pub mod dump;
pub mod encode;
pub mod error;
pub mod format;
pub mod pack;
pub mod schema;
pub mod value;

pub use decode::decode;
pub use encode::{encode, must_encode};
pub use error::{Error, SchemaError};
pub use pack::{decode_packed, encode_packed, pack, unpack};
pub use value::{opt_bool, opt_bytes, opt_double, opt_int, opt_string};
