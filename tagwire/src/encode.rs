// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Message encoder.
//!
//! A message is a `u16` slot count, that many `u16` header slots, and a data
//! segment of `u32`-length-prefixed payloads, one per `0` slot in header
//! order. Booleans and small non-negative integers travel embedded in their
//! header slot; everything else lands in the data segment. Fields are
//! emitted in ascending tag order, with skip slots covering tag gaps.

use crate::descriptor::{FieldDescriptor, RecordDescriptor, descriptor_of};
use crate::error::Error;
use crate::format::Writer;
use crate::schema::{FieldKind, Fields, MapDef, Record};
use crate::value::FieldRef;

/// Largest integer that can be embedded in a header slot.
const MAX_EMBEDDED_INT: i64 = 0x7FFE;

/// Largest tag gap one skip slot can cover.
const MAX_SKIP_SPAN: i32 = 0x8000;

/// Initial data-segment buffer size.
const DATA_BUFFER_HINT: usize = 4096;

/// Encodes `record` into a self-delimiting message.
pub fn encode<T: Record>(record: &T) -> Result<Vec<u8>, Error> {
    let desc = descriptor_of::<T>()?;
    encode_message(desc, Some(record))
}

/// Encodes `record`, panicking on error.
///
/// This is a convenience for tests and examples; use [`encode`] anywhere an
/// error must be handled.
#[must_use]
pub fn must_encode<T: Record>(record: &T) -> Vec<u8> {
    match encode(record) {
        Ok(bytes) => bytes,
        Err(e) => panic!("tagwire: encode failed: {e}"),
    }
}

/// Encodes one message for `record` against `desc`.
///
/// `None` stands for a null record and produces the empty message (a zero
/// slot count and no data), which is how null elements inside record arrays
/// travel.
pub(crate) fn encode_message(
    desc: &RecordDescriptor,
    record: Option<&dyn Fields>,
) -> Result<Vec<u8>, Error> {
    let mut b = MessageBuilder::new();
    if let Some(rec) = record {
        for fd in desc.ordered() {
            let Some(value) = rec.field(fd.index) else {
                continue;
            };
            b.add(fd, value)?;
        }
    }
    b.finish()
}

fn fits_i32(n: i64) -> bool {
    n >= i64::from(i32::MIN) && n <= i64::from(i32::MAX)
}

fn mismatch(fd: &FieldDescriptor, value: &FieldRef<'_>) -> Error {
    Error::Type {
        expected: fd.kind_label(),
        got: value.kind_name(),
    }
}

/// Accumulates header slots and data entries for one message.
struct MessageBuilder {
    slots: Vec<u16>,
    data: Writer,
    prev_tag: i32,
}

impl MessageBuilder {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            data: Writer::with_capacity(DATA_BUFFER_HINT),
            prev_tag: -1,
        }
    }

    /// Emits one present field: skip slots for any tag gap, the field's
    /// header slot, and its data entry when the value is not embedded.
    fn add(&mut self, fd: &FieldDescriptor, value: FieldRef<'_>) -> Result<(), Error> {
        let slot = self.encode_field(fd, value)?;
        self.push_skips(fd.tag);
        self.slots.push(slot);
        self.prev_tag = fd.tag;
        Ok(())
    }

    fn push_skips(&mut self, tag: i32) {
        let mut span = tag - self.prev_tag - 1;
        while span > 0 {
            let step = span.min(MAX_SKIP_SPAN);
            self.slots.push((((step - 1) * 2) + 1) as u16);
            span -= step;
        }
    }

    fn write_entry(&mut self, payload: &[u8]) -> Result<(), Error> {
        let len = u32::try_from(payload.len()).map_err(|_| Error::Internal {
            reason: "data entry exceeds u32 length",
        })?;
        self.data.write_u32_le(len);
        self.data.write_bytes(payload);
        Ok(())
    }

    /// Encodes one field value, returning its header slot. Embedded values
    /// return a nonzero even slot; everything else writes a data entry and
    /// returns `0`.
    fn encode_field(&mut self, fd: &FieldDescriptor, value: FieldRef<'_>) -> Result<u16, Error> {
        match (fd.kind, fd.array) {
            (FieldKind::Boolean, false) => {
                let FieldRef::Bool(v) = value else {
                    return Err(mismatch(fd, &value));
                };
                Ok(2 * (u16::from(v) + 1))
            }
            (FieldKind::Integer, false) => {
                let FieldRef::Int(n) = value else {
                    return Err(mismatch(fd, &value));
                };
                if (0..=MAX_EMBEDDED_INT).contains(&n) {
                    return Ok((n as u16 + 1) * 2);
                }
                if fits_i32(n) {
                    self.write_entry(&(n as i32).to_le_bytes())?;
                } else {
                    self.write_entry(&n.to_le_bytes())?;
                }
                Ok(0)
            }
            (FieldKind::Double, false) => {
                let FieldRef::Double(v) = value else {
                    return Err(mismatch(fd, &value));
                };
                self.write_entry(&v.to_bits().to_le_bytes())?;
                Ok(0)
            }
            (FieldKind::Str, false) => match value {
                FieldRef::Str(s) => {
                    self.write_entry(s.as_bytes())?;
                    Ok(0)
                }
                FieldRef::Bytes(b) => {
                    self.write_entry(b)?;
                    Ok(0)
                }
                other => Err(mismatch(fd, &other)),
            },
            (FieldKind::Record, false) => {
                let FieldRef::Record(rec) = value else {
                    return Err(mismatch(fd, &value));
                };
                let nested = fd.nested_descriptor()?;
                let msg = encode_message(nested, Some(rec))?;
                self.write_entry(&msg)?;
                Ok(0)
            }
            (FieldKind::Integer, true) => {
                let FieldRef::IntArray(items) = value else {
                    return Err(mismatch(fd, &value));
                };
                let width: u8 = if items.iter().any(|&n| !fits_i32(n)) {
                    8
                } else {
                    4
                };
                let mut payload = Writer::with_capacity(1 + items.len() * usize::from(width));
                payload.write_u8(width);
                for &n in items {
                    if width == 4 {
                        payload.write_u32_le(n as i32 as u32);
                    } else {
                        payload.write_u64_le(n as u64);
                    }
                }
                self.write_entry(payload.as_slice())?;
                Ok(0)
            }
            (FieldKind::Boolean, true) => {
                let FieldRef::BoolArray(items) = value else {
                    return Err(mismatch(fd, &value));
                };
                let payload: Vec<u8> = items.iter().map(|&b| u8::from(b)).collect();
                self.write_entry(&payload)?;
                Ok(0)
            }
            (FieldKind::Double, true) => {
                let FieldRef::DoubleArray(items) = value else {
                    return Err(mismatch(fd, &value));
                };
                let mut payload = Writer::with_capacity(1 + items.len() * 8);
                payload.write_u8(8);
                for &v in items {
                    payload.write_f64_le(v);
                }
                self.write_entry(payload.as_slice())?;
                Ok(0)
            }
            (FieldKind::Str, true) => {
                let mut payload = Writer::new();
                match value {
                    FieldRef::StrArray(items) => {
                        for s in items {
                            write_prefixed(&mut payload, s.as_bytes())?;
                        }
                    }
                    FieldRef::BytesArray(items) => {
                        for b in items {
                            write_prefixed(&mut payload, b)?;
                        }
                    }
                    other => return Err(mismatch(fd, &other)),
                }
                self.write_entry(payload.as_slice())?;
                Ok(0)
            }
            (FieldKind::Record, true) => match fd.map {
                Some(map) if !map.is_normal() => self.encode_simple_map(fd, map, value),
                _ => {
                    let FieldRef::RecordArray(items) = value else {
                        return Err(mismatch(fd, &value));
                    };
                    let nested = fd.nested_descriptor()?;
                    let mut payload = Writer::new();
                    for item in items {
                        let msg = encode_message(nested, item)?;
                        write_prefixed(&mut payload, &msg)?;
                    }
                    self.write_entry(payload.as_slice())?;
                    Ok(0)
                }
            },
        }
    }

    /// Lowers simple-map entries into an array of two-field element
    /// messages, key and value at their element tags.
    fn encode_simple_map(
        &mut self,
        fd: &FieldDescriptor,
        map: MapDef,
        value: FieldRef<'_>,
    ) -> Result<u16, Error> {
        let FieldRef::MapEntries(entries) = value else {
            return Err(mismatch(fd, &value));
        };
        let nested = fd.nested_descriptor()?;
        let key_fd = nested.field_by_tag(map.key_tag).ok_or(Error::Internal {
            reason: "unresolved map key field",
        })?;
        let value_fd = nested.field_by_tag(map.value_tag).ok_or(Error::Internal {
            reason: "unresolved map value field",
        })?;

        let mut payload = Writer::new();
        for (key, val) in entries {
            let mut elem = MessageBuilder::new();
            if key_fd.tag < value_fd.tag {
                elem.add(key_fd, key)?;
                elem.add(value_fd, val)?;
            } else {
                elem.add(value_fd, val)?;
                elem.add(key_fd, key)?;
            }
            let msg = elem.finish()?;
            write_prefixed(&mut payload, &msg)?;
        }
        self.write_entry(payload.as_slice())?;
        Ok(0)
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        let count = u16::try_from(self.slots.len()).map_err(|_| Error::Internal {
            reason: "header slot count exceeds u16",
        })?;
        let mut out = Writer::with_capacity(2 + self.slots.len() * 2 + self.data.len());
        out.write_u16_le(count);
        for s in &self.slots {
            out.write_u16_le(*s);
        }
        out.write_bytes(self.data.as_slice());
        Ok(out.into_vec())
    }
}

fn write_prefixed(payload: &mut Writer, element: &[u8]) -> Result<(), Error> {
    let len = u32::try_from(element.len()).map_err(|_| Error::Internal {
        reason: "array element exceeds u32 length",
    })?;
    payload.write_u32_le(len);
    payload.write_bytes(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, RecordDef};
    use crate::value::FieldValue;

    #[derive(Default)]
    struct Sample {
        id: Option<i64>,
        flag: Option<bool>,
        tail: Option<Vec<i64>>,
    }

    impl Fields for Sample {
        fn field(&self, index: usize) -> Option<FieldRef<'_>> {
            match index {
                0 => self.id.map(FieldRef::Int),
                1 => self.flag.map(FieldRef::Bool),
                2 => self.tail.as_deref().map(FieldRef::IntArray),
                _ => None,
            }
        }
    }

    impl Record for Sample {
        fn record_def() -> &'static RecordDef {
            static FIELDS: [FieldDef; 3] = [
                FieldDef::scalar("id", 0, FieldKind::Integer),
                FieldDef::scalar("flag", 1, FieldKind::Boolean),
                FieldDef::array("tail", 4, FieldKind::Integer),
            ];
            static DEF: RecordDef = RecordDef {
                name: "Sample",
                fields: &FIELDS,
            };
            &DEF
        }

        fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
            match index {
                0 => self.id = Some(value.into_int()?),
                1 => self.flag = Some(value.into_bool()?),
                2 => self.tail = Some(value.into_int_array()?),
                _ => {}
            }
            Ok(())
        }
    }

    #[test]
    fn embedded_skip_and_data_slots() {
        let s = Sample {
            id: Some(5),
            flag: Some(true),
            tail: Some(vec![1]),
        };
        let bytes = encode(&s).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x04, 0x00, // four slots
                0x0C, 0x00, // id = 5 embedded
                0x04, 0x00, // flag = true embedded
                0x03, 0x00, // skip tags 2..=3
                0x00, 0x00, // tail in data part
                0x05, 0x00, 0x00, 0x00, // entry length
                0x04, // 32-bit elements
                0x01, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn absent_fields_emit_nothing() {
        let bytes = encode(&Sample::default()).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00]);
    }

    #[test]
    fn empty_integer_array_keeps_its_width_byte() {
        let s = Sample {
            tail: Some(Vec::new()),
            ..Sample::default()
        };
        let bytes = encode(&s).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x02, 0x00, // skip + data slot
                0x07, 0x00, // skip tags 0..=3
                0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x04,
            ]
        );
    }

    #[test]
    fn integer_scalar_width_tracks_the_value() {
        // First value outside the embedded range goes to the data part as
        // 4 bytes; anything outside signed 32-bit takes 8.
        let small = Sample {
            id: Some(0x7FFF),
            ..Sample::default()
        };
        let bytes = encode(&small).unwrap();
        assert_eq!(
            bytes,
            vec![0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x00, 0x00]
        );

        let negative = Sample {
            id: Some(-1),
            ..Sample::default()
        };
        let bytes = encode(&negative).unwrap();
        assert_eq!(
            bytes,
            vec![0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );

        let wide = Sample {
            id: Some(0x8000_0000),
            ..Sample::default()
        };
        let bytes = encode(&wide).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x01, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn wide_array_elements_promote_the_whole_array() {
        let s = Sample {
            tail: Some(vec![1, (1 << 32) + 2]),
            ..Sample::default()
        };
        let bytes = encode(&s).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x02, 0x00, 0x07, 0x00, 0x00, 0x00, //
                0x11, 0x00, 0x00, 0x00, // 1 + 2 * 8
                0x08, //
                0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
                0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn kind_mismatch_is_a_type_error() {
        struct Lying;

        impl Fields for Lying {
            fn field(&self, _index: usize) -> Option<FieldRef<'_>> {
                Some(FieldRef::Double(1.0))
            }
        }

        impl Default for Lying {
            fn default() -> Self {
                Lying
            }
        }

        impl Record for Lying {
            fn record_def() -> &'static RecordDef {
                static FIELDS: [FieldDef; 1] = [FieldDef::scalar("id", 0, FieldKind::Integer)];
                static DEF: RecordDef = RecordDef {
                    name: "Lying",
                    fields: &FIELDS,
                };
                &DEF
            }

            fn set_field(&mut self, _index: usize, _value: FieldValue) -> Result<(), Error> {
                Ok(())
            }
        }

        let err = encode(&Lying).unwrap_err();
        assert_eq!(
            err,
            Error::Type {
                expected: "integer",
                got: "double",
            }
        );
    }
}
