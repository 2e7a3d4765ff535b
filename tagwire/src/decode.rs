// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Message decoder.
//!
//! The decoder walks the header slots with a running tag, pairing every `0`
//! slot with the next data entry. Tags that are not in the record's
//! descriptor are tolerated: their data entries are consumed and discarded.

use core::any::Any;

use crate::descriptor::{FieldDescriptor, RecordDescriptor, descriptor_of};
use crate::error::Error;
use crate::format::Reader;
use crate::schema::{FieldKind, MapDef, Record};
use crate::value::FieldValue;

/// Decodes one message from `bytes` into `record`.
///
/// `record` should be a freshly constructed (empty) record; it is replaced
/// wholesale on success and left untouched on error. The whole input must
/// belong to the message: trailing bytes fail with
/// [`Error::MalformedHeader`]. Returns the number of bytes consumed.
pub fn decode<T: Record>(bytes: &[u8], record: &mut T) -> Result<usize, Error> {
    let (decoded, used) = decode_message::<T>(bytes)?;
    if used != bytes.len() {
        return Err(Error::MalformedHeader);
    }
    *record = decoded;
    Ok(used)
}

/// Decodes one message, returning the record and the bytes consumed.
///
/// Embedded callers (nested records, array elements) use this directly and
/// apply their own consumption rules.
pub(crate) fn decode_message<T: Record>(bytes: &[u8]) -> Result<(T, usize), Error> {
    let desc = descriptor_of::<T>()?;
    let mut out = T::default();
    let used = decode_fields(bytes, desc, &mut |index, value| out.set_field(index, value))?;
    Ok((out, used))
}

/// Decodes one complete message into a boxed record of concrete type `T`.
///
/// Used through [`NestedType::decode_boxed`](crate::schema::NestedType) so
/// the decoder can build nested records it cannot name. The element bytes
/// must be consumed exactly.
pub(crate) fn decode_boxed<T: Record>(bytes: &[u8]) -> Result<Box<dyn Any>, Error> {
    let (rec, used) = decode_message::<T>(bytes)?;
    if used != bytes.len() {
        return Err(Error::Length);
    }
    Ok(Box::new(rec))
}

/// A decoded field payload: either a header-embedded value or a data entry.
pub(crate) enum FieldPayload<'a> {
    /// The `(slot >> 1) - 1` value of a nonzero even slot.
    Embedded(u16),
    /// The bytes of the data entry paired with a `0` slot.
    Data(&'a [u8]),
}

/// Walks a message's header slots, yielding `(tag, payload)` per field.
///
/// Skip slots advance the running tag silently; data entries are consumed
/// from the data segment in slot order as their `0` slots are visited.
pub(crate) struct MessageReader<'a> {
    bytes: &'a [u8],
    slot_count: usize,
    next_slot: usize,
    data_offset: usize,
    tag: i32,
}

impl<'a> MessageReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Result<Self, Error> {
        let mut r = Reader::new(bytes);
        let slot_count = usize::from(r.read_u16_le()?);
        let data_offset = 2 + slot_count * 2;
        if bytes.len() < data_offset {
            return Err(Error::Truncated);
        }
        Ok(Self {
            bytes,
            slot_count,
            next_slot: 0,
            data_offset,
            tag: -1,
        })
    }

    fn slot(&self, i: usize) -> u16 {
        let off = 2 + i * 2;
        u16::from_le_bytes([self.bytes[off], self.bytes[off + 1]])
    }

    /// Yields the next field, or `None` once all slots are walked.
    pub(crate) fn next(&mut self) -> Result<Option<(i32, FieldPayload<'a>)>, Error> {
        while self.next_slot < self.slot_count {
            let v = self.slot(self.next_slot);
            self.next_slot += 1;
            if v & 1 == 1 {
                let span = i32::from((v - 1) >> 1) + 1;
                self.tag = self.tag.checked_add(span).ok_or(Error::MalformedHeader)?;
                continue;
            }
            self.tag = self.tag.checked_add(1).ok_or(Error::MalformedHeader)?;
            if v != 0 {
                return Ok(Some((self.tag, FieldPayload::Embedded((v >> 1) - 1))));
            }
            if self.bytes.len() - self.data_offset < 4 {
                return Err(Error::Truncated);
            }
            let len = u32::from_le_bytes([
                self.bytes[self.data_offset],
                self.bytes[self.data_offset + 1],
                self.bytes[self.data_offset + 2],
                self.bytes[self.data_offset + 3],
            ]) as usize;
            let start = self.data_offset + 4;
            let end = start.checked_add(len).ok_or(Error::Truncated)?;
            if end > self.bytes.len() {
                return Err(Error::Truncated);
            }
            self.data_offset = end;
            return Ok(Some((self.tag, FieldPayload::Data(&self.bytes[start..end]))));
        }
        Ok(None)
    }

    /// Bytes consumed so far: the header plus every data entry visited.
    pub(crate) fn used(&self) -> usize {
        self.data_offset
    }
}

/// Walks `bytes` against `desc`, delivering decoded values to `sink`.
///
/// Returns the number of bytes the message occupies. The sink receives the
/// field's declaration index, not its tag.
fn decode_fields(
    bytes: &[u8],
    desc: &RecordDescriptor,
    sink: &mut dyn FnMut(usize, FieldValue) -> Result<(), Error>,
) -> Result<usize, Error> {
    let mut r = MessageReader::new(bytes)?;
    while let Some((tag, payload)) = r.next()? {
        let Some(fd) = desc.field_by_tag(tag) else {
            continue;
        };
        let value = decode_field(fd, payload)?;
        sink(fd.index, value)?;
    }
    Ok(r.used())
}

fn decode_field(fd: &FieldDescriptor, payload: FieldPayload<'_>) -> Result<FieldValue, Error> {
    match payload {
        FieldPayload::Embedded(n) => match (fd.kind, fd.array) {
            (FieldKind::Integer, false) => Ok(FieldValue::Int(i64::from(n))),
            (FieldKind::Boolean, false) => Ok(FieldValue::Bool(n != 0)),
            _ => Err(Error::Type {
                expected: fd.kind_label(),
                got: "embedded value",
            }),
        },
        FieldPayload::Data(entry) => decode_entry(fd, entry),
    }
}

fn decode_entry(fd: &FieldDescriptor, entry: &[u8]) -> Result<FieldValue, Error> {
    match (fd.kind, fd.array) {
        (FieldKind::Integer, false) => match entry.len() {
            4 => Ok(FieldValue::Int(i64::from(i32::from_le_bytes([
                entry[0], entry[1], entry[2], entry[3],
            ])))),
            8 => Ok(FieldValue::Int(i64::from_le_bytes([
                entry[0], entry[1], entry[2], entry[3], entry[4], entry[5], entry[6], entry[7],
            ]))),
            _ => Err(Error::Length),
        },
        (FieldKind::Boolean, false) => {
            // Booleans are always embedded; a data entry is not a valid form.
            Err(Error::Length)
        }
        (FieldKind::Double, false) => {
            if entry.len() != 8 {
                return Err(Error::Length);
            }
            let mut r = Reader::new(entry);
            Ok(FieldValue::Double(r.read_f64_le().map_err(|_| Error::Length)?))
        }
        (FieldKind::Str, false) => Ok(FieldValue::Bytes(entry.to_vec())),
        (FieldKind::Record, false) => {
            let nested = fd.nested.ok_or(Error::Internal {
                reason: "missing nested record type",
            })?;
            Ok(FieldValue::Record((nested.decode_boxed)(entry)?))
        }
        (FieldKind::Integer, true) => {
            let mut r = Reader::new(entry);
            let width = r.read_u8().map_err(|_| Error::Length)?;
            let mut items = Vec::new();
            match width {
                4 => {
                    if r.remaining() % 4 != 0 {
                        return Err(Error::Length);
                    }
                    while r.remaining() > 0 {
                        let raw = r.read_u32_le().map_err(|_| Error::Length)?;
                        items.push(i64::from(raw as i32));
                    }
                }
                8 => {
                    if r.remaining() % 8 != 0 {
                        return Err(Error::Length);
                    }
                    while r.remaining() > 0 {
                        let raw = r.read_u64_le().map_err(|_| Error::Length)?;
                        items.push(raw as i64);
                    }
                }
                _ => return Err(Error::Length),
            }
            Ok(FieldValue::IntArray(items))
        }
        (FieldKind::Boolean, true) => {
            Ok(FieldValue::BoolArray(entry.iter().map(|&b| b != 0).collect()))
        }
        (FieldKind::Double, true) => {
            let mut r = Reader::new(entry);
            let width = r.read_u8().map_err(|_| Error::Length)?;
            if width != 8 || r.remaining() % 8 != 0 {
                return Err(Error::Length);
            }
            let mut items = Vec::new();
            while r.remaining() > 0 {
                items.push(r.read_f64_le().map_err(|_| Error::Length)?);
            }
            Ok(FieldValue::DoubleArray(items))
        }
        (FieldKind::Str, true) => {
            let mut r = Reader::new(entry);
            let mut items = Vec::new();
            while r.remaining() > 0 {
                let len = r.read_u32_le().map_err(|_| Error::Length)? as usize;
                let b = r.read_bytes(len).map_err(|_| Error::Length)?;
                items.push(b.to_vec());
            }
            Ok(FieldValue::BytesArray(items))
        }
        (FieldKind::Record, true) => match fd.map {
            Some(map) if !map.is_normal() => decode_simple_map(fd, map, entry),
            _ => {
                let nested = fd.nested.ok_or(Error::Internal {
                    reason: "missing nested record type",
                })?;
                let mut r = Reader::new(entry);
                let mut items = Vec::new();
                while r.remaining() > 0 {
                    let len = r.read_u32_le().map_err(|_| Error::Length)? as usize;
                    let elem = r.read_bytes(len).map_err(|_| Error::Length)?;
                    if elem == [0x00, 0x00] {
                        // An empty message marks a null element.
                        items.push(None);
                    } else {
                        items.push(Some((nested.decode_boxed)(elem)?));
                    }
                }
                Ok(FieldValue::RecordArray(items))
            }
        },
    }
}

/// Decodes a simple-map data entry into `(key, value)` pairs.
fn decode_simple_map(fd: &FieldDescriptor, map: MapDef, entry: &[u8]) -> Result<FieldValue, Error> {
    let nested = fd.nested_descriptor()?;
    let key_fd = nested.field_by_tag(map.key_tag).ok_or(Error::Internal {
        reason: "unresolved map key field",
    })?;
    let value_fd = nested.field_by_tag(map.value_tag).ok_or(Error::Internal {
        reason: "unresolved map value field",
    })?;

    let mut r = Reader::new(entry);
    let mut entries = Vec::new();
    while r.remaining() > 0 {
        let len = r.read_u32_le().map_err(|_| Error::Length)? as usize;
        let elem = r.read_bytes(len).map_err(|_| Error::Length)?;
        entries.push(decode_map_element(elem, key_fd, value_fd)?);
    }
    Ok(FieldValue::MapEntries(entries))
}

fn decode_map_element(
    bytes: &[u8],
    key_fd: &FieldDescriptor,
    value_fd: &FieldDescriptor,
) -> Result<(FieldValue, FieldValue), Error> {
    let mut key = None;
    let mut value = None;
    let mut r = MessageReader::new(bytes)?;
    while let Some((tag, payload)) = r.next()? {
        if tag == key_fd.tag {
            key = Some(decode_field(key_fd, payload)?);
        } else if tag == value_fd.tag {
            value = Some(decode_field(value_fd, payload)?);
        }
    }
    if r.used() != bytes.len() {
        return Err(Error::Length);
    }
    match (key, value) {
        (Some(k), Some(v)) => Ok((k, v)),
        _ => Err(Error::MalformedHeader),
    }
}
