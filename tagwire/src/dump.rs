// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema-less wire dump for encoded messages.
//!
//! Renders a message's header slots (skip, embedded, data) with the running
//! tag and a hex preview of each data entry. Useful for inspecting captured
//! payloads without the record types at hand; nested messages are shown as
//! opaque entries.

use core::fmt::Write as _;

use crate::error::Error;
use crate::format::Reader;

/// Longest data-entry prefix shown in a dump line.
const PREVIEW_LEN: usize = 16;

/// Renders one message as a human-readable multi-line dump.
///
/// Trailing bytes after the message are reported but not an error, so dumps
/// work on embedded messages too.
pub fn dump_message(bytes: &[u8]) -> Result<String, Error> {
    let mut r = Reader::new(bytes);
    let count = r.read_u16_le()?;
    let mut slots = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        slots.push(r.read_u16_le()?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "message: {count} slot(s)");
    let mut tag: i32 = -1;
    for (i, &v) in slots.iter().enumerate() {
        if v & 1 == 1 {
            let span = i32::from((v - 1) >> 1) + 1;
            tag = tag.checked_add(span).ok_or(Error::MalformedHeader)?;
            let _ = writeln!(out, "  slot {i}: skip {span} (next tag {})", tag + 1);
        } else {
            tag = tag.checked_add(1).ok_or(Error::MalformedHeader)?;
            if v == 0 {
                let len = r.read_u32_le()? as usize;
                let entry = r.read_bytes(len)?;
                let _ = writeln!(out, "  slot {i}: tag {tag} data[{len}] {}", preview(entry));
            } else {
                let _ = writeln!(out, "  slot {i}: tag {tag} = {}", (v >> 1) - 1);
            }
        }
    }
    let _ = writeln!(out, "consumed {} byte(s), {} trailing", r.offset(), r.remaining());
    Ok(out)
}

fn preview(entry: &[u8]) -> String {
    let mut s = String::with_capacity(3 * PREVIEW_LEN + 1);
    for (i, b) in entry.iter().take(PREVIEW_LEN).enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{b:02x}");
    }
    if entry.len() > PREVIEW_LEN {
        s.push_str(" ..");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_each_slot_form() {
        let bytes = [
            0x03, 0x00, // three slots
            0x00, 0x00, // tag 0, data
            0x1C, 0x00, // tag 1 = 13
            0x02, 0x00, // tag 2 = 0
            0x05, 0x00, 0x00, 0x00, // entry length
            0x41, 0x6C, 0x69, 0x63, 0x65, // "Alice"
        ];
        let text = dump_message(&bytes).unwrap();
        assert!(text.contains("message: 3 slot(s)"));
        assert!(text.contains("slot 0: tag 0 data[5] 41 6c 69 63 65"));
        assert!(text.contains("slot 1: tag 1 = 13"));
        assert!(text.contains("slot 2: tag 2 = 0"));
        assert!(text.contains("consumed 17 byte(s), 0 trailing"));
    }

    #[test]
    fn dumps_skip_slots() {
        let bytes = [
            0x02, 0x00, //
            0x03, 0x00, // skip two tags
            0x04, 0x00, // tag 2 = 1
        ];
        let text = dump_message(&bytes).unwrap();
        assert!(text.contains("slot 0: skip 2 (next tag 2)"));
        assert!(text.contains("slot 1: tag 2 = 1"));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(dump_message(&[0x01]), Err(Error::Truncated));
        assert_eq!(dump_message(&[0x01, 0x00, 0x00, 0x00]), Err(Error::Truncated));
    }
}
