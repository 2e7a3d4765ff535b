// Copyright 2026 the Tagwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The packed transform: run-length compression over 8-byte chunks.
//!
//! Encoded messages are zero-dense (skipped header positions, small
//! integers padded to 32 bits), so the packed transport splits any byte
//! sequence into groups and compresses each group chunk-wise:
//!
//! - an all-zero 8-byte chunk becomes `0x00` plus a count of additional
//!   consecutive all-zero chunks (greedy, capped at 255);
//! - any other chunk becomes a bitmap byte (bit *i* set when byte *i* is
//!   nonzero, LSB first) followed by only the nonzero bytes;
//! - a short final chunk uses the bitmap rule over its actual bytes.
//!
//! Each group is framed as `len:u16 LE` + body. The high bit marks a group
//! stored raw (chunk-packing would not have shrunk it); the low 15 bits are
//! the number of bytes the group decodes to, which is what lets the decoder
//! stop a trailing chunk at the exact original length.

use crate::decode::decode;
use crate::encode::encode;
use crate::error::Error;
use crate::format::Reader;
use crate::schema::Record;

/// Most input bytes one group can cover (the raw flag claims the top bit).
const GROUP_MAX: usize = 0x7FFF;

/// Group-header flag for a raw (uncompressed) group.
const RAW_GROUP: u16 = 0x8000;

/// Longest zero-chunk run one `0x00` header can extend over, minus one.
const ZERO_RUN_MAX: usize = 255;

/// Encodes `record` and packs the result.
pub fn encode_packed<T: Record>(record: &T) -> Result<Vec<u8>, Error> {
    Ok(pack(&encode(record)?))
}

/// Unpacks `bytes` and decodes the result into `record`.
pub fn decode_packed<T: Record>(bytes: &[u8], record: &mut T) -> Result<(), Error> {
    let unpacked = unpack(bytes)?;
    decode(&unpacked, record)?;
    Ok(())
}

/// Packs an arbitrary byte sequence.
///
/// For every input `b`, `unpack(&pack(b))` yields `b` exactly.
#[must_use]
pub fn pack(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 2 + 8);
    for group in input.chunks(GROUP_MAX) {
        let packed = pack_group(group);
        if packed.len() < group.len() {
            out.extend_from_slice(&(group.len() as u16).to_le_bytes());
            out.extend_from_slice(&packed);
        } else {
            out.extend_from_slice(&(group.len() as u16 | RAW_GROUP).to_le_bytes());
            out.extend_from_slice(group);
        }
    }
    out
}

fn pack_group(group: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(group.len() / 4 + 8);
    let mut offset = 0;
    while offset < group.len() {
        let chunk = &group[offset..group.len().min(offset + 8)];
        if chunk.iter().all(|&b| b == 0) {
            let mut end = offset + chunk.len();
            let mut run = 0;
            while run < ZERO_RUN_MAX && end < group.len() {
                let next = &group[end..group.len().min(end + 8)];
                if !next.iter().all(|&b| b == 0) {
                    break;
                }
                run += 1;
                end += next.len();
            }
            out.push(0x00);
            out.push(run as u8);
            offset = end;
        } else {
            let mut bitmap = 0u8;
            for (i, &b) in chunk.iter().enumerate() {
                if b != 0 {
                    bitmap |= 1 << i;
                }
            }
            out.push(bitmap);
            out.extend(chunk.iter().filter(|&&b| b != 0));
            offset += chunk.len();
        }
    }
    out
}

/// Unpacks a packed byte sequence.
pub fn unpack(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut r = Reader::new(input);
    let mut out = Vec::with_capacity(input.len() * 2);
    while r.remaining() > 0 {
        let header = r.read_u16_le()?;
        let len = usize::from(header & 0x7FFF);
        if header & RAW_GROUP != 0 {
            out.extend_from_slice(r.read_bytes(len)?);
        } else {
            unpack_group(&mut r, len, &mut out)?;
        }
    }
    Ok(out)
}

fn unpack_group(r: &mut Reader<'_>, len: usize, out: &mut Vec<u8>) -> Result<(), Error> {
    let mut produced = 0;
    while produced < len {
        let header = r.read_u8()?;
        if header == 0x00 {
            let run = usize::from(r.read_u8()?);
            let n = ((run + 1) * 8).min(len - produced);
            out.resize(out.len() + n, 0);
            produced += n;
        } else {
            let take = (len - produced).min(8);
            for i in 0..take {
                if header & (1 << i) != 0 {
                    out.push(r.read_u8()?);
                } else {
                    out.push(0);
                }
            }
            if take < 8 && header >> take != 0 {
                return Err(Error::Length);
            }
            produced += take;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_a_zero_dense_message() {
        // A 17-byte encoded message: two bitmap chunks plus a short tail.
        let input = [
            0x03, 0x00, 0x00, 0x00, 0x1C, 0x00, 0x02, 0x00, //
            0x05, 0x00, 0x00, 0x00, 0x41, 0x6C, 0x69, 0x63, //
            0x65,
        ];
        let packed = pack(&input);
        assert_eq!(
            packed,
            vec![
                0x11, 0x00, // group decodes to 17 bytes
                0x51, 0x03, 0x1C, 0x02, //
                0xF1, 0x05, 0x41, 0x6C, 0x69, 0x63, //
                0x01, 0x65,
            ]
        );
        assert_eq!(unpack(&packed).unwrap(), input);
    }

    #[test]
    fn zero_chunks_collapse_into_runs() {
        assert_eq!(pack(&[0u8; 16]), vec![0x10, 0x00, 0x00, 0x01]);
        assert_eq!(unpack(&[0x10, 0x00, 0x00, 0x01]).unwrap(), vec![0u8; 16]);

        // A run longer than 256 chunks needs a second header.
        let zeros = vec![0u8; 3000];
        let packed = pack(&zeros);
        assert_eq!(packed, vec![0xB8, 0x0B, 0x00, 0xFF, 0x00, 0x76]);
        assert_eq!(unpack(&packed).unwrap(), zeros);
    }

    #[test]
    fn incompressible_groups_fall_back_to_raw() {
        let input = [1, 2, 3, 4, 5, 6, 7, 8];
        let packed = pack(&input);
        assert_eq!(packed, vec![0x08, 0x80, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(unpack(&packed).unwrap(), input);
    }

    #[test]
    fn empty_input_is_identity() {
        assert_eq!(pack(&[]), Vec::<u8>::new());
        assert_eq!(unpack(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn roundtrips_all_tail_lengths() {
        for len in 0..64 {
            // Mixed content with zero stretches and a nonzero tail.
            let mut input = vec![0u8; len];
            for (i, b) in input.iter_mut().enumerate() {
                if i % 3 == 0 {
                    *b = (i % 251) as u8;
                }
            }
            let packed = pack(&input);
            assert_eq!(unpack(&packed).unwrap(), input, "len {len}");
        }
    }

    #[test]
    fn roundtrips_across_group_boundaries() {
        let mut input = vec![0u8; GROUP_MAX + 1000];
        for (i, b) in input.iter_mut().enumerate() {
            if i % 7 == 0 {
                *b = (i % 256) as u8;
            }
        }
        let packed = pack(&input);
        assert_eq!(unpack(&packed).unwrap(), input);
    }

    #[test]
    fn truncated_packed_input_is_rejected() {
        let packed = pack(&[0u8; 16]);
        for cut in 1..packed.len() {
            assert_eq!(unpack(&packed[..cut]), Err(Error::Truncated), "cut {cut}");
        }
    }

    #[test]
    fn stray_bitmap_bits_past_the_group_end_are_rejected() {
        // Group of one byte whose bitmap claims two.
        let bad = [0x01, 0x00, 0x03, 0xAA, 0xBB];
        assert_eq!(unpack(&bad), Err(Error::Length));
    }
}
