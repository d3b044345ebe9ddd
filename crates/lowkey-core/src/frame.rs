//! Wire framing: the fixed carrier header and the bit-level body packing.
//!
//! The header is a 21 byte record, always written at one bit per unit into
//! the first units of the carrier in natural order, so a decoder can locate
//! it without the key:
//!
//! | offset | len | field                                   |
//! |--------|-----|-----------------------------------------|
//! | 0      | 4   | magic `"STG2"`                          |
//! | 4      | 4   | key authentication prefix               |
//! | 8      | 4   | payload length in bytes, big-endian     |
//! | 12     | 1   | filename length in bytes                |
//! | 13     | 8   | region x1, y1, x2, y2 as big-endian u16 |
//!
//! An all-zero region means "whole carrier". There is exactly one format:
//! anything that does not start with the magic is rejected, never reparsed
//! as some older layout.
//!
//! The body is packed MSB-first: the first bit of the byte stream becomes
//! the highest bit of a depth-sized chunk, and the final partial chunk is
//! zero-padded on the right. Embed and extract agree on this or nothing
//! round-trips, hence the explicit vectors in the tests below.

use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use byteorder::{BigEndian as BE, ByteOrder};

use crate::error::LowkeyError;
use crate::result::Result;

pub const MAGIC: [u8; 4] = *b"STG2";

/// Header size in bytes.
pub const HEADER_LEN: usize = 21;

/// Units the header occupies at its fixed depth of one bit per unit.
pub const HEADER_UNITS: usize = HEADER_LEN * 8;

/// Rectangular pixel region, `x1`/`y1` inclusive, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Region {
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Region { x1, y1, x2, y2 }
    }

    /// The all-zero region stands for "whole carrier".
    pub fn is_whole(&self) -> bool {
        self.x1 == 0 && self.y1 == 0 && self.x2 == 0 && self.y2 == 0
    }
}

/// The self-describing record in front of every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub auth_prefix: [u8; 4],
    pub payload_len: u32,
    pub filename_len: u8,
    pub region: Region,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut raw = [0u8; HEADER_LEN];
        raw[0..4].copy_from_slice(&MAGIC);
        raw[4..8].copy_from_slice(&self.auth_prefix);
        BE::write_u32(&mut raw[8..12], self.payload_len);
        raw[12] = self.filename_len;
        BE::write_u16(&mut raw[13..15], self.region.x1);
        BE::write_u16(&mut raw[15..17], self.region.y1);
        BE::write_u16(&mut raw[17..19], self.region.x2);
        BE::write_u16(&mut raw[19..21], self.region.y2);
        raw
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_LEN || raw[0..4] != MAGIC {
            return Err(LowkeyError::CorruptHeader);
        }

        let mut auth_prefix = [0u8; 4];
        auth_prefix.copy_from_slice(&raw[4..8]);

        Ok(Header {
            auth_prefix,
            payload_len: BE::read_u32(&raw[8..12]),
            filename_len: raw[12],
            region: Region {
                x1: BE::read_u16(&raw[13..15]),
                y1: BE::read_u16(&raw[15..17]),
                x2: BE::read_u16(&raw[17..19]),
                y2: BE::read_u16(&raw[19..21]),
            },
        })
    }
}

/// Splits `data` into chunks of `depth` bits, MSB-first.
///
/// The last chunk is padded with zero bits on the right when the stream
/// length is not a multiple of `depth`.
pub fn bytes_to_chunks(data: &[u8], depth: u8) -> Result<Vec<u8>> {
    let depth = u32::from(depth);
    let total_bits = data.len() * 8;
    let mut reader = BitReader::endian(Cursor::new(data), BigEndian);

    let mut chunks = Vec::with_capacity(total_bits.div_ceil(depth as usize));
    let mut remaining = total_bits as u64;
    while remaining > 0 {
        let take = remaining.min(u64::from(depth)) as u32;
        let bits: u8 = reader.read(take)?;
        chunks.push(bits << (depth - take));
        remaining -= u64::from(take);
    }

    Ok(chunks)
}

/// Reassembles `byte_len` bytes out of depth-sized chunks, MSB-first.
///
/// Inverse of [`bytes_to_chunks`]: data sits in the high bits of the final
/// partial chunk. Surplus chunks are ignored, too few are an error.
pub fn chunks_to_bytes<I>(chunks: I, depth: u8, byte_len: usize) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = u8>,
{
    let depth = u32::from(depth);
    let total_bits = (byte_len * 8) as u64;
    let mut out = Vec::with_capacity(byte_len);

    {
        let mut writer = BitWriter::endian(&mut out, BigEndian);
        let mut written = 0u64;
        for chunk in chunks {
            if written >= total_bits {
                break;
            }
            let take = (total_bits - written).min(u64::from(depth)) as u32;
            writer.write(take, chunk >> (depth - take))?;
            written += u64::from(take);
        }

        if written < total_bits {
            return Err(LowkeyError::IncompleteData {
                needed_bits: total_bits,
                available_bits: written,
            });
        }
    }

    Ok(out)
}
