//! The embedding and extraction engine.
//!
//! A header travels at one bit per unit through the first
//! [`HEADER_UNITS`](crate::frame::HEADER_UNITS) units in natural order, so a
//! reader needs nothing but the carrier to find it. The body follows at the
//! caller's depth, scattered over the remaining units in an order only the
//! key can reproduce.

use std::path::Path;

use log::debug;

use crate::error::LowkeyError;
use crate::frame::{self, Header, Region, HEADER_LEN, HEADER_UNITS};
use crate::keys;
use crate::media::{Carrier, CarrierUnits};
use crate::permutation::Permutation;
use crate::result::Result;

/// Hard ceiling for a declared payload length. A header that claims more is
/// treated as garbage rather than honoured with a giant allocation.
pub const MAX_PAYLOAD_LEN: u32 = 50 * 1024 * 1024;

/// Filename suffixes reported as text payloads after extraction.
pub const TEXT_EXTENSIONS: [&str; 7] = ["txt", "md", "csv", "log", "json", "toml", "xml"];

/// A payload and the filename it travels under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub filename: String,
    pub payload: Vec<u8>,
}

impl Secret {
    pub fn new(filename: impl Into<String>, payload: Vec<u8>) -> Self {
        Secret {
            filename: filename.into(),
            payload,
        }
    }

    /// Reads `path` into memory, keeping only the final path component as
    /// the filename that will travel with the payload.
    pub fn from_file(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(LowkeyError::InvalidFileName)?
            .to_owned();
        let payload = std::fs::read(path).map_err(|source| LowkeyError::ReadError { source })?;

        Ok(Secret { filename, payload })
    }

    /// Whether the filename suffix marks the payload as human readable.
    pub fn is_text(&self) -> bool {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Keyed LSB embedding over any [`Carrier`].
pub struct LsbCodec;

impl LsbCodec {
    /// Hides `secret` inside `carrier`.
    ///
    /// The carrier is only touched once every check has passed; an `Err`
    /// leaves it exactly as it was.
    pub fn embed(
        carrier: &mut Carrier,
        secret: &Secret,
        key: &str,
        depth: u8,
        region: Option<Region>,
    ) -> Result<()> {
        validate_depth(depth)?;
        let material = keys::derive_key(key)?;
        validate_filename(&secret.filename)?;

        let payload_len = secret.payload.len();
        if payload_len == 0 || payload_len > MAX_PAYLOAD_LEN as usize {
            return Err(LowkeyError::InvalidLength {
                field: "payload length",
                value: payload_len as u64,
            });
        }

        let units = carrier.unit_count();
        if units < HEADER_UNITS {
            return Err(LowkeyError::InsufficientCapacity {
                needed: HEADER_UNITS,
                available: units,
            });
        }

        let region = region.filter(|r| !r.is_whole());
        let candidates = candidate_units(carrier, region)?;

        let filename_len = secret.filename.len();
        let body_bits = ((filename_len + payload_len) * 8) as u64;
        let capacity_bits = candidates.len() as u64 * u64::from(depth);
        if body_bits > capacity_bits {
            return Err(LowkeyError::PayloadTooLarge {
                needed_bits: body_bits,
                capacity_bits,
            });
        }

        let header = Header {
            auth_prefix: material.auth_prefix,
            payload_len: payload_len as u32,
            filename_len: filename_len as u8,
            region: region.unwrap_or_default(),
        };

        debug!(
            "embedding {body_bits} body bits over {} candidate units at depth {depth}",
            candidates.len()
        );

        for (idx, bit) in frame::bytes_to_chunks(&header.to_bytes(), 1)?.into_iter().enumerate() {
            carrier.write_lsbs(idx, 1, bit);
        }

        let mut body = Vec::with_capacity(filename_len + payload_len);
        body.extend_from_slice(secret.filename.as_bytes());
        body.extend_from_slice(&secret.payload);

        let order = Permutation::with_seed(material.seed, candidates.len());
        for (chunk, &slot) in frame::bytes_to_chunks(&body, depth)?.iter().zip(order.order()) {
            carrier.write_lsbs(candidates[slot], depth, *chunk);
        }

        Ok(())
    }

    /// Recovers a secret from `carrier`, or explains why there is none.
    pub fn extract(carrier: &Carrier, key: &str, depth: u8) -> Result<Secret> {
        validate_depth(depth)?;
        let material = keys::derive_key(key)?;

        if carrier.unit_count() < HEADER_UNITS {
            return Err(LowkeyError::CorruptHeader);
        }

        let raw = frame::chunks_to_bytes(
            (0..HEADER_UNITS).map(|idx| carrier.read_lsbs(idx, 1)),
            1,
            HEADER_LEN,
        )?;
        let header = Header::from_bytes(&raw)?;

        if header.auth_prefix != material.auth_prefix {
            return Err(LowkeyError::WrongKey);
        }

        if header.filename_len == 0 {
            return Err(LowkeyError::InvalidLength {
                field: "filename length",
                value: 0,
            });
        }
        if header.payload_len == 0 || header.payload_len > MAX_PAYLOAD_LEN {
            return Err(LowkeyError::InvalidLength {
                field: "payload length",
                value: u64::from(header.payload_len),
            });
        }

        let region = Some(header.region).filter(|r| !r.is_whole());
        let candidates = candidate_units(carrier, region)?;

        let body_len = header.filename_len as usize + header.payload_len as usize;
        let body_bits = (body_len * 8) as u64;
        let available_bits = candidates.len() as u64 * u64::from(depth);
        if body_bits > available_bits {
            return Err(LowkeyError::IncompleteData {
                needed_bits: body_bits,
                available_bits,
            });
        }

        debug!(
            "extracting {body_bits} body bits from {} candidate units at depth {depth}",
            candidates.len()
        );

        let chunk_count = (body_len * 8).div_ceil(depth as usize);
        let order = Permutation::with_seed(material.seed, candidates.len());
        let chunks = order.order()[..chunk_count]
            .iter()
            .map(|&slot| carrier.read_lsbs(candidates[slot], depth));
        let mut body = frame::chunks_to_bytes(chunks, depth, body_len)?;

        let payload = body.split_off(header.filename_len as usize);
        let filename = String::from_utf8(body)?;
        // A depth mismatch decodes noise; the filename rules catch it.
        validate_filename(&filename)?;

        Ok(Secret { filename, payload })
    }
}

/// Units eligible for body data, ascending. Images honour an optional
/// region; sample carriers have no geometry to restrict.
pub(crate) fn candidate_units(carrier: &Carrier, region: Option<Region>) -> Result<Vec<usize>> {
    match carrier {
        Carrier::Image(img) => img.candidate_units(region, HEADER_UNITS),
        Carrier::Audio(_) if region.is_some() => Err(LowkeyError::InvalidRegion),
        Carrier::Audio(audio) => Ok((HEADER_UNITS..audio.unit_count()).collect()),
    }
}

pub(crate) fn validate_depth(depth: u8) -> Result<()> {
    if (1..=8).contains(&depth) {
        Ok(())
    } else {
        Err(LowkeyError::InvalidLsbDepth(depth))
    }
}

fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 255 {
        return Err(LowkeyError::InvalidFileName);
    }
    if name.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
        return Err(LowkeyError::InvalidFileName);
    }

    Ok(())
}
