//! Capacity math for caller guidance.
//!
//! Everything here is advisory. The codec re-checks capacity itself right
//! before it mutates a carrier, so these numbers can be shown to a user
//! without becoming load-bearing.

use crate::frame::HEADER_LEN;

/// Body bits available in `candidate_count` units at the given depth.
pub fn capacity_bits(candidate_count: usize, depth: u8) -> u64 {
    candidate_count as u64 * u64::from(depth)
}

/// Body capacity in whole bytes, filename included.
pub fn capacity_bytes(candidate_count: usize, depth: u8) -> u64 {
    capacity_bits(candidate_count, depth) / 8
}

/// Smallest depth at which a payload of `payload_bytes` plus its filename
/// and the fixed header fits, clamped to the valid 1..=8 range.
///
/// A result of 8 does not promise a fit; encode still gets the last word.
pub fn recommended_depth(candidate_count: usize, payload_bytes: u64, filename_len: usize) -> u8 {
    if candidate_count == 0 {
        return 8;
    }

    let total_bits = (payload_bytes + filename_len as u64 + HEADER_LEN as u64) * 8;
    total_bits.div_ceil(candidate_count as u64).clamp(1, 8) as u8
}
