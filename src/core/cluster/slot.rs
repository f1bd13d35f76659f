// src/core/cluster/slot.rs

//! Implements the cluster hash slot algorithm.

use crc::{CRC_16_XMODEM, Crc};

/// The total number of hash slots in a cluster.
pub const SLOT_COUNT: u16 = 16384;

/// The CRC16 variant (XMODEM) mandated by the cluster specification.
const CRC16_ALGO: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculates the hash slot for a given key.
///
/// If the key contains a non-empty "hash tag" (a substring enclosed in the
/// first `{...}` pair), only the tag content is hashed. This lets callers
/// force related keys into the same slot. The result is restricted to the
/// 14-bit keyspace: `CRC16(key) mod 16384`.
pub fn key_hash_slot(key: &[u8]) -> u16 {
    if let Some(start) = key.iter().position(|&b| b == b'{')
        && let Some(end_offset) = key[start + 1..].iter().position(|&b| b == b'}')
    {
        // Ensure the tag is not empty, e.g. "user:{}".
        if end_offset > 0 {
            let tag = &key[start + 1..start + 1 + end_offset];
            return CRC16_ALGO.checksum(tag) % SLOT_COUNT;
        }
    }
    CRC16_ALGO.checksum(key) % SLOT_COUNT
}
