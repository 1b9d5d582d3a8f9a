// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Password compatibility for multi-message overlay.
//!
//! Several messages can share one carrier under different passwords as long
//! as no password's channel-spec pixel is touched by another password's
//! walk: the offset pixel stores the channel set in all three LSBs, so a
//! single foreign write there corrupts the header of the other message.
//! Payload bits may overlap harmlessly in comparison; the damage from a
//! clobbered spec pixel is total, so that is what the check rules out.
//!
//! The check is carrier-independent: only pixel indices up to the largest
//! offset matter, and all offsets are below 256.

use crate::codec::error::Result;
use crate::codec::keys;
use crate::codec::stride;

/// Whether the given passwords can safely overlay messages in one carrier.
///
/// Compatible iff no password's offset pixel collides with another
/// password's offset or lies on another password's walk. Two identical
/// passwords are never compatible (their layouts coincide entirely).
///
/// # Errors
/// [`BuryError::ShortPassword`](crate::codec::error::BuryError::ShortPassword)
/// if any password is shorter than 8 bytes.
pub fn are_compatible(passwords: &[&[u8]]) -> Result<bool> {
    let params = passwords.iter().map(|p| keys::derive(p)).collect::<Result<Vec<_>>>()?;

    let max_offset = params.iter().map(|p| u64::from(p.offset)).max().unwrap_or(0);
    let walks: Vec<Vec<u64>> =
        params.iter().map(|p| stride::demarcate_until(max_offset, p)).collect();

    for (i, a) in params.iter().enumerate() {
        for (j, b) in params.iter().enumerate() {
            if i == j {
                continue;
            }
            if a.offset == b.offset {
                return Ok(false);
            }
            if walks[j].contains(&u64::from(a.offset)) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
