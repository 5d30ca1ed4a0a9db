// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Forward deltas between two samples of a wrapping unsigned counter.
//!
//! See: https://www.kernel.org/doc/Documentation/iostats.txt

use crate::errors::{Error, Result};

/// Largest value of the native signed word. Counters the kernel reports as
/// `unsigned long` wrap here.
#[cfg(target_pointer_width = "64")]
pub const MAX_LONG: i64 = i64::MAX;
#[cfg(not(target_pointer_width = "64"))]
pub const MAX_LONG: i64 = i32::MAX as i64;

/// Largest value of a 32-bit counter. Per-operation time counters are always
/// 32-bit, even on 64-bit hosts, so they must use this and not `MAX_LONG`.
pub const MAX_U32: i64 = u32::MAX as i64;

/// Computes how far a counter moved from `previous` to `current`.
///
/// `modulus` is the largest value the counter can hold before it restarts at
/// zero. When `current < previous` the counter is assumed to have wrapped
/// exactly once; several wraps between two samples can't be told apart from
/// one and are under-reported.
pub fn delta(current: u64, previous: u64, modulus: i64) -> Result<i64> {
    if modulus <= 0 {
        return Err(Error::InvalidModulus { modulus });
    }

    // Reinterpreting the wrapped difference as signed is what exposes the
    // overflow.
    #[allow(clippy::cast_possible_wrap)]
    let raw = current.wrapping_sub(previous) as i64;
    if raw >= 0 {
        return Ok(raw);
    }

    // raw is in [i64::MIN, -1] and modulus in [1, i64::MAX], neither addition
    // can overflow.
    Ok(raw + modulus + 1)
}
