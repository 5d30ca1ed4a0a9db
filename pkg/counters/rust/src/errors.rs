// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid address length: {len} bytes (expected 4 or 16)")]
    InvalidLength { len: usize },

    #[error("invalid counter modulus: {modulus}")]
    InvalidModulus { modulus: i64 },

    #[error("malformed connection key: {reason}")]
    MalformedKey { reason: String },

    #[error("connection family {family} does not match address widths ({source_len}/{dest_len} bytes)")]
    FamilyMismatch {
        family: u8,
        source_len: usize,
        dest_len: usize,
    },

    #[error("could not parse diskstats line: {line}")]
    DiskstatsParse { line: String },
}
