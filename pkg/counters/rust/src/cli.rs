// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dd-counters")]
#[command(about = "Wraparound-safe iostat metrics and connection key inspection", long_about = None)]
pub struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "DD_LOG_LEVEL", default_value = "info")]
    pub log_level: log::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Sample block device counters and print the resulting metrics
    Iostat {
        /// Time between two samples
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Number of check runs; the first one only has cumulative counts
        #[arg(long, default_value_t = 2)]
        count: u32,

        /// Path to the check configuration (defaults to $DD_COUNTERS_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the human readable form of a hex encoded connection key
    BeautifyKey {
        /// Key bytes as hex, optionally prefixed with 0x
        key: String,
    },
}

/// Decodes a hex string such as the ones printed by debug endpoints.
pub fn parse_hex_key(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() % 2 != 0 {
        bail!("odd number of hex digits in key");
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            let pair = hex
                .get(i..i + 2)
                .with_context(|| format!("non-ascii character at offset {i}"))?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte {pair:?}"))
        })
        .collect()
}
