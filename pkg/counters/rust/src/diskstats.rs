// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Device snapshots read from `/proc/diskstats`.
//!
//! See: https://www.kernel.org/doc/Documentation/iostats.txt

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::errors::Error;
use crate::iostats::{DeviceIOSample, IoSnapshot};
use crate::procfs;

/// diskstats counts 512-byte sectors whatever the device's block size.
pub const DISKSTATS_SECTOR_SIZE: u64 = 512;

/// Source of per-tick device counters.
pub trait SnapshotProvider {
    fn snapshot(&mut self) -> Result<IoSnapshot>;
}

#[derive(Debug, Clone)]
pub struct Diskstats {
    diskstats: PathBuf,
    sys_block: PathBuf,
}

impl Default for Diskstats {
    fn default() -> Self {
        Self::new()
    }
}

impl Diskstats {
    pub fn new() -> Self {
        Self::with_paths(
            procfs::root_path().join("diskstats"),
            procfs::sys_path().join("block"),
        )
    }

    pub fn with_paths(diskstats: impl Into<PathBuf>, sys_block: impl Into<PathBuf>) -> Self {
        Diskstats {
            diskstats: diskstats.into(),
            sys_block: sys_block.into(),
        }
    }

    /// Device-mapper name of the device, used as its label.
    fn label(&self, device: &str) -> String {
        fs::read_to_string(self.sys_block.join(device).join("dm/name"))
            .map(|name| name.trim().to_string())
            .unwrap_or_default()
    }
}

impl SnapshotProvider for Diskstats {
    fn snapshot(&mut self) -> Result<IoSnapshot> {
        let contents = fs::read_to_string(&self.diskstats)
            .with_context(|| format!("reading {}", self.diskstats.display()))?;

        let mut snapshot = IoSnapshot::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            match parse_line(line) {
                Ok(mut sample) => {
                    sample.label = self.label(&sample.name);
                    snapshot.insert(sample.name.clone(), sample);
                }
                Err(e) => debug!("skipping diskstats entry: {e}"),
            }
        }
        Ok(snapshot)
    }
}

/// Parses one line of diskstats. Fields past the 14th (discard and flush
/// stats on newer kernels) are ignored.
pub fn parse_line(line: &str) -> std::result::Result<DeviceIOSample, Error> {
    let parse_error = || Error::DiskstatsParse {
        line: line.trim().to_string(),
    };

    let mut fields = line.split_whitespace();
    // major and minor numbers
    let (Some(_), Some(_), Some(name)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(parse_error());
    };
    let mut next = || -> std::result::Result<u64, Error> {
        fields
            .next()
            .and_then(|f| f.parse::<u64>().ok())
            .ok_or_else(parse_error)
    };

    let read_count = next()?;
    let merged_read_count = next()?;
    let read_sectors = next()?;
    let read_time = next()?;
    let write_count = next()?;
    let merged_write_count = next()?;
    let write_sectors = next()?;
    let write_time = next()?;
    let iops_in_progress = next()?;
    let io_time = next()?;
    let weighted_io = next()?;

    Ok(DeviceIOSample {
        name: name.to_string(),
        label: String::new(),
        read_count,
        merged_read_count,
        write_count,
        merged_write_count,
        read_bytes: read_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
        write_bytes: write_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
        read_time,
        write_time,
        iops_in_progress,
        io_time,
        weighted_io,
    })
}
