// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dd_counters::cli::{Args, Command, parse_hex_key};
use dd_counters::config::{config_path, load_config};
use dd_counters::diskstats::Diskstats;
use dd_counters::sink::Buffer;
use dd_counters::{IoCheck, MonotonicClock, beautify_key};
use log::info;

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level)?;

    match args.command {
        Command::Iostat {
            interval_ms,
            count,
            config,
        } => iostat(interval_ms, count, config),
        Command::BeautifyKey { key } => {
            let key = parse_hex_key(&key)?;
            print(&beautify_key(&key)?);
            Ok(())
        }
    }
}

fn iostat(interval_ms: u64, count: u32, config: Option<PathBuf>) -> Result<()> {
    let path = config_path(config);
    let config = load_config(&path)?;
    info!("Loaded io check configuration from {}", path.display());

    let mut check = IoCheck::new(Diskstats::new(), MonotonicClock::default(), &config)?;
    let mut sink = Buffer::default();

    for run in 0..count {
        if run > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
        check.run(&mut sink)?;
        for metric in sink.drain() {
            print(&metric.to_string());
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print(line: &str) {
    println!("{line}");
}
