// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PROC_ROOT: OnceLock<PathBuf> = OnceLock::new();
static SYS_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Root of procfs, honouring containerised agents where the host's /proc is
/// mounted elsewhere.
pub fn root_path() -> &'static Path {
    PROC_ROOT.get_or_init(|| resolve("HOST_PROC", "proc"))
}

/// Root of sysfs, resolved the same way as [`root_path`].
pub fn sys_path() -> &'static Path {
    SYS_ROOT.get_or_init(|| resolve("HOST_SYS", "sys"))
}

fn resolve(env_key: &str, name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        return v.into();
    }

    let host = Path::new("/host").join(name);
    if env::var("DOCKER_DD_AGENT").is_ok() && host.exists() {
        return host;
    }

    Path::new("/").join(name)
}
