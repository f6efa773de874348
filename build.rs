//! Build script for dietlog
//!
//! Bumps the persisted build counter and embeds build metadata as env vars.

use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let counter_path = PathBuf::from(manifest_dir).join("build_number.txt");

    let previous: u64 = fs::read_to_string(&counter_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let build_number = previous + 1;

    // A read-only checkout still builds, it just keeps reporting the old number.
    let _ = fs::write(&counter_path, build_number.to_string());

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=DIETLOG_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=DIETLOG_BUILD_TIMESTAMP={}", timestamp);
}
