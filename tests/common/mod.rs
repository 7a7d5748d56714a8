//! Shared test helpers for `variants` integration tests.
//!
//! All tests use temp directories; snapshot and config files are written
//! there and the binary runs with that directory as its working directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Fresh temp directory to hold snapshot files.
pub fn workdir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Write `snapshot` as JSON to `<dir>/<name>` and return the path.
pub fn write_snapshot(dir: &Path, name: &str, snapshot: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(snapshot).unwrap())
        .expect("failed to write snapshot");
    path
}

/// The persisted side of the usual two-culture item.
pub fn saved_item() -> Value {
    serde_json::json!({
        "unique": "doc-1",
        "variants": [
            { "culture": "en-US", "name": "Home", "state": "Published" },
            { "culture": "da-DK", "name": "Hjem", "state": "Draft" }
        ],
        "values": [
            { "alias": "title", "culture": "en-US", "value": "Hello" },
            { "alias": "title", "culture": "da-DK", "value": "Hej" },
            { "alias": "logo", "value": "logo.png" }
        ]
    })
}

/// `saved_item` with edits to both cultures and the invariant logo.
pub fn edited_item() -> Value {
    serde_json::json!({
        "unique": "doc-1",
        "variants": [
            { "culture": "en-US", "name": "Home page", "state": "Published" },
            { "culture": "da-DK", "name": "Hjem", "state": "Draft" }
        ],
        "values": [
            { "alias": "title", "culture": "en-US", "value": "Hello there" },
            { "alias": "title", "culture": "da-DK", "value": "Hej med dig" },
            { "alias": "logo", "value": "logo-2.png" }
        ]
    })
}

/// Run the `variants` binary in `dir`, isolated from the caller's
/// environment.
pub fn variants_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_variants"))
        .args(args)
        .current_dir(dir)
        .env_remove("VARIANTS_CONFIG")
        .env_remove("VARIANTS_LOG_FORMAT")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute variants")
}

/// Run variants and assert it succeeds. Returns stdout as string.
pub fn variants_ok(dir: &Path, args: &[&str]) -> String {
    let out = variants_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "variants {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run variants and assert it fails. Returns stderr as string.
pub fn variants_fails(dir: &Path, args: &[&str]) -> String {
    let out = variants_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected variants {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
