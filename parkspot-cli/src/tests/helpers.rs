//! Test helpers for running commands against a throwaway store.

use super::*;
use camino::Utf8PathBuf;
use serde_json::Value;
use tempfile::TempDir;

/// Temporary directory holding a SQLite store and any input files.
pub(super) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(super) fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 temp path")
    }

    pub(super) fn store(&self) -> Utf8PathBuf {
        self.path("nested/parkspot.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write input file");
        path
    }
}

/// Run a command executor and decode what it printed.
pub(super) fn capture(
    run: impl FnOnce(&mut dyn Write) -> Result<(), CliError>,
) -> Result<Value, CliError> {
    let mut buffer = Vec::new();
    run(&mut buffer)?;
    let text = String::from_utf8(buffer).expect("utf-8 output");
    assert!(text.ends_with('\n'), "output should end with a newline");
    Ok(serde_json::from_str(&text).expect("JSON output"))
}

/// Ids of a JSON array of locations or matches, in output order.
pub(super) fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("JSON array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_owned())
        .collect()
}
