#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::Path;

use snapbox::cmd::{cargo_bin, Command};
use tempfile::TempDir;

/// A scratch directory to run `diffview` in.
pub struct TestCase {
    dir: TempDir,
}

impl TestCase {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Publish a note the way a maintainer would, by dropping a file in `messages/`.
    pub fn with_note(self, version: &str, body: &str) -> Self {
        let dir = self.path().join("messages");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{version}.txt")), body).unwrap();
        self
    }

    pub fn with_file(self, name: &str, contents: &str) -> Self {
        std::fs::write(self.path().join(name), contents).unwrap();
        self
    }

    pub fn command(&self) -> Command {
        Command::new(cargo_bin!("diffview"))
            .current_dir(self.path())
            .env_remove("DIFFVIEW_CONFIG")
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).expect("file should exist")
    }
}
