// tests/common/mod.rs - Shared test helpers
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="origin" fetch="https://x"/>
  <remote name="mirror" fetch="https://m" review="https://review.m"/>
  <default sync-j="4" revision="main" remote="origin"/>
  <project name="platform/build" path="build" groups="pdk"/>
  <project name="tools/repo" path="tools/repo" remote="mirror" dest-branch="stable"/>
</manifest>
"#;

/// A temp working directory holding a manifest, with methods to run the
/// binary against it.
pub struct ManifestDir {
    pub root: PathBuf,
    _tmp: TempDir,
}

impl ManifestDir {
    pub fn new() -> Self {
        Self::with_manifest(SAMPLE)
    }

    pub fn with_manifest(content: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("default.xml"), content).unwrap();
        ManifestDir { root, _tmp: tmp }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("default.xml")
    }

    pub fn read_manifest(&self) -> String {
        fs::read_to_string(self.manifest_path()).unwrap()
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.root.join(name), content).unwrap();
    }

    pub fn log_contents(&self) -> String {
        fs::read_to_string(self.root.join("test.log")).unwrap_or_default()
    }

    /// Run the binary in the manifest directory, isolated from user config.
    pub fn run(&self, args: &[&str]) -> Output {
        let binary = env!("CARGO_BIN_EXE_manifest-edit");
        Command::new(binary)
            .arg("--config")
            .arg(self.root.join("no-user-config.json"))
            .arg("--log-file")
            .arg(self.root.join("test.log"))
            .args(args)
            .current_dir(&self.root)
            .output()
            .unwrap_or_else(|e| panic!("Failed to run {}: {}", binary, e))
    }

    pub fn run_stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_stderr(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "command {:?} unexpectedly succeeded", args);
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
