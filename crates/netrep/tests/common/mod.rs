use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("netrep.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}
