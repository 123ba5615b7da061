// Common test utilities for storage integration tests

use shelflite_storage::{StorageConfig, SyncMode};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture that owns a temporary data directory
pub struct StorageTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl StorageTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            data_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_path
    }

    #[allow(dead_code)]
    pub fn config(&self) -> StorageConfig {
        StorageConfig::default().with_sync_mode(SyncMode::None)
    }
}

impl Default for StorageTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
