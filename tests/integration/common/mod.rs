//! Common test utilities and fixtures for integration tests
//!
//! - `TestHarness`: a workshop bound to a fresh mock platform
//! - Content folder and preview file fixtures in a temporary directory

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;
use workshop_common::WorkshopConfig;
use workshop_platform::mock::MockPlatform;
use workshop_publishing::Workshop;

pub const TEST_APP_ID: &str = "480";

/// Configuration as it would be read from the environment
pub fn test_config() -> Result<WorkshopConfig> {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("WORKSHOP_APP_ID", TEST_APP_ID),
        ("WORKSHOP_CHANGE_NOTE", "Published from integration tests"),
    ]);
    Ok(WorkshopConfig::from_vars(|name| {
        vars.get(name).map(|value| value.to_string())
    })?)
}

#[allow(dead_code)]
pub struct TestHarness {
    pub config: WorkshopConfig,
    pub platform: MockPlatform,
    pub workshop: Workshop,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestHarness {
    pub fn new() -> Result<Self> {
        let config = test_config()?;
        let platform = MockPlatform::new();
        let service = Arc::new(platform.clone());
        let workshop = Workshop::from_config(&config, service.clone(), service);

        Ok(Self {
            config,
            platform,
            workshop,
            dir: TempDir::new()?,
        })
    }

    /// Content folder containing a single asset file
    pub fn content_folder(&self, name: &str) -> Result<PathBuf> {
        let folder = self.dir.path().join(name);
        fs::create_dir_all(&folder)?;
        fs::write(folder.join("asset.bin"), b"workshop content")?;
        Ok(folder)
    }

    /// File of exactly `size` bytes
    pub fn file_of_size(&self, name: &str, size: u64) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        File::create(&path)?.set_len(size)?;
        Ok(path)
    }
}
