mod file;
#[cfg(test)]
mod memory;

use anyhow::Result;
use async_trait::async_trait;
pub use file::*;
#[cfg(test)]
pub use memory::*;

/// String key/value persistence, standing in for the browser's local
/// storage.
#[async_trait]
pub trait Storage {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

pub type StorageBox = Box<dyn Storage + Send + Sync>;
