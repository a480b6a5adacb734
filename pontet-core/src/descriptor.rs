//! # Descriptor Loader
//!
//! Loads Protobuf `FileDescriptorSet`s into [`DescriptorPool`]s. Parsed
//! pools are cached by path, so repeated loads of the same file are O(1)
//! and do not touch the filesystem again.
//!
//! Downstream type mapping depends on exact field shapes, so the pool is
//! kept verbatim; how field names, 64-bit integers and enums surface in
//! JSON is decided by the codec (see [`crate::grpc::codec`]).
use prost_reflect::DescriptorPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptorLoadError {
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode descriptor set: {0}")]
    Decode(#[from] prost_reflect::DescriptorError),
}

/// Loads binary descriptor sets from disk, caching parsed pools by path.
#[derive(Debug, Default)]
pub struct DescriptorLoader {
    cache: RwLock<HashMap<PathBuf, DescriptorPool>>,
}

impl DescriptorLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a `FileDescriptorSet` directly from a byte slice.
    /// Useful for tests or embedded descriptors.
    pub fn decode(bytes: &[u8]) -> Result<DescriptorPool, DescriptorLoadError> {
        Ok(DescriptorPool::decode(bytes)?)
    }

    /// Loads a `FileDescriptorSet` from a file on disk, reusing the cached
    /// pool when the path has been loaded before.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DescriptorPool, DescriptorLoadError> {
        let path = path.as_ref();
        if let Some(pool) = self
            .cache
            .read()
            .expect("descriptor cache poisoned")
            .get(path)
        {
            return Ok(pool.clone());
        }

        let bytes = std::fs::read(path)?;
        let pool = DescriptorPool::decode(bytes.as_slice())?;

        let mut cache = self.cache.write().expect("descriptor cache poisoned");
        Ok(cache.entry(path.to_path_buf()).or_insert(pool).clone())
    }
}
