// ==============================================================================
// validator.rs - Input File Validation
// ==============================================================================
// Description: Pre-parse checks on pipeline inputs (existence, size, compression)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::parsers::GZIP_MAGIC;

const MAX_FILE_SIZE: u64 = 8 * 1024 * 1024 * 1024; // 8 GB

#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub path: PathBuf,
    pub size: u64,
    pub gzipped: bool,
}

pub struct InputValidator {
    max_file_size: u64,
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Check that `path` is a readable, non-empty regular file under the size limit
    pub fn validate_file(&self, path: &Path) -> Result<ValidatedFile> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Input file not found: {:?}", path))?;

        if !metadata.is_file() {
            anyhow::bail!("Input is not a regular file: {:?}", path);
        }

        let size = metadata.len();
        if size == 0 {
            anyhow::bail!("Input file is empty: {:?}", path);
        }
        if size > self.max_file_size {
            anyhow::bail!(
                "Input file too large: {:?} is {} bytes (max: {} bytes)",
                path,
                size,
                self.max_file_size
            );
        }

        let magic = self.read_magic_number(path)?;
        let gzipped = magic.starts_with(&GZIP_MAGIC);

        debug!("Validated {:?} ({} bytes, gzip: {})", path, size, gzipped);

        Ok(ValidatedFile {
            path: path.to_path_buf(),
            size,
            gzipped,
        })
    }

    /// Check that `path` is an existing directory
    pub fn validate_dir(&self, path: &Path) -> Result<()> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Directory not found: {:?}", path))?;

        if !metadata.is_dir() {
            anyhow::bail!("Not a directory: {:?}", path);
        }
        Ok(())
    }

    fn read_magic_number(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut buffer = Vec::with_capacity(GZIP_MAGIC.len());
        file.take(GZIP_MAGIC.len() as u64)
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Ok(buffer)
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex-encoded SHA-256 of a file's raw bytes
pub fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
