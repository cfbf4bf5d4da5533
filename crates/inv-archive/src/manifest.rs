//! Checksum manifest of a session package.
//!
//! Packages written by earlier releases have no manifest; it is verified
//! only when present.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ArchiveError, Result};
use crate::export::ExportKind;

/// Manifest entry name inside the zip.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Current manifest format.
pub const MANIFEST_VERSION: u32 = 1;

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Entry path -> SHA-256 of its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub version: u32,
    pub kind: ExportKind,
    pub created_at: DateTime<Utc>,
    pub entries: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn new(kind: ExportKind, created_at: DateTime<Utc>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            kind,
            created_at,
            entries: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, path: &str, bytes: &[u8]) {
        self.entries.insert(path.to_string(), sha256_hex(bytes));
    }

    /// Check an entry against its recorded checksum.
    ///
    /// Entries the manifest does not list are accepted.
    pub fn verify(&self, path: &str, bytes: &[u8]) -> Result<()> {
        match self.entries.get(path) {
            Some(expected) if *expected != sha256_hex(bytes) => Err(ArchiveError::malformed(
                format!("checksum mismatch for '{path}'"),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"Hello, World!"),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let mut manifest = PackageManifest::new(ExportKind::Backup, Utc::now());
        manifest.record("photos/inventory-1", b"original");

        assert!(manifest.verify("photos/inventory-1", b"original").is_ok());
        assert!(manifest.verify("photos/inventory-1", b"changed").is_err());
        assert!(manifest.verify("photos/unlisted", b"anything").is_ok());
    }
}
