//! Shared fixtures for session tests.

#![allow(dead_code)]

use inv_core::{AuthConfig, DuplicatePolicy, ImportRequest, InventorySession, SheetRow};
use inv_model::Custodian;
use inv_persistence::{BlobStore, MemoryBackend, StateStore};
use tempfile::TempDir;

pub struct Fixture {
    pub session: InventorySession,
    pub backend: MemoryBackend,
    pub dir: TempDir,
}

pub fn auth() -> AuthConfig {
    AuthConfig::default()
        .with_verifier("41290", "AUDITOR UNO")
        .with_verifier("2875", "AUDITOR DOS")
}

/// Empty session over a memory backend and a scratch blob store.
pub async fn fixture() -> Fixture {
    let backend = MemoryBackend::new();
    let mut store = StateStore::new(backend.clone());
    store.load();
    let dir = tempfile::tempdir().unwrap();
    let blobs = BlobStore::open(dir.path().join("blobs")).await.unwrap();
    let session = InventorySession::new(store, blobs).with_auth(auth());
    Fixture {
        session,
        backend,
        dir,
    }
}

pub fn rows(keys: &[&str]) -> Vec<SheetRow> {
    keys.iter()
        .map(|key| [*key, "SILLA", "OF-1", "MUEBLE", "ACME", "X1", ""].into_iter().collect())
        .collect()
}

pub fn request(file: &str, area: &str, keys: &[&str]) -> ImportRequest {
    ImportRequest::new(file, rows(keys)).with_area_label(format!("AREA {area} OFICINAS"))
}

/// Session with area 7 (10001, 10002), area 8 (20001) and two custodians,
/// ANA (area 7) active.
pub async fn seeded() -> Fixture {
    let mut fx = fixture().await;
    let session = &mut fx.session;
    session
        .import_spreadsheet(request("area7.xlsx", "7", &["10001", "10002"]), DuplicatePolicy::Ask)
        .await
        .unwrap();
    session
        .import_spreadsheet(request("area8.xlsx", "8", &["20001"]), DuplicatePolicy::Ask)
        .await
        .unwrap();
    session
        .add_custodian(Custodian::new("ANA", "7").with_location("OFICINA 1"))
        .unwrap();
    session
        .add_custodian(Custodian::new("LUIS", "8").with_location("BODEGA 1"))
        .unwrap();
    session.activate_custodian("ANA", None).unwrap();
    fx
}
