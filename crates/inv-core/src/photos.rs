//! Photo evidence for assets, additional items and locations.
//!
//! Bytes go to the blob store first; the presence flag in the session is
//! only set once the blob write succeeded. The flag is advisory: a missing
//! blob reads back as no photo.

use std::collections::BTreeMap;
use std::fmt;

use inv_model::SessionState;
use inv_persistence::Collection;

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::session::InventorySession;

/// Largest accepted photo.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// What a photo documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhotoTarget {
    /// An inventory asset, by key.
    Inventory(String),
    /// An additional item, by id.
    Additional(String),
    /// A location, by label.
    Location(String),
}

impl PhotoTarget {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Inventory(_) => "inventory",
            Self::Additional(_) => "additional",
            Self::Location(_) => "location",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Inventory(id) | Self::Additional(id) | Self::Location(id) => id,
        }
    }

    /// Key in the photo collection: `"{kind}-{id}"`.
    pub fn blob_key(&self) -> String {
        format!("{}-{}", self.kind(), self.id())
    }

    fn flags<'a>(&self, state: &'a mut SessionState) -> &'a mut BTreeMap<String, bool> {
        match self {
            Self::Inventory(_) => &mut state.photos,
            Self::Additional(_) => &mut state.additional_photos,
            Self::Location(_) => &mut state.location_photos,
        }
    }

    /// Whether the session believes a photo exists.
    pub fn is_flagged(&self, state: &SessionState) -> bool {
        let flags = match self {
            Self::Inventory(_) => &state.photos,
            Self::Additional(_) => &state.additional_photos,
            Self::Location(_) => &state.location_photos,
        };
        flags.get(self.id()).copied().unwrap_or(false)
    }
}

impl fmt::Display for PhotoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.blob_key())
    }
}

impl InventorySession {
    /// Store a photo and flag its target.
    pub async fn attach_photo(&mut self, target: &PhotoTarget, bytes: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(SessionError::PhotoTooLarge {
                size: bytes.len(),
                limit: MAX_PHOTO_BYTES,
            });
        }

        let key = target.blob_key();
        self.blobs.put(Collection::Photos, &key, bytes).await?;

        target
            .flags(self.store.state_mut())
            .insert(target.id().to_string(), true);
        self.log(
            "Foto capturada",
            &format!("Tipo: {}, ID: {}", target.kind(), target.id()),
        );
        tracing::debug!(key = %key, bytes = bytes.len(), "photo stored");
        self.emit(SessionEvent::PhotoUpdated { key });
        self.persist();
        Ok(())
    }

    /// Delete a photo and clear its flag.
    pub async fn remove_photo(&mut self, target: &PhotoTarget) -> Result<()> {
        self.ensure_writable()?;
        let key = target.blob_key();
        self.blobs.delete(Collection::Photos, &key).await?;

        target.flags(self.store.state_mut()).remove(target.id());
        self.log(
            "Foto eliminada",
            &format!("Tipo: {}, ID: {}", target.kind(), target.id()),
        );
        self.emit(SessionEvent::PhotoUpdated { key });
        self.persist();
        Ok(())
    }

    /// Read a photo back. `None` when the blob is missing, flag or not.
    pub async fn photo(&self, target: &PhotoTarget) -> Result<Option<Vec<u8>>> {
        let bytes = self.blobs.get(Collection::Photos, &target.blob_key()).await?;
        if bytes.is_none() && target.is_flagged(self.store.state()) {
            tracing::warn!(key = %target.blob_key(), "photo flagged but missing from blob store");
        }
        Ok(bytes)
    }
}
