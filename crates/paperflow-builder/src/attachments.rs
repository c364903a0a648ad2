//! In-memory, content-addressed attachment store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use paperflow_types::SecureHash;

use crate::traits::{Attachment, AttachmentStore};

/// Attachment store keyed by SHA-256 of the content.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    documents: RwLock<HashMap<SecureHash, Arc<[u8]>>>,
}

impl InMemoryAttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` and return its hash. Importing the same bytes twice is a no-op.
    pub fn import(&self, content: &[u8]) -> SecureHash {
        let id = SecureHash::sha256(content);
        let mut docs = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        docs.entry(id).or_insert_with(|| Arc::from(content));
        tracing::debug!(attachment = %id.short(), bytes = content.len(), "attachment imported");
        id
    }

    #[must_use]
    pub fn contains(&self, hash: &SecureHash) -> bool {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(hash)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentStore for InMemoryAttachmentStore {
    fn open(&self, hash: &SecureHash) -> Option<Attachment> {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(hash)
            .map(|content| Attachment {
                id: *hash,
                content: Arc::clone(content),
            })
    }
}
