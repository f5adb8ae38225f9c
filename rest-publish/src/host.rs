use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::errors::Error;

/// A document's metadata block.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// What the publisher needs from the application holding the documents.
#[async_trait(?Send)]
pub trait Host {
    /// Raw document content, metadata block included.
    async fn read_document(&self, path: &Path) -> Result<Vec<u8>, Error>;

    /// Empty when the document has no metadata block.
    async fn read_metadata(&self, path: &Path) -> Result<Metadata, Error>;

    /// Replace the whole metadata block.
    async fn write_metadata(&self, path: &Path, metadata: Metadata) -> Result<(), Error>;

    fn notify(&self, message: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryDocument {
    pub content: Vec<u8>,
    pub metadata: Metadata,
}

/// Documents kept in memory. Notifications are recorded instead of shown.
#[derive(Debug, Default)]
pub struct MemoryHost {
    documents: RefCell<HashMap<PathBuf, MemoryDocument>>,
    notifications: RefCell<Vec<String>>,
}

impl MemoryHost {
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>, metadata: Metadata) {
        let document = MemoryDocument {
            content: content.into(),
            metadata,
        };

        self.documents.borrow_mut().insert(path.into(), document);
    }

    pub fn metadata(&self, path: &Path) -> Option<Metadata> {
        self.documents
            .borrow()
            .get(path)
            .map(|doc| doc.metadata.clone())
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Host for MemoryHost {
    async fn read_document(&self, path: &Path) -> Result<Vec<u8>, Error> {
        match self.documents.borrow().get(path) {
            Some(doc) => Ok(doc.content.clone()),
            None => Err(Error::DocumentNotFound),
        }
    }

    async fn read_metadata(&self, path: &Path) -> Result<Metadata, Error> {
        match self.documents.borrow().get(path) {
            Some(doc) => Ok(doc.metadata.clone()),
            None => Err(Error::DocumentNotFound),
        }
    }

    async fn write_metadata(&self, path: &Path, metadata: Metadata) -> Result<(), Error> {
        match self.documents.borrow_mut().get_mut(path) {
            Some(doc) => {
                doc.metadata = metadata;
                Ok(())
            }
            None => Err(Error::DocumentNotFound),
        }
    }

    fn notify(&self, message: &str) {
        self.notifications.borrow_mut().push(message.to_owned());
    }
}
