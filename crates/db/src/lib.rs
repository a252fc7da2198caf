//! Document collections backing bookshelf modules.
//!
//! A [`Database`] hands out named [`Collection`]s of [`Document`]s. Only the
//! in-memory backend exists; collections keep insertion order, which is the
//! store-native order callers observe.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bookshelf_kernel::settings::{DatabaseSettings, StoreBackend};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document has no id")]
    MissingId,

    #[error("collection '{0}' is already open with a different document type")]
    TypeMismatch(String),

    #[error("collection registry lock poisoned")]
    Poisoned,
}

/// A record stored in a [`Collection`], identified by a store-assigned id.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<&str>;

    fn assign_id(&mut self, id: String);
}

/// Cloneable handle onto one named collection.
pub struct Collection<D> {
    name: Arc<str>,
    docs: Arc<RwLock<Vec<D>>>,
}

impl<D> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            docs: self.docs.clone(),
        }
    }
}

impl<D: Document> Collection<D> {
    /// Create a standalone, empty collection.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            docs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace a document. Documents without an id get a fresh UUIDv7.
    pub async fn save(&self, mut doc: D) -> Result<D> {
        if doc.id().is_none() {
            doc.assign_id(Uuid::now_v7().to_string());
        }
        let id = doc.id().ok_or(StoreError::MissingId)?.to_owned();

        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|stored| stored.id() == Some(id.as_str())) {
            Some(stored) => *stored = doc.clone(),
            None => docs.push(doc.clone()),
        }

        tracing::trace!(collection = %self.name, id = %id, "document saved");
        Ok(doc)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| doc.id() == Some(id)).cloned())
    }

    /// Remove a document by its id. Returns whether anything was removed.
    pub async fn delete(&self, doc: &D) -> Result<bool> {
        let id = doc.id().ok_or(StoreError::MissingId)?;

        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|stored| stored.id() != Some(id));
        let removed = docs.len() != before;

        tracing::trace!(collection = %self.name, id = %id, removed, "document deleted");
        Ok(removed)
    }

    pub async fn find_all(&self) -> Result<Vec<D>> {
        Ok(self.docs.read().await.clone())
    }

    /// Return every document matching `predicate`, in store order.
    pub async fn find_where<F>(&self, predicate: F) -> Result<Vec<D>>
    where
        F: Fn(&D) -> bool + Send,
    {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|&doc| predicate(doc)).cloned().collect())
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

/// Entry point to the configured store.
pub struct Database {
    namespace: String,
    backend: StoreBackend,
    collections: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Database {
    pub fn open(settings: &DatabaseSettings) -> Result<Self> {
        tracing::info!(
            target: "bookshelf-db",
            backend = ?settings.backend,
            namespace = %settings.namespace,
            "database opened"
        );

        Ok(Self {
            namespace: settings.namespace.clone(),
            backend: settings.backend,
            collections: Mutex::new(HashMap::new()),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    /// Open (or create) the collection called `name`.
    ///
    /// Every call with the same name shares the same underlying documents.
    pub fn collection<D: Document>(&self, name: &str) -> Result<Collection<D>> {
        let mut collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;

        if let Some(existing) = collections.get(name) {
            return existing
                .downcast_ref::<Collection<D>>()
                .cloned()
                .ok_or_else(|| StoreError::TypeMismatch(name.to_string()));
        }

        let collection = Collection::<D>::new(format!("{}.{}", self.namespace, name));
        collections.insert(name.to_string(), Arc::new(collection.clone()));
        tracing::debug!(target: "bookshelf-db", collection = %collection.name(), "collection created");
        Ok(collection)
    }
}
