//! The external store the receipt engine reads from and writes to.
//!
//! The engine only needs simple keyed CRUD plus a sequence generator, expressed here as three
//! traits. Writes are wholesale: `update` replaces the stored record with no version check, so
//! concurrent edits resolve as last write wins. [`MemoryStore`] implements all three in process.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    client::Client,
    error::Error,
    filter::ReceiptFilter,
    receipt::Receipt,
};

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Every receipt of `owner_id`, newest first.
    async fn get_all(&self, owner_id: &str) -> Result<Vec<Receipt>, Error>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Receipt>, Error>;
    /// Insert a receipt and return it with its assigned id.
    async fn create(&self, receipt: Receipt) -> Result<Receipt, Error>;
    /// Replace the receipt stored under `id`.
    async fn update(&self, id: &str, receipt: Receipt) -> Result<Receipt, Error>;
    /// Remove a receipt permanently.
    async fn delete(&self, id: &str) -> Result<(), Error>;
    async fn delete_bulk(&self, ids: &[String]) -> Result<(), Error>;
    /// Receipts of `owner_id` matching `filter`, newest first.
    async fn filter(&self, owner_id: &str, filter: &ReceiptFilter) -> Result<Vec<Receipt>, Error>;
    async fn recent(&self, owner_id: &str, limit: usize) -> Result<Vec<Receipt>, Error>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Active clients of `owner_id`.
    async fn active_clients(&self, owner_id: &str) -> Result<Vec<Client>, Error>;
    async fn create_client(&self, client: Client) -> Result<Client, Error>;
    /// Flag a client inactive. The record stays in the store.
    async fn deactivate_client(&self, id: &str) -> Result<(), Error>;
    async fn search_by_phone(&self, owner_id: &str, phone: &str) -> Result<Option<Client>, Error>;
}

/// The remote generator of per-owner receipt numbers.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    async fn next_receipt_number(&self, owner_id: &str) -> Result<String, Error>;
}

/// In-process store. Setting it failing makes every call return a store error.
#[derive(Default)]
pub struct MemoryStore {
    receipts: RwLock<HashMap<String, Receipt>>,
    clients: RwLock<HashMap<String, Client>>,
    sequences: RwLock<HashMap<String, u64>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, operation: &str) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::store(format!("{operation}: store unavailable")))
        } else {
            Ok(())
        }
    }

    fn allocate_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }

    async fn owned(&self, owner_id: &str) -> Vec<Receipt> {
        let receipts = self.receipts.read().await;
        let mut owned: Vec<Receipt> = receipts
            .values()
            .filter(|r| r.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        owned
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn get_all(&self, owner_id: &str) -> Result<Vec<Receipt>, Error> {
        self.check("listing receipts")?;
        Ok(self.owned(owner_id).await)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Receipt>, Error> {
        self.check("fetching receipt")?;
        Ok(self.receipts.read().await.get(id).cloned())
    }

    async fn create(&self, receipt: Receipt) -> Result<Receipt, Error> {
        self.check("inserting receipt")?;
        let receipt = receipt.with_id(self.allocate_id("rcpt"));
        self.receipts
            .write()
            .await
            .insert(receipt.id().to_string(), receipt.clone());
        info!(id = receipt.id(), number = receipt.receipt_number(), "receipt created");
        Ok(receipt)
    }

    async fn update(&self, id: &str, receipt: Receipt) -> Result<Receipt, Error> {
        self.check("updating receipt")?;
        let mut receipts = self.receipts.write().await;
        if !receipts.contains_key(id) {
            return Err(Error::store(format!("receipt '{id}' not found")));
        }
        let receipt = receipt.with_id(id).touched(Local::now().into());
        receipts.insert(id.to_string(), receipt.clone());
        info!(id, "receipt overwritten");
        Ok(receipt)
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.check("deleting receipt")?;
        self.receipts.write().await.remove(id);
        info!(id, "receipt deleted");
        Ok(())
    }

    async fn delete_bulk(&self, ids: &[String]) -> Result<(), Error> {
        self.check("deleting receipts")?;
        let mut receipts = self.receipts.write().await;
        for id in ids {
            receipts.remove(id);
        }
        info!(count = ids.len(), "receipts deleted");
        Ok(())
    }

    async fn filter(&self, owner_id: &str, filter: &ReceiptFilter) -> Result<Vec<Receipt>, Error> {
        self.check("filtering receipts")?;
        Ok(self
            .owned(owner_id)
            .await
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    async fn recent(&self, owner_id: &str, limit: usize) -> Result<Vec<Receipt>, Error> {
        self.check("listing recent receipts")?;
        let mut owned = self.owned(owner_id).await;
        owned.truncate(limit);
        Ok(owned)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn active_clients(&self, owner_id: &str) -> Result<Vec<Client>, Error> {
        self.check("listing clients")?;
        Ok(self
            .clients
            .read()
            .await
            .values()
            .filter(|c| c.owner_id() == owner_id && c.is_active())
            .cloned()
            .collect())
    }

    async fn create_client(&self, client: Client) -> Result<Client, Error> {
        self.check("inserting client")?;
        let client = client.with_id(self.allocate_id("client"));
        self.clients
            .write()
            .await
            .insert(client.id().to_string(), client.clone());
        Ok(client)
    }

    async fn deactivate_client(&self, id: &str) -> Result<(), Error> {
        self.check("deactivating client")?;
        let mut clients = self.clients.write().await;
        let client = clients
            .remove(id)
            .ok_or_else(|| Error::store(format!("client '{id}' not found")))?;
        clients.insert(id.to_string(), client.deactivated());
        Ok(())
    }

    async fn search_by_phone(&self, owner_id: &str, phone: &str) -> Result<Option<Client>, Error> {
        self.check("searching clients")?;
        Ok(self
            .clients
            .read()
            .await
            .values()
            .find(|c| c.owner_id() == owner_id && c.phone() == phone && c.is_active())
            .cloned())
    }
}

#[async_trait]
impl SequenceSource for MemoryStore {
    async fn next_receipt_number(&self, owner_id: &str) -> Result<String, Error> {
        self.check("generating receipt number")?;
        let mut sequences = self.sequences.write().await;
        let next = sequences.entry(owner_id.to_string()).or_insert(0);
        *next += 1;
        Ok(format!("RCP-{:05}", *next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::ClientBuilder, receipt::tests::sample_receipt};

    #[tokio::test]
    async fn create_assigns_ids_and_update_overwrites() {
        let store = MemoryStore::new();
        let created = store.create(sample_receipt()).await.unwrap();
        assert_eq!(created.id(), "rcpt-1");

        let first = sample_receipt().with_id("ignored");
        let second = first.clone().replacing(&created);
        store.update(created.id(), first).await.unwrap();
        let stored = store.update(created.id(), second).await.unwrap();
        assert_eq!(stored.id(), created.id());
        assert!(stored.updated_at().is_some());
        assert_eq!(store.get_all("owner-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_a_missing_receipt_is_a_store_error() {
        let store = MemoryStore::new();
        let err = store.update("nope", sample_receipt()).await.unwrap_err();
        assert!(err.is_store());
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let store = MemoryStore::new();
        let a = store.create(sample_receipt()).await.unwrap();
        let b = store.create(sample_receipt()).await.unwrap();
        store.delete(a.id()).await.unwrap();
        assert!(store.get_by_id(a.id()).await.unwrap().is_none());
        store.delete_bulk(&[b.id().to_string()]).await.unwrap();
        assert!(store.get_all("owner-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filter_and_recent_are_scoped_to_the_owner() {
        let store = MemoryStore::new();
        store.create(sample_receipt()).await.unwrap();
        store.create(sample_receipt()).await.unwrap();
        let filter = ReceiptFilter {
            search: Some("asha".to_string()),
            ..Default::default()
        };
        assert_eq!(store.filter("owner-1", &filter).await.unwrap().len(), 2);
        assert!(store.filter("owner-2", &filter).await.unwrap().is_empty());
        assert_eq!(store.recent("owner-1", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deactivated_clients_disappear_from_lookups() {
        let store = MemoryStore::new();
        let client = ClientBuilder::default()
            .owner_id("owner-1")
            .name("Asha Patel")
            .phone("9879973439")
            .build()
            .unwrap();
        let client = store.create_client(client).await.unwrap();
        assert!(
            store
                .search_by_phone("owner-1", "9879973439")
                .await
                .unwrap()
                .is_some()
        );
        store.deactivate_client(client.id()).await.unwrap();
        assert!(
            store
                .search_by_phone("owner-1", "9879973439")
                .await
                .unwrap()
                .is_none()
        );
        assert!(store.active_clients("owner-1").await.unwrap().is_empty());
        assert!(!store.clients.read().await[client.id()].is_active());
    }

    #[tokio::test]
    async fn failing_store_reports_store_errors() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let err = store.get_all("owner-1").await.unwrap_err();
        assert!(err.is_store());
        assert!(store.next_receipt_number("owner-1").await.is_err());
    }
}
