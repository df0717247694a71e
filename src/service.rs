//! Create, edit and reopen receipts against the external store.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    error::{AddContext, Error},
    form::ReceiptForm,
    numbering::ReceiptNumberGenerator,
    receipt::Receipt,
    store::{ReceiptStore, SequenceSource},
};

pub struct ReceiptService {
    store: Arc<dyn ReceiptStore>,
    numbers: ReceiptNumberGenerator,
}

impl ReceiptService {
    pub fn new(store: Arc<dyn ReceiptStore>, sequence: Arc<dyn SequenceSource>) -> Self {
        Self {
            store,
            numbers: ReceiptNumberGenerator::new(sequence),
        }
    }

    /// Issue a new receipt from a submitted form.
    ///
    /// The form is validated before a number is allocated, so rejected input never consumes a
    /// sequence value.
    ///
    /// # Errors
    /// [`Error`] if the form is invalid or the store rejects the insert.
    pub async fn create(&self, owner_id: &str, form: ReceiptForm) -> Result<Receipt, Error> {
        if let Some(invalid) = form.validate().first() {
            return Err(Error::validation(invalid.message)).add_context("creating receipt");
        }
        let number = self.numbers.next(owner_id, form.receipt_type).await;
        let receipt = form
            .into_receipt(owner_id, &number)
            .add_context("creating receipt")?;
        let created = self.store.create(receipt).await.map_err(|e| {
            error!(owner_id, %number, error = %e, "failed to save receipt");
            e.add_context("saving new receipt")
        })?;
        info!(id = created.id(), number = created.receipt_number(), "receipt issued");
        Ok(created)
    }

    /// Overwrite the receipt stored under `id` with an edited form.
    ///
    /// The stored receipt number, type, owner and creation time are kept. There is no version
    /// check; the last save wins.
    ///
    /// # Errors
    /// [`Error`] if the receipt does not exist, the form is invalid or of another receipt type,
    /// or the store fails.
    pub async fn update(&self, id: &str, form: ReceiptForm) -> Result<Receipt, Error> {
        let existing = self.fetch(id).await.add_context("updating receipt")?;
        if form.receipt_type != existing.receipt_type() {
            return Err(Error::validation(format!(
                "receipt type cannot change from {} to {}",
                existing.receipt_type().as_str(),
                form.receipt_type.as_str()
            ))
            .add_context("updating receipt"));
        }
        let receipt = form
            .into_receipt(existing.owner_id(), existing.receipt_number())
            .add_context("updating receipt")?
            .replacing(&existing);
        self.store
            .update(id, receipt)
            .await
            .add_context(&format!("saving receipt '{id}'"))
    }

    /// Load a stored receipt into a form for editing.
    ///
    /// # Errors
    /// [`Error`] if the receipt does not exist or the store fails.
    pub async fn load_for_edit(&self, id: &str) -> Result<ReceiptForm, Error> {
        let receipt = self.fetch(id).await.add_context("opening receipt for edit")?;
        Ok(ReceiptForm::from_receipt(&receipt))
    }

    async fn fetch(&self, id: &str) -> Result<Receipt, Error> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::store(format!("receipt '{id}' not found")))
    }
}
