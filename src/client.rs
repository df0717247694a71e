//! Clients of the practice.
//!
//! Unlike receipts, clients are never removed from the store. Deleting a client clears its
//! `is_active` flag and every lookup skips inactive clients.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct Client {
    #[builder(default)]
    #[serde(default)]
    id: String,
    #[builder(default)]
    #[serde(default)]
    owner_id: String,
    name: String,
    phone: String,
    #[builder(default)]
    #[serde(default)]
    email: Option<String>,
    #[builder(default)]
    #[serde(default)]
    address: Option<String>,
    #[builder(default = "true")]
    #[serde(default = "active")]
    is_active: bool,
}

fn active() -> bool {
    true
}

impl Client {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn with_id(self, id: impl Into<String>) -> Client {
        Client {
            id: id.into(),
            ..self
        }
    }

    /// Return the client flagged inactive.
    pub fn deactivated(self) -> Client {
        Client {
            is_active: false,
            ..self
        }
    }
}
