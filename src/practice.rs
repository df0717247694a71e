//! Identity of the practice printed at the top of every receipt.

use std::{fs, path::Path};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AddContext, Error};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), pattern = "owned")]
pub struct PracticeIdentity {
    pub practice_name: String,
    pub practitioner_name: String,
    pub credentials: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
    pub email: String,
    pub registration_number: String,
}

impl Default for PracticeIdentity {
    fn default() -> Self {
        PracticeIdentity {
            practice_name: String::from("CORE EDUCATE"),
            practitioner_name: String::from("Dr. Khushali Choksi"),
            credentials: String::from(
                "MPT (MUSCULOSKELETAL SCIENCE), MIAP, CERTIFIED PILATES INSTRUCTOR",
            ),
            address: String::from("Ground Floor, Raj Empire-A, Lunsikui Road"),
            city: String::from("Navsari"),
            state: String::from("Gujarat"),
            pincode: String::from("396445"),
            phone: String::from("98799 73439 / 87992 83930"),
            email: String::from("info@coreeducate.com"),
            registration_number: String::from("L-41870"),
        }
    }
}

impl PracticeIdentity {
    /// Read the practice identity from a JSON settings file.
    ///
    /// # Errors
    /// [`Error`] if the file cannot be read or is not a valid identity.
    pub fn from_file(path: &Path) -> Result<PracticeIdentity, Error> {
        let context = format!("reading practice settings from '{}'", path.to_string_lossy());
        let raw = fs::read_to_string(path)
            .map_err(Error::from)
            .add_context(&context)?;
        serde_json::from_str(&raw)
            .map_err(Error::from)
            .add_context("parsing practice settings")
            .add_context(&context)
    }

    /// Load the identity from `path` when one is given, falling back to the built-in identity
    /// when there is no settings file or it cannot be used.
    pub fn load_or_default(path: Option<&Path>) -> PracticeIdentity {
        match path {
            Some(path) => PracticeIdentity::from_file(path).unwrap_or_else(|e| {
                warn!(error = %e, "practice settings unavailable, using default identity");
                PracticeIdentity::default()
            }),
            None => {
                debug!("no practice settings given, using default identity");
                PracticeIdentity::default()
            }
        }
    }

    /// Single-line postal address, e.g. `Ground Floor, ..., Navsari-396445, Gujarat, India`.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}-{}, {}, India",
            self.address, self.city, self.pincode, self.state
        )
    }
}
