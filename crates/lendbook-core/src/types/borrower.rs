//! Borrower records.
//!
//! Display fields here are passthrough data; the lifecycle engine reads them
//! but never changes them.

use serde::{Deserialize, Serialize};

use super::{BorrowerId, Date};
use crate::error::{LedgerError, LedgerResult};

/// A borrower and their guarantor contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    /// Borrower identifier.
    pub id: BorrowerId,
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Guarantor name.
    pub guarantor_name: Option<String>,
    /// Guarantor phone.
    pub guarantor_phone: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Date the borrower was registered.
    pub created_on: Date,
}

/// Attributes supplied when registering a borrower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBorrower {
    /// Full name.
    pub name: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Guarantor name.
    #[serde(default)]
    pub guarantor_name: Option<String>,
    /// Guarantor phone.
    #[serde(default)]
    pub guarantor_phone: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBorrower {
    /// Starts a request with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks the request and builds the record.
    pub fn into_borrower(self, id: BorrowerId, created_on: Date) -> LedgerResult<Borrower> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::validation("borrower name is required"));
        }
        Ok(Borrower {
            id,
            name,
            phone: self.phone,
            address: self.address,
            guarantor_name: self.guarantor_name,
            guarantor_phone: self.guarantor_phone,
            notes: self.notes,
            created_on,
        })
    }
}
