//! Lendbook Storage Layer
//!
//! This crate provides the persistence collaborator for the Lendbook ledger.
//! The lifecycle engine only sees the [`LedgerStore`] / [`LedgerTxn`] traits;
//! the backends here implement them.
//!
//! # Features
//!
//! - **Row-level CRUD** for borrowers, loans, installments and payment
//!   transactions
//! - **Atomic units of work**: every change made through one [`LedgerTxn`]
//!   commits together or not at all
//! - **Multiple Backends**: redb (default) and in-memory adapters
//!
//! # Example
//!
//! ```rust,ignore
//! use lendbook_storage::{LedgerStore, LedgerTxn, RedbStorage};
//!
//! let storage = RedbStorage::open("./data/lendbook.redb")?;
//! let mut txn = storage.begin()?;
//! txn.put_loan(&loan)?;
//! txn.commit()?;
//! ```
//!
//! # Storage Backends
//!
//! ## RedbStorage (Default)
//!
//! Uses [redb](https://crates.io/crates/redb), a pure-Rust embedded database
//! with ACID transactions. Suitable for single-process applications.
//!
//! ## InMemoryStorage
//!
//! A simple in-memory implementation for testing and development.
//! Data is not persisted across restarts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod adapter;
mod error;
mod memory;
mod redb;

pub use adapter::{LedgerStore, LedgerTxn, StorageStats};
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryStorage, MemoryTxn};
pub use crate::redb::{RedbStorage, RedbTxn};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapter::{LedgerStore, LedgerTxn, StorageStats};
    pub use crate::error::{StorageError, StorageResult};
    pub use crate::memory::InMemoryStorage;
    pub use crate::redb::RedbStorage;
}
