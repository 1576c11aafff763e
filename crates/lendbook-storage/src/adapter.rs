//! Ledger store trait definitions.
//!
//! [`LedgerStore`] is implemented by every backend. All reads and writes go
//! through a [`LedgerTxn`] unit of work so that an installment update, the
//! transaction-log insert and any loan status change land together.

use lendbook_core::types::{
    Borrower, BorrowerId, Installment, InstallmentId, Loan, LoanId, PaymentTransaction,
    TransactionId,
};

use crate::error::StorageResult;

/// Core storage backend trait.
///
/// Units of work are serialized: while one [`LedgerTxn`] is open, `begin`
/// on another thread blocks until it commits or is dropped. Reads inside a
/// unit of work always observe the latest committed state, so a
/// read-modify-write on an installment cannot act on a stale `paid_amount`.
///
/// # Example
///
/// ```rust,ignore
/// use lendbook_storage::{InMemoryStorage, LedgerStore, LedgerTxn};
///
/// let storage = InMemoryStorage::new();
/// let mut txn = storage.begin()?;
/// txn.put_loan(&loan)?;
/// txn.commit()?;
/// ```
pub trait LedgerStore: Send + Sync {
    /// Unit of work handed out by [`LedgerStore::begin`].
    type Txn<'a>: LedgerTxn
    where
        Self: 'a;

    /// Returns the backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Checks if the storage is healthy and accessible.
    fn is_healthy(&self) -> bool;

    /// Opens an exclusive unit of work. Dropping it without
    /// [`LedgerTxn::commit`] discards every change made through it.
    fn begin(&self) -> StorageResult<Self::Txn<'_>>;

    /// Returns storage statistics.
    fn stats(&self) -> StorageResult<StorageStats>;
}

/// Row-level operations inside one unit of work.
pub trait LedgerTxn {
    // =========================================================================
    // BORROWERS
    // =========================================================================

    /// Retrieves a borrower by ID.
    fn get_borrower(&self, id: &BorrowerId) -> StorageResult<Option<Borrower>>;

    /// Inserts or replaces a borrower.
    fn put_borrower(&mut self, borrower: &Borrower) -> StorageResult<()>;

    /// Deletes a borrower row (no cascade).
    fn delete_borrower(&mut self, id: &BorrowerId) -> StorageResult<bool>;

    /// Lists all borrowers ordered by name.
    fn list_borrowers(&self) -> StorageResult<Vec<Borrower>>;

    // =========================================================================
    // LOANS
    // =========================================================================

    /// Retrieves a loan by ID.
    fn get_loan(&self, id: &LoanId) -> StorageResult<Option<Loan>>;

    /// Inserts or replaces a loan.
    fn put_loan(&mut self, loan: &Loan) -> StorageResult<()>;

    /// Deletes a loan row (no cascade).
    fn delete_loan(&mut self, id: &LoanId) -> StorageResult<bool>;

    /// Lists every loan ordered by start date.
    fn list_loans(&self) -> StorageResult<Vec<Loan>>;

    /// Lists a borrower's loans ordered by start date.
    fn loans_for_borrower(&self, borrower_id: &BorrowerId) -> StorageResult<Vec<Loan>> {
        Ok(self
            .list_loans()?
            .into_iter()
            .filter(|l| l.borrower_id == *borrower_id)
            .collect())
    }

    // =========================================================================
    // INSTALLMENTS
    // =========================================================================

    /// Retrieves an installment by ID.
    fn get_installment(&self, id: &InstallmentId) -> StorageResult<Option<Installment>>;

    /// Inserts or replaces an installment.
    fn put_installment(&mut self, installment: &Installment) -> StorageResult<()>;

    /// Deletes an installment row (no cascade).
    fn delete_installment(&mut self, id: &InstallmentId) -> StorageResult<bool>;

    /// Lists a loan's installments in ascending due-date order.
    fn installments_for_loan(&self, loan_id: &LoanId) -> StorageResult<Vec<Installment>>;

    // =========================================================================
    // PAYMENT TRANSACTIONS
    // =========================================================================

    /// Retrieves a payment transaction by ID.
    fn get_transaction(&self, id: &TransactionId) -> StorageResult<Option<PaymentTransaction>>;

    /// Inserts or replaces a payment transaction.
    fn put_transaction(&mut self, transaction: &PaymentTransaction) -> StorageResult<()>;

    /// Deletes a payment transaction row.
    fn delete_transaction(&mut self, id: &TransactionId) -> StorageResult<bool>;

    /// Lists an installment's transactions, most recent paid date first.
    fn transactions_for_installment(
        &self,
        installment_id: &InstallmentId,
    ) -> StorageResult<Vec<PaymentTransaction>>;

    /// Makes every change in this unit of work durable.
    fn commit(self) -> StorageResult<()>
    where
        Self: Sized;
}

/// Canonical ordering for borrower listings.
pub(crate) fn sort_borrowers(items: &mut [Borrower]) {
    items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

/// Canonical ordering for loan listings.
pub(crate) fn sort_loans(items: &mut [Loan]) {
    items.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
}

/// Canonical ordering for installment listings.
pub(crate) fn sort_installments(items: &mut [Installment]) {
    items.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
}

/// Canonical ordering for transaction listings.
pub(crate) fn sort_transactions(items: &mut [PaymentTransaction]) {
    items.sort_by(|a, b| b.paid_date.cmp(&a.paid_date).then(a.id.cmp(&b.id)));
}

/// Storage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of borrowers stored.
    pub borrower_count: usize,
    /// Number of loans stored.
    pub loan_count: usize,
    /// Number of installments stored.
    pub installment_count: usize,
    /// Number of payment transactions stored.
    pub transaction_count: usize,
    /// Database file size in bytes (if applicable).
    pub file_size_bytes: Option<u64>,
}
