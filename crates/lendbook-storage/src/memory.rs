//! In-memory storage adapter.
//!
//! Provides a simple in-memory implementation of the LedgerStore trait.
//! Useful for testing and development. Data is not persisted across restarts.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use lendbook_core::types::{
    Borrower, BorrowerId, Installment, InstallmentId, Loan, LoanId, PaymentTransaction,
    TransactionId,
};

use crate::adapter::{
    sort_borrowers, sort_installments, sort_loans, sort_transactions, LedgerStore, LedgerTxn,
    StorageStats,
};
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    borrowers: BTreeMap<BorrowerId, Borrower>,
    loans: BTreeMap<LoanId, Loan>,
    installments: BTreeMap<InstallmentId, Installment>,
    transactions: BTreeMap<TransactionId, PaymentTransaction>,
}

/// In-memory storage adapter.
///
/// One mutex guards all tables. A unit of work holds the lock for its whole
/// lifetime and edits a staged copy, which replaces the live tables on
/// commit. `begin` clones every table, so each unit of work costs O(rows);
/// this backend is meant for tests and development, not production ledgers.
///
/// # Example
///
/// ```rust
/// use lendbook_storage::{InMemoryStorage, LedgerStore};
///
/// let storage = InMemoryStorage::new();
/// assert!(storage.is_healthy());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }
}

/// Unit of work over [`InMemoryStorage`].
pub struct MemoryTxn<'a> {
    live: MutexGuard<'a, Tables>,
    staged: Tables,
}

impl LedgerStore for InMemoryStorage {
    type Txn<'a> = MemoryTxn<'a> where Self: 'a;

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_healthy(&self) -> bool {
        !self.tables.is_poisoned()
    }

    fn begin(&self) -> StorageResult<MemoryTxn<'_>> {
        let live = self.lock()?;
        let staged = live.clone();
        Ok(MemoryTxn { live, staged })
    }

    fn stats(&self) -> StorageResult<StorageStats> {
        let tables = self.lock()?;
        Ok(StorageStats {
            borrower_count: tables.borrowers.len(),
            loan_count: tables.loans.len(),
            installment_count: tables.installments.len(),
            transaction_count: tables.transactions.len(),
            file_size_bytes: None,
        })
    }
}

impl LedgerTxn for MemoryTxn<'_> {
    fn get_borrower(&self, id: &BorrowerId) -> StorageResult<Option<Borrower>> {
        Ok(self.staged.borrowers.get(id).cloned())
    }

    fn put_borrower(&mut self, borrower: &Borrower) -> StorageResult<()> {
        self.staged.borrowers.insert(borrower.id, borrower.clone());
        Ok(())
    }

    fn delete_borrower(&mut self, id: &BorrowerId) -> StorageResult<bool> {
        Ok(self.staged.borrowers.remove(id).is_some())
    }

    fn list_borrowers(&self) -> StorageResult<Vec<Borrower>> {
        let mut items: Vec<_> = self.staged.borrowers.values().cloned().collect();
        sort_borrowers(&mut items);
        Ok(items)
    }

    fn get_loan(&self, id: &LoanId) -> StorageResult<Option<Loan>> {
        Ok(self.staged.loans.get(id).cloned())
    }

    fn put_loan(&mut self, loan: &Loan) -> StorageResult<()> {
        self.staged.loans.insert(loan.id, loan.clone());
        Ok(())
    }

    fn delete_loan(&mut self, id: &LoanId) -> StorageResult<bool> {
        Ok(self.staged.loans.remove(id).is_some())
    }

    fn list_loans(&self) -> StorageResult<Vec<Loan>> {
        let mut items: Vec<_> = self.staged.loans.values().cloned().collect();
        sort_loans(&mut items);
        Ok(items)
    }

    fn get_installment(&self, id: &InstallmentId) -> StorageResult<Option<Installment>> {
        Ok(self.staged.installments.get(id).cloned())
    }

    fn put_installment(&mut self, installment: &Installment) -> StorageResult<()> {
        self.staged
            .installments
            .insert(installment.id, installment.clone());
        Ok(())
    }

    fn delete_installment(&mut self, id: &InstallmentId) -> StorageResult<bool> {
        Ok(self.staged.installments.remove(id).is_some())
    }

    fn installments_for_loan(&self, loan_id: &LoanId) -> StorageResult<Vec<Installment>> {
        let mut items: Vec<_> = self
            .staged
            .installments
            .values()
            .filter(|i| i.loan_id == *loan_id)
            .cloned()
            .collect();
        sort_installments(&mut items);
        Ok(items)
    }

    fn get_transaction(&self, id: &TransactionId) -> StorageResult<Option<PaymentTransaction>> {
        Ok(self.staged.transactions.get(id).cloned())
    }

    fn put_transaction(&mut self, transaction: &PaymentTransaction) -> StorageResult<()> {
        self.staged
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    fn delete_transaction(&mut self, id: &TransactionId) -> StorageResult<bool> {
        Ok(self.staged.transactions.remove(id).is_some())
    }

    fn transactions_for_installment(
        &self,
        installment_id: &InstallmentId,
    ) -> StorageResult<Vec<PaymentTransaction>> {
        let mut items: Vec<_> = self
            .staged
            .transactions
            .values()
            .filter(|t| t.installment_id == *installment_id)
            .cloned()
            .collect();
        sort_transactions(&mut items);
        Ok(items)
    }

    fn commit(self) -> StorageResult<()> {
        let MemoryTxn { mut live, staged } = self;
        *live = staged;
        Ok(())
    }
}
