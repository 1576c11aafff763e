//! RedbStorage implementation.
//!
//! Implements the LedgerStore trait using redb as the underlying database.
//! Every unit of work is a redb write transaction; redb admits one writer at
//! a time, which serializes collections against the same installment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use lendbook_core::types::{
    Borrower, BorrowerId, Installment, InstallmentId, Loan, LoanId, PaymentTransaction,
    TransactionId,
};

use crate::adapter::{
    sort_borrowers, sort_installments, sort_loans, sort_transactions, LedgerStore, LedgerTxn,
    StorageStats,
};
use crate::error::StorageResult;

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

// Table definitions
const BORROWERS_TABLE: JsonTable = TableDefinition::new("borrowers");
const LOANS_TABLE: JsonTable = TableDefinition::new("loans");
const INSTALLMENTS_TABLE: JsonTable = TableDefinition::new("installments");
const TRANSACTIONS_TABLE: JsonTable = TableDefinition::new("transactions");

/// Redb-based storage adapter.
///
/// Rows are stored as JSON keyed by their UUID string.
///
/// # Example
///
/// ```rust,ignore
/// use lendbook_storage::{RedbStorage, LedgerStore};
///
/// let storage = RedbStorage::open("./data/lendbook.redb")?;
/// assert!(storage.is_healthy());
/// ```
pub struct RedbStorage {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStorage {
    /// Opens or creates a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(&path)?;
        let storage = Self {
            db: Arc::new(db),
            path,
        };
        storage.initialize_tables()?;
        Ok(storage)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initializes all required tables.
    fn initialize_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(BORROWERS_TABLE)?;
            let _ = write_txn.open_table(LOANS_TABLE)?;
            let _ = write_txn.open_table(INSTALLMENTS_TABLE)?;
            let _ = write_txn.open_table(TRANSACTIONS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Unit of work over [`RedbStorage`].
pub struct RedbTxn {
    txn: WriteTransaction,
}

impl RedbTxn {
    fn get_row<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> StorageResult<Option<T>> {
        let table = self.txn.open_table(table)?;
        let row = match table.get(key)? {
            Some(data) => Some(serde_json::from_slice(data.value())?),
            None => None,
        };
        Ok(row)
    }

    fn put_row<T: Serialize>(&mut self, table: JsonTable, key: &str, row: &T) -> StorageResult<()> {
        let data = serde_json::to_vec(row)?;
        let mut table = self.txn.open_table(table)?;
        table.insert(key, data.as_slice())?;
        Ok(())
    }

    fn delete_row(&mut self, table: JsonTable, key: &str) -> StorageResult<bool> {
        let mut table = self.txn.open_table(table)?;
        let removed = table.remove(key)?.is_some();
        Ok(removed)
    }

    fn scan<T, F>(&self, table: JsonTable, mut keep: F) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let table = self.txn.open_table(table)?;
        let mut rows = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let row: T = serde_json::from_slice(value.value())?;
            if keep(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl LedgerStore for RedbStorage {
    type Txn<'a> = RedbTxn where Self: 'a;

    fn backend_name(&self) -> &'static str {
        "redb"
    }

    fn is_healthy(&self) -> bool {
        // Try a simple read transaction to verify database is accessible
        self.db.begin_read().is_ok()
    }

    fn begin(&self) -> StorageResult<RedbTxn> {
        Ok(RedbTxn {
            txn: self.db.begin_write()?,
        })
    }

    fn stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let count = |table: JsonTable| -> StorageResult<usize> {
            Ok(read_txn.open_table(table)?.len()? as usize)
        };

        Ok(StorageStats {
            borrower_count: count(BORROWERS_TABLE)?,
            loan_count: count(LOANS_TABLE)?,
            installment_count: count(INSTALLMENTS_TABLE)?,
            transaction_count: count(TRANSACTIONS_TABLE)?,
            file_size_bytes: std::fs::metadata(&self.path).ok().map(|m| m.len()),
        })
    }
}

impl LedgerTxn for RedbTxn {
    fn get_borrower(&self, id: &BorrowerId) -> StorageResult<Option<Borrower>> {
        self.get_row(BORROWERS_TABLE, &id.to_string())
    }

    fn put_borrower(&mut self, borrower: &Borrower) -> StorageResult<()> {
        self.put_row(BORROWERS_TABLE, &borrower.id.to_string(), borrower)
    }

    fn delete_borrower(&mut self, id: &BorrowerId) -> StorageResult<bool> {
        self.delete_row(BORROWERS_TABLE, &id.to_string())
    }

    fn list_borrowers(&self) -> StorageResult<Vec<Borrower>> {
        let mut items = self.scan(BORROWERS_TABLE, |_: &Borrower| true)?;
        sort_borrowers(&mut items);
        Ok(items)
    }

    fn get_loan(&self, id: &LoanId) -> StorageResult<Option<Loan>> {
        self.get_row(LOANS_TABLE, &id.to_string())
    }

    fn put_loan(&mut self, loan: &Loan) -> StorageResult<()> {
        self.put_row(LOANS_TABLE, &loan.id.to_string(), loan)
    }

    fn delete_loan(&mut self, id: &LoanId) -> StorageResult<bool> {
        self.delete_row(LOANS_TABLE, &id.to_string())
    }

    fn list_loans(&self) -> StorageResult<Vec<Loan>> {
        let mut items = self.scan(LOANS_TABLE, |_: &Loan| true)?;
        sort_loans(&mut items);
        Ok(items)
    }

    fn get_installment(&self, id: &InstallmentId) -> StorageResult<Option<Installment>> {
        self.get_row(INSTALLMENTS_TABLE, &id.to_string())
    }

    fn put_installment(&mut self, installment: &Installment) -> StorageResult<()> {
        self.put_row(INSTALLMENTS_TABLE, &installment.id.to_string(), installment)
    }

    fn delete_installment(&mut self, id: &InstallmentId) -> StorageResult<bool> {
        self.delete_row(INSTALLMENTS_TABLE, &id.to_string())
    }

    fn installments_for_loan(&self, loan_id: &LoanId) -> StorageResult<Vec<Installment>> {
        // Full scan; the table is small per deployment
        let mut items = self.scan(INSTALLMENTS_TABLE, |i: &Installment| i.loan_id == *loan_id)?;
        sort_installments(&mut items);
        Ok(items)
    }

    fn get_transaction(&self, id: &TransactionId) -> StorageResult<Option<PaymentTransaction>> {
        self.get_row(TRANSACTIONS_TABLE, &id.to_string())
    }

    fn put_transaction(&mut self, transaction: &PaymentTransaction) -> StorageResult<()> {
        self.put_row(TRANSACTIONS_TABLE, &transaction.id.to_string(), transaction)
    }

    fn delete_transaction(&mut self, id: &TransactionId) -> StorageResult<bool> {
        self.delete_row(TRANSACTIONS_TABLE, &id.to_string())
    }

    fn transactions_for_installment(
        &self,
        installment_id: &InstallmentId,
    ) -> StorageResult<Vec<PaymentTransaction>> {
        let mut items = self.scan(TRANSACTIONS_TABLE, |t: &PaymentTransaction| {
            t.installment_id == *installment_id
        })?;
        sort_transactions(&mut items);
        Ok(items)
    }

    fn commit(self) -> StorageResult<()> {
        self.txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbook_core::types::{Date, NewBorrower, NewLoan, RepaymentStrategy};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn create_test_storage(dir: &tempfile::TempDir) -> RedbStorage {
        RedbStorage::open(dir.path().join("test.redb")).unwrap()
    }

    fn sample_loan(borrower_id: BorrowerId) -> Loan {
        NewLoan::new(
            borrower_id,
            dec!(6000),
            RepaymentStrategy::Emi,
            Date::from_ymd(2025, 2, 1).unwrap(),
        )
        .into_loan(LoanId::new())
    }

    #[test]
    fn test_backend_name() {
        let dir = tempdir().unwrap();
        let storage = create_test_storage(&dir);
        assert_eq!(storage.backend_name(), "redb");
        assert!(storage.is_healthy());
    }

    #[test]
    fn test_loan_crud() {
        let dir = tempdir().unwrap();
        let storage = create_test_storage(&dir);
        let loan = sample_loan(BorrowerId::new());

        let mut txn = storage.begin().unwrap();
        txn.put_loan(&loan).unwrap();
        txn.commit().unwrap();

        let mut txn = storage.begin().unwrap();
        assert_eq!(txn.get_loan(&loan.id).unwrap(), Some(loan.clone()));
        assert!(txn.delete_loan(&loan.id).unwrap());
        assert!(!txn.delete_loan(&loan.id).unwrap());
        txn.commit().unwrap();

        let txn = storage.begin().unwrap();
        assert_eq!(txn.get_loan(&loan.id).unwrap(), None);
    }

    #[test]
    fn test_uncommitted_work_is_discarded() {
        let dir = tempdir().unwrap();
        let storage = create_test_storage(&dir);
        let today = Date::from_ymd(2025, 2, 1).unwrap();
        let borrower = NewBorrower::named("Ravi")
            .into_borrower(BorrowerId::new(), today)
            .unwrap();

        {
            let mut txn = storage.begin().unwrap();
            txn.put_borrower(&borrower).unwrap();
        }

        let txn = storage.begin().unwrap();
        assert!(txn.get_borrower(&borrower.id).unwrap().is_none());
    }

    #[test]
    fn test_transactions_listed_newest_first() {
        let dir = tempdir().unwrap();
        let storage = create_test_storage(&dir);
        let loan = sample_loan(BorrowerId::new());
        let inst = Installment::scheduled(loan.id, Date::from_ymd(2025, 3, 1).unwrap(), dec!(500));
        let older = PaymentTransaction::record(
            inst.id,
            dec!(200),
            Date::from_ymd(2025, 3, 2).unwrap(),
            Some("cash".into()),
            None,
        );
        let newer = PaymentTransaction::record(
            inst.id,
            dec!(300),
            Date::from_ymd(2025, 3, 9).unwrap(),
            None,
            None,
        );

        let mut txn = storage.begin().unwrap();
        txn.put_installment(&inst).unwrap();
        txn.put_transaction(&older).unwrap();
        txn.put_transaction(&newer).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin().unwrap();
        let listed = txn.transactions_for_installment(&inst.id).unwrap();
        assert_eq!(listed, vec![newer, older]);
        drop(txn);

        let stats = storage.stats().unwrap();
        assert_eq!(stats.installment_count, 1);
        assert_eq!(stats.transaction_count, 2);
        assert!(stats.file_size_bytes.is_some());
    }
}
