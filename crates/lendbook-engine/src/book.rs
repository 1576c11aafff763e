//! The `LoanBook` service.
//!
//! Every public operation runs inside one storage unit of work: reads,
//! installment updates, transaction-log writes and any resulting loan status
//! change commit together or not at all.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use lendbook_core::types::{
    round_money, Borrower, BorrowerId, Date, Installment, InstallmentId, Loan, LoanId,
    LoanStatus, NewBorrower, NewLoan, PaymentTransaction, TransactionId,
};
use lendbook_core::{LedgerError, LedgerResult};
use lendbook_storage::{LedgerStore, LedgerTxn};

use crate::clock::{Clock, SystemClock};
use crate::collection::{apply_collection, CollectRequest};
use crate::completion;
use crate::config::{ClassifierConfig, LedgerConfig, ScheduleConfig};
use crate::defaulter::{assess_borrower, assess_loan, BorrowerAssessment, LoanAssessment};
use crate::edit::{apply_transaction_edit, TransactionPatch};
use crate::reports::{self, Dashboard, DefaulterEntry, LoanSummary};
use crate::schedule::{generate_schedule, next_flat_installment};

/// Payment lifecycle engine over a [`LedgerStore`].
///
/// # Example
///
/// ```rust
/// use lendbook_core::prelude::*;
/// use lendbook_engine::{CollectRequest, FixedClock, LoanBook};
/// use lendbook_storage::InMemoryStorage;
/// use rust_decimal_macros::dec;
///
/// let today = Date::from_ymd(2025, 3, 1).unwrap();
/// let book = LoanBook::new(InMemoryStorage::new()).with_clock(FixedClock(today));
///
/// let borrower = book.create_borrower(NewBorrower::named("Asha")).unwrap();
/// let loan = book
///     .create_loan(
///         NewLoan::new(borrower.id, dec!(3000), RepaymentStrategy::Emi, today).with_tenure(3),
///     )
///     .unwrap();
///
/// let first = &book.list_installments(&loan.id).unwrap()[0];
/// let updated = book.collect_payment(&first.id, CollectRequest::amount(dec!(400))).unwrap();
/// assert_eq!(updated.due_amount, dec!(600));
/// ```
pub struct LoanBook<S, C = SystemClock> {
    storage: S,
    clock: C,
    schedule: ScheduleConfig,
    classifier: ClassifierConfig,
}

impl<S: LedgerStore> LoanBook<S, SystemClock> {
    /// Creates a book over `storage` with the system clock and default
    /// configuration.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock,
            schedule: ScheduleConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

fn load_borrower<T: LedgerTxn>(txn: &T, id: &BorrowerId) -> LedgerResult<Borrower> {
    txn.get_borrower(id)?
        .ok_or_else(|| LedgerError::not_found("borrower", id))
}

fn load_loan<T: LedgerTxn>(txn: &T, id: &LoanId) -> LedgerResult<Loan> {
    txn.get_loan(id)?
        .ok_or_else(|| LedgerError::not_found("loan", id))
}

fn load_installment<T: LedgerTxn>(txn: &T, id: &InstallmentId) -> LedgerResult<Installment> {
    txn.get_installment(id)?
        .ok_or_else(|| LedgerError::not_found("installment", id))
}

fn load_transaction<T: LedgerTxn>(txn: &T, id: &TransactionId) -> LedgerResult<PaymentTransaction> {
    txn.get_transaction(id)?
        .ok_or_else(|| LedgerError::not_found("transaction", id))
}

/// Runs the completion evaluator. Failures are logged, never propagated.
fn complete_quietly<T: LedgerTxn>(txn: &mut T, loan_id: &LoanId) {
    if let Err(e) = completion::check_and_complete(txn, loan_id) {
        warn!(loan_id = %loan_id, error = %e, "Completion check failed");
    }
}

/// Re-opens then re-evaluates a loan after money was taken off the ledger.
fn settle_quietly<T: LedgerTxn>(txn: &mut T, loan_id: &LoanId) {
    if let Err(e) = completion::reopen_if_incomplete(txn, loan_id) {
        warn!(loan_id = %loan_id, error = %e, "Reopen check failed");
    }
    complete_quietly(txn, loan_id);
}

fn delete_installment_rows<T: LedgerTxn>(txn: &mut T, id: &InstallmentId) -> LedgerResult<usize> {
    let transactions = txn.transactions_for_installment(id)?;
    for t in &transactions {
        txn.delete_transaction(&t.id)?;
    }
    txn.delete_installment(id)?;
    Ok(transactions.len())
}

fn delete_loan_rows<T: LedgerTxn>(txn: &mut T, id: &LoanId) -> LedgerResult<bool> {
    for inst in txn.installments_for_loan(id)? {
        delete_installment_rows(txn, &inst.id)?;
    }
    Ok(txn.delete_loan(id)?)
}

fn validate_amount(amount: Decimal) -> LedgerResult<Decimal> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "installment amount must be positive, got {amount}"
        )));
    }
    Ok(amount)
}

impl<S: LedgerStore, C: Clock> LoanBook<S, C> {
    /// Replaces the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> LoanBook<S, C2> {
        LoanBook {
            storage: self.storage,
            clock,
            schedule: self.schedule,
            classifier: self.classifier,
        }
    }

    /// Applies schedule and classifier settings from `config`.
    pub fn with_config(mut self, config: &LedgerConfig) -> Self {
        self.schedule = config.schedule();
        self.classifier = config.classifier();
        self
    }

    /// The underlying store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Today according to the configured clock.
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    // =========================================================================
    // BORROWERS
    // =========================================================================

    /// Registers a borrower.
    pub fn create_borrower(&self, request: NewBorrower) -> LedgerResult<Borrower> {
        let borrower = request.into_borrower(BorrowerId::new(), self.today())?;
        let mut txn = self.storage.begin()?;
        txn.put_borrower(&borrower)?;
        txn.commit()?;
        info!(borrower_id = %borrower.id, name = %borrower.name, "Borrower created");
        Ok(borrower)
    }

    /// Fetches a borrower.
    pub fn get_borrower(&self, id: &BorrowerId) -> LedgerResult<Borrower> {
        let txn = self.storage.begin()?;
        load_borrower(&txn, id)
    }

    /// Lists borrowers by name.
    pub fn list_borrowers(&self) -> LedgerResult<Vec<Borrower>> {
        let txn = self.storage.begin()?;
        Ok(txn.list_borrowers()?)
    }

    /// Deletes a borrower with all their loans, installments and
    /// transactions. Returns `false` if the borrower did not exist.
    pub fn delete_borrower(&self, id: &BorrowerId) -> LedgerResult<bool> {
        let mut txn = self.storage.begin()?;
        let loans = txn.loans_for_borrower(id)?;
        for loan in &loans {
            delete_loan_rows(&mut txn, &loan.id)?;
        }
        let existed = txn.delete_borrower(id)?;
        txn.commit()?;
        if existed {
            info!(borrower_id = %id, loans = loans.len(), "Borrower deleted");
        }
        Ok(existed)
    }

    // =========================================================================
    // LOANS
    // =========================================================================

    /// Creates a loan and its initial schedule atomically.
    pub fn create_loan(&self, request: NewLoan) -> LedgerResult<Loan> {
        request.validate()?;
        let mut txn = self.storage.begin()?;
        load_borrower(&txn, &request.borrower_id)?;

        let loan = request.into_loan(LoanId::new());
        let schedule = generate_schedule(&loan, &self.schedule)?;

        txn.put_loan(&loan)?;
        for inst in &schedule {
            txn.put_installment(inst)?;
        }
        txn.commit()?;

        info!(
            loan_id = %loan.id,
            borrower_id = %loan.borrower_id,
            strategy = %loan.strategy,
            principal = %loan.principal,
            installments = schedule.len(),
            "Loan created"
        );
        Ok(loan)
    }

    /// Fetches a loan.
    pub fn get_loan(&self, id: &LoanId) -> LedgerResult<Loan> {
        let txn = self.storage.begin()?;
        load_loan(&txn, id)
    }

    /// Lists every loan by start date.
    pub fn list_loans(&self) -> LedgerResult<Vec<Loan>> {
        let txn = self.storage.begin()?;
        Ok(txn.list_loans()?)
    }

    /// Lists a borrower's loans.
    pub fn loans_for_borrower(&self, borrower_id: &BorrowerId) -> LedgerResult<Vec<Loan>> {
        let txn = self.storage.begin()?;
        load_borrower(&txn, borrower_id)?;
        Ok(txn.loans_for_borrower(borrower_id)?)
    }

    /// Sets a loan's status explicitly (operator action).
    pub fn set_loan_status(&self, id: &LoanId, status: LoanStatus) -> LedgerResult<Loan> {
        let mut txn = self.storage.begin()?;
        let mut loan = load_loan(&txn, id)?;
        let previous = loan.status;
        loan.status = status;
        txn.put_loan(&loan)?;
        txn.commit()?;
        info!(loan_id = %id, from = %previous, to = %status, "Loan status set");
        Ok(loan)
    }

    /// Deletes a loan with its installments and transactions.
    pub fn delete_loan(&self, id: &LoanId) -> LedgerResult<bool> {
        let mut txn = self.storage.begin()?;
        let existed = delete_loan_rows(&mut txn, id)?;
        txn.commit()?;
        if existed {
            info!(loan_id = %id, "Loan deleted");
        }
        Ok(existed)
    }

    /// Runs the completion evaluator for a loan on demand.
    pub fn check_and_complete(&self, loan_id: &LoanId) -> LedgerResult<bool> {
        let mut txn = self.storage.begin()?;
        let changed = completion::check_and_complete(&mut txn, loan_id)?;
        txn.commit()?;
        Ok(changed)
    }

    // =========================================================================
    // INSTALLMENTS
    // =========================================================================

    /// Lists a loan's installments by due date.
    pub fn list_installments(&self, loan_id: &LoanId) -> LedgerResult<Vec<Installment>> {
        let txn = self.storage.begin()?;
        load_loan(&txn, loan_id)?;
        Ok(txn.installments_for_loan(loan_id)?)
    }

    /// Fetches an installment.
    pub fn get_installment(&self, id: &InstallmentId) -> LedgerResult<Installment> {
        let txn = self.storage.begin()?;
        load_installment(&txn, id)
    }

    /// Appends one installment to any loan. The loan status is not touched.
    pub fn add_installment(
        &self,
        loan_id: &LoanId,
        due_date: Date,
        amount: Decimal,
        notes: Option<String>,
    ) -> LedgerResult<Installment> {
        let amount = validate_amount(amount)?;
        let mut txn = self.storage.begin()?;
        load_loan(&txn, loan_id)?;

        let mut inst = Installment::scheduled(*loan_id, due_date, amount);
        inst.notes = notes;
        txn.put_installment(&inst)?;
        txn.commit()?;
        debug!(loan_id = %loan_id, installment_id = %inst.id, due = %due_date, amount = %amount, "Installment added");
        Ok(inst)
    }

    /// Appends several installments; all or none are stored.
    pub fn add_installments(
        &self,
        loan_id: &LoanId,
        items: &[(Date, Decimal)],
    ) -> LedgerResult<Vec<Installment>> {
        let mut txn = self.storage.begin()?;
        load_loan(&txn, loan_id)?;

        let mut added = Vec::with_capacity(items.len());
        for (due_date, amount) in items {
            let inst = Installment::scheduled(*loan_id, *due_date, validate_amount(*amount)?);
            txn.put_installment(&inst)?;
            added.push(inst);
        }
        txn.commit()?;
        info!(loan_id = %loan_id, count = added.len(), "Installments added");
        Ok(added)
    }

    /// Appends the next monthly installment of a flat loan.
    pub fn extend_flat_schedule(&self, loan_id: &LoanId) -> LedgerResult<Installment> {
        let mut txn = self.storage.begin()?;
        let loan = load_loan(&txn, loan_id)?;
        let existing = txn.installments_for_loan(loan_id)?;
        let inst = next_flat_installment(&loan, &existing, &self.schedule)?;
        txn.put_installment(&inst)?;
        txn.commit()?;
        info!(loan_id = %loan_id, due = %inst.due_date, amount = %inst.amount, "Flat schedule extended");
        Ok(inst)
    }

    /// Removes an installment and its transactions.
    pub fn delete_payment(&self, id: &InstallmentId) -> LedgerResult<bool> {
        let mut txn = self.storage.begin()?;
        let Some(inst) = txn.get_installment(id)? else {
            return Ok(false);
        };
        let removed = delete_installment_rows(&mut txn, id)?;
        complete_quietly(&mut txn, &inst.loan_id);
        txn.commit()?;
        info!(installment_id = %id, loan_id = %inst.loan_id, transactions = removed, "Installment deleted");
        Ok(true)
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Records a collection against an installment.
    pub fn collect_payment(
        &self,
        id: &InstallmentId,
        request: CollectRequest,
    ) -> LedgerResult<Installment> {
        let today = self.today();
        let mut txn = self.storage.begin()?;
        let mut inst = load_installment(&txn, id)?;
        let loan = load_loan(&txn, &inst.loan_id)?;

        let outcome = apply_collection(loan.strategy, &mut inst, request, today)?;
        txn.put_installment(&inst)?;
        if let Some(record) = outcome.transaction() {
            txn.put_transaction(record)?;
            debug!(
                installment_id = %id,
                loan_id = %loan.id,
                amount = %record.amount,
                paid_total = %inst.paid_amount,
                status = %inst.status,
                "Collection recorded"
            );
            complete_quietly(&mut txn, &loan.id);
        } else {
            debug!(installment_id = %id, "Installment notes updated");
        }
        txn.commit()?;
        Ok(inst)
    }

    /// Undoes every collection on an installment.
    pub fn reset_payment(&self, id: &InstallmentId) -> LedgerResult<Installment> {
        let mut txn = self.storage.begin()?;
        let mut inst = load_installment(&txn, id)?;

        let transactions = txn.transactions_for_installment(id)?;
        for t in &transactions {
            txn.delete_transaction(&t.id)?;
        }
        inst.reset();
        txn.put_installment(&inst)?;
        settle_quietly(&mut txn, &inst.loan_id);
        txn.commit()?;

        info!(installment_id = %id, loan_id = %inst.loan_id, removed = transactions.len(), "Payment reset");
        Ok(inst)
    }

    /// Edits a recorded transaction and re-derives its installment.
    pub fn update_transaction(
        &self,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> LedgerResult<PaymentTransaction> {
        let mut txn = self.storage.begin()?;
        let mut record = load_transaction(&txn, id)?;
        let mut inst = load_installment(&txn, &record.installment_id)?;
        let siblings = txn.transactions_for_installment(&inst.id)?;

        apply_transaction_edit(&mut inst, &mut record, &siblings, patch)?;
        txn.put_transaction(&record)?;
        txn.put_installment(&inst)?;
        settle_quietly(&mut txn, &inst.loan_id);
        txn.commit()?;

        info!(
            transaction_id = %id,
            installment_id = %inst.id,
            amount = %record.amount,
            paid_total = %inst.paid_amount,
            "Transaction updated"
        );
        Ok(record)
    }

    /// Lists an installment's transactions, most recent first.
    pub fn list_transactions(&self, id: &InstallmentId) -> LedgerResult<Vec<PaymentTransaction>> {
        let txn = self.storage.begin()?;
        load_installment(&txn, id)?;
        Ok(txn.transactions_for_installment(id)?)
    }

    // =========================================================================
    // CLASSIFICATION AND REPORTS
    // =========================================================================

    /// Classifies one loan as of today.
    pub fn loan_assessment(&self, loan_id: &LoanId) -> LedgerResult<LoanAssessment> {
        let txn = self.storage.begin()?;
        let loan = load_loan(&txn, loan_id)?;
        let installments = txn.installments_for_loan(loan_id)?;
        Ok(assess_loan(&loan, &installments, self.today(), &self.classifier))
    }

    /// Summarizes one loan as of today.
    pub fn loan_summary(&self, loan_id: &LoanId) -> LedgerResult<LoanSummary> {
        let txn = self.storage.begin()?;
        let loan = load_loan(&txn, loan_id)?;
        let installments = txn.installments_for_loan(loan_id)?;
        Ok(reports::summarize_loan(
            loan,
            &installments,
            self.today(),
            &self.classifier,
        ))
    }

    fn assess_borrower_in<T: LedgerTxn>(
        &self,
        txn: &T,
        borrower_id: &BorrowerId,
        today: Date,
    ) -> LedgerResult<BorrowerAssessment> {
        let mut assessments = Vec::new();
        for loan in txn.loans_for_borrower(borrower_id)? {
            let installments = txn.installments_for_loan(&loan.id)?;
            assessments.push(assess_loan(&loan, &installments, today, &self.classifier));
        }
        Ok(assess_borrower(*borrower_id, &assessments))
    }

    /// Aggregated defaulter status of a borrower as of today.
    pub fn borrower_status(&self, borrower_id: &BorrowerId) -> LedgerResult<BorrowerAssessment> {
        let txn = self.storage.begin()?;
        load_borrower(&txn, borrower_id)?;
        self.assess_borrower_in(&txn, borrower_id, self.today())
    }

    /// Every borrower currently flagged, most overdue first.
    pub fn defaulters(&self) -> LedgerResult<Vec<DefaulterEntry>> {
        let today = self.today();
        let txn = self.storage.begin()?;
        let mut entries = Vec::new();
        for borrower in txn.list_borrowers()? {
            let assessment = self.assess_borrower_in(&txn, &borrower.id, today)?;
            if assessment.is_defaulter {
                entries.push(DefaulterEntry {
                    borrower,
                    assessment,
                });
            }
        }
        reports::sort_defaulters(&mut entries);
        Ok(entries)
    }

    /// Portfolio counters as of today.
    pub fn dashboard(&self) -> LedgerResult<Dashboard> {
        let today = self.today();
        let txn = self.storage.begin()?;
        let mut dash = Dashboard {
            as_of: Some(today),
            ..Dashboard::default()
        };

        let borrowers = txn.list_borrowers()?;
        dash.borrowers = borrowers.len();
        for borrower in &borrowers {
            if self.assess_borrower_in(&txn, &borrower.id, today)?.is_defaulter {
                dash.defaulters += 1;
            }
        }

        for loan in txn.list_loans()? {
            dash.total_principal += loan.principal;
            match loan.status {
                LoanStatus::Active => dash.active_loans += 1,
                LoanStatus::Completed => dash.completed_loans += 1,
                LoanStatus::Defaulted | LoanStatus::Cancelled => {}
            }
            for inst in txn.installments_for_loan(&loan.id)? {
                dash.observe_installment(&inst, today);
                for record in txn.transactions_for_installment(&inst.id)? {
                    dash.total_collected += record.amount;
                }
            }
        }
        Ok(dash)
    }
}
