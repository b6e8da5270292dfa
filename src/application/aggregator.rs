use crate::domain::account::{AccountId, Amount};
use crate::domain::transfer::{Receipt, TransferResult};
use serde::Serialize;
use tracing::debug;

/// Everything that happened during one orchestration run.
///
/// Only the `ResultAggregator` builds it; callers get it by value once the
/// run is over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    total_requested: usize,
    results: Vec<TransferResult>,
    skipped: Vec<AccountId>,
}

impl BatchSummary {
    pub fn total_requested(&self) -> usize {
        self.total_requested
    }

    /// Results in arrival order.
    pub fn results(&self) -> &[TransferResult] {
        &self.results
    }

    /// Accounts left out of the plan because they had nothing to move.
    pub fn skipped(&self) -> &[AccountId] {
        &self.skipped
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.succeeded_count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &TransferResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TransferResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn to_report(&self) -> TransferReport {
        let mut transfers = Vec::new();
        let mut failed_transfers = Vec::new();

        for result in &self.results {
            match result {
                TransferResult::Success {
                    account,
                    receipt,
                    amount,
                } => transfers.push(SuccessfulTransfer {
                    account: account.clone(),
                    receipt: receipt.clone(),
                    amount: *amount,
                }),
                TransferResult::Failure { account, reason } => {
                    failed_transfers.push(FailedTransfer {
                        account: account.clone(),
                        reason: reason.to_string(),
                    })
                }
            }
        }

        TransferReport {
            total_requested: self.total_requested,
            succeeded_count: transfers.len(),
            failed_count: failed_transfers.len(),
            transfers,
            failed_transfers,
            skipped: self.skipped.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessfulTransfer {
    pub account: AccountId,
    pub receipt: Receipt,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedTransfer {
    pub account: AccountId,
    pub reason: String,
}

/// Caller-facing shape of a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub total_requested: usize,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub transfers: Vec<SuccessfulTransfer>,
    pub failed_transfers: Vec<FailedTransfer>,
    pub skipped: Vec<AccountId>,
}

/// Collects outcomes batch by batch.
///
/// Results of a batch are merged after the whole batch has completed, so the
/// summary is never mutated from concurrently running transfers.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    summary: BatchSummary,
}

impl ResultAggregator {
    pub fn new(total_requested: usize) -> Self {
        Self {
            summary: BatchSummary {
                total_requested,
                results: Vec::with_capacity(total_requested),
                skipped: Vec::new(),
            },
        }
    }

    pub fn record_skip(&mut self, account: AccountId) {
        self.summary.skipped.push(account);
    }

    /// Appends a single result produced outside the scheduler (e.g. a source
    /// whose balance could not be read).
    pub fn record(&mut self, result: TransferResult) {
        self.summary.results.push(result);
    }

    pub fn record_batch(&mut self, results: Vec<TransferResult>) {
        debug!(
            batch_len = results.len(),
            collected = self.summary.results.len() + results.len(),
            expected = self.summary.total_requested,
            "Batch results collected"
        );
        self.summary.results.extend(results);
    }

    pub fn finish(self) -> BatchSummary {
        self.summary
    }
}
