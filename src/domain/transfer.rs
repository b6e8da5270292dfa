use super::account::{AccountId, Amount, Credential};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier returned by the ledger for a confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(pub String);

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single value transfer to be handed to the `TransferExecutor`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub sender: Credential,
    pub recipient: AccountId,
    pub amount: Amount,
}

/// A request tied to the account that produced it.
///
/// For a fan-out the originating account is the recipient; for a fan-in it is
/// the sweeping source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTransfer {
    pub account: AccountId,
    pub request: TransferRequest,
}

/// Ordered, immutable list of transfers, built before any dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionPlan {
    transfers: Vec<PlannedTransfer>,
}

impl DistributionPlan {
    pub fn new(transfers: Vec<PlannedTransfer>) -> Self {
        Self { transfers }
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn transfers(&self) -> &[PlannedTransfer] {
        &self.transfers
    }

    /// Sum of all planned amounts.
    pub fn total(&self) -> u64 {
        self.transfers
            .iter()
            .map(|t| t.request.amount.lamports())
            .sum()
    }

    pub fn into_transfers(self) -> Vec<PlannedTransfer> {
        self.transfers
    }
}

/// Why a single transfer did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferFailure {
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("rejected by network: {0}")]
    Rejected(String),
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("timed out")]
    Timeout,
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("no usable credential for account")]
    MissingCredential,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Outcome of exactly one planned transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferResult {
    Success {
        account: AccountId,
        receipt: Receipt,
        amount: Amount,
    },
    Failure {
        account: AccountId,
        reason: TransferFailure,
    },
}

impl TransferResult {
    pub fn account(&self) -> &AccountId {
        match self {
            TransferResult::Success { account, .. } | TransferResult::Failure { account, .. } => {
                account
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(recipient: &str, lamports: u64) -> PlannedTransfer {
        PlannedTransfer {
            account: AccountId::new(recipient),
            request: TransferRequest {
                sender: Credential::new(AccountId::new("src"), "key"),
                recipient: AccountId::new(recipient),
                amount: Amount::new(lamports).unwrap(),
            },
        }
    }

    #[test]
    fn test_plan_total_and_order() {
        let plan = DistributionPlan::new(vec![planned("a", 10), planned("b", 25)]);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total(), 35);
        assert_eq!(plan.transfers()[0].account, AccountId::new("a"));
        assert!(DistributionPlan::default().is_empty());
    }

    #[test]
    fn test_result_account_correlation() {
        let ok = TransferResult::Success {
            account: AccountId::new("a"),
            receipt: Receipt("sig".to_string()),
            amount: Amount::new(1).unwrap(),
        };
        let failed = TransferResult::Failure {
            account: AccountId::new("b"),
            reason: TransferFailure::Timeout,
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert_eq!(failed.account(), &AccountId::new("b"));
    }
}
