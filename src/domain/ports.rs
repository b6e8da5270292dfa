use super::account::{Account, AccountId, Amount, Credential, OwnerId};
use super::transfer::{Receipt, TransferFailure};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the accounts each owner holds.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_accounts_by_owner(&self, owner: &OwnerId) -> Result<Vec<Account>>;
}

/// Live, read-only balance lookups. Callers must not cache across a run.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn get_balance(&self, account: &AccountId) -> Result<u64>;
}

/// Performs exactly one value transfer per call, without retrying.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn execute(
        &self,
        sender: &Credential,
        recipient: &AccountId,
        amount: Amount,
    ) -> std::result::Result<Receipt, TransferFailure>;
}

pub type LedgerStoreRef = Arc<dyn LedgerStore>;
pub type BalanceOracleRef = Arc<dyn BalanceOracle>;
pub type TransferExecutorRef = Arc<dyn TransferExecutor>;
