use crate::domain::account::{Account, AccountId, Amount, Credential, OwnerId};
use crate::domain::ports::{BalanceOracle, LedgerStore, TransferExecutor};
use crate::domain::transfer::{Receipt, TransferFailure};
use crate::error::{Result, TransferError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory registry of accounts, grouped by owner.
///
/// Uses `Arc<RwLock<HashMap<OwnerId, Vec<Account>>>>`; insertion order is
/// preserved per owner, which is the order fan-outs allocate in.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    accounts: Arc<RwLock<HashMap<OwnerId, Vec<Account>>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account, replacing any previous entry with the same address.
    pub async fn insert(&self, account: Account) {
        let mut accounts = self.accounts.write().await;
        let owned = accounts.entry(account.owner.clone()).or_default();
        match owned.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => owned.push(account),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_accounts_by_owner(&self, owner: &OwnerId) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(owner).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountId, u64>,
    keys: HashMap<AccountId, String>,
    rejecting: HashSet<AccountId>,
    unreachable: HashSet<AccountId>,
    next_receipt: u64,
    executed: usize,
}

/// A local stand-in for the network: holds balances, charges a flat fee per
/// transfer and hands out sequential receipts.
///
/// Failures can be injected per account to exercise partial-failure paths.
#[derive(Clone)]
pub struct SimulatedLedger {
    state: Arc<RwLock<LedgerState>>,
    fee: u64,
}

impl SimulatedLedger {
    pub fn new(fee: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            fee,
        }
    }

    /// Sets a balance and, if given, the key that must sign for the account.
    pub async fn open_account(&self, credential: Option<&Credential>, account: AccountId, balance: u64) {
        let mut state = self.state.write().await;
        if let Some(credential) = credential {
            state
                .keys
                .insert(account.clone(), credential.secret().to_string());
        }
        state.balances.insert(account, balance);
    }

    /// Every transfer touching `account` is rejected.
    pub async fn reject_transfers_for(&self, account: AccountId) {
        self.state.write().await.rejecting.insert(account);
    }

    /// Balance lookups for `account` fail.
    pub async fn make_unreachable(&self, account: AccountId) {
        self.state.write().await.unreachable.insert(account);
    }

    pub async fn balance_of(&self, account: &AccountId) -> u64 {
        self.state
            .read()
            .await
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Number of transfer attempts seen, successful or not.
    pub async fn executed(&self) -> usize {
        self.state.read().await.executed
    }
}

#[async_trait]
impl BalanceOracle for SimulatedLedger {
    async fn get_balance(&self, account: &AccountId) -> Result<u64> {
        let state = self.state.read().await;
        if state.unreachable.contains(account) {
            return Err(TransferError::CollaboratorUnavailable(format!(
                "balance of {} could not be fetched",
                account
            )));
        }
        Ok(state.balances.get(account).copied().unwrap_or(0))
    }
}

#[async_trait]
impl TransferExecutor for SimulatedLedger {
    async fn execute(
        &self,
        sender: &Credential,
        recipient: &AccountId,
        amount: Amount,
    ) -> std::result::Result<Receipt, TransferFailure> {
        let mut state = self.state.write().await;
        state.executed += 1;

        if recipient.as_str().is_empty() {
            return Err(TransferFailure::InvalidRecipient(
                "empty address".to_string(),
            ));
        }
        if state
            .keys
            .get(&sender.account)
            .is_some_and(|key| key != sender.secret())
        {
            return Err(TransferFailure::Rejected(
                "signature verification failed".to_string(),
            ));
        }
        if state.rejecting.contains(&sender.account) || state.rejecting.contains(recipient) {
            return Err(TransferFailure::Rejected(format!(
                "transfer {} -> {} refused",
                sender.account, recipient
            )));
        }

        let available = state.balances.get(&sender.account).copied().unwrap_or(0);
        let debit = amount.lamports().saturating_add(self.fee);
        if available < debit {
            return Err(TransferFailure::InsufficientFunds(format!(
                "{} has {}, needs {}",
                sender.account, available, debit
            )));
        }

        state.balances.insert(sender.account.clone(), available - debit);
        *state.balances.entry(recipient.clone()).or_insert(0) += amount.lamports();
        state.next_receipt += 1;
        Ok(Receipt(format!("sim-{:08}", state.next_receipt)))
    }
}
