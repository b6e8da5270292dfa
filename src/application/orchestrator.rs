use crate::application::aggregator::{BatchSummary, ResultAggregator};
use crate::application::scheduler::BatchScheduler;
use crate::config::{FeeSchedule, OrchestratorConfig, SchedulerConfig};
use crate::domain::account::{Account, AccountId, Amount, Credential, OwnerId};
use crate::domain::allocation::{Fraction, SweepDecision, allocate_fan_in, allocate_fan_out};
use crate::domain::ports::{BalanceOracleRef, LedgerStoreRef, TransferExecutorRef};
use crate::domain::transfer::{
    DistributionPlan, PlannedTransfer, Receipt, TransferFailure, TransferRequest, TransferResult,
};
use crate::error::{Result, TransferError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One source distributing to many recipients.
#[derive(Debug, Clone)]
pub struct FanOutRequest {
    pub owner: OwnerId,
    pub source: Credential,
    pub fraction: Decimal,
    /// Defaults to every other account of `owner`.
    pub recipients: Option<Vec<AccountId>>,
}

/// Many sources sweeping into one recipient.
#[derive(Debug, Clone)]
pub struct FanInRequest {
    pub owner: OwnerId,
    /// Defaults to every other account of `owner`.
    pub sources: Option<Vec<AccountId>>,
    pub recipient: AccountId,
    pub fraction: Decimal,
}

#[derive(Debug, Clone)]
pub struct SingleTransferRequest {
    pub owner: OwnerId,
    pub sender: Credential,
    pub recipient: AccountId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account: AccountId,
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerBalance {
    pub owner: OwnerId,
    pub total: u64,
    pub accounts: Vec<AccountBalance>,
}

/// Entry point for fan-out, fan-in and single transfers.
///
/// Request-level problems (bad fraction, unknown credential, nothing to send)
/// come back as `Err` before anything is dispatched. Once dispatch starts the
/// run always completes and returns a [`BatchSummary`], failed items included.
pub struct TransferOrchestrator {
    ledger: LedgerStoreRef,
    balances: BalanceOracleRef,
    executor: TransferExecutorRef,
    scheduler: BatchScheduler,
    fees: FeeSchedule,
}

impl TransferOrchestrator {
    pub fn new(
        ledger: LedgerStoreRef,
        balances: BalanceOracleRef,
        executor: TransferExecutorRef,
        config: &OrchestratorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger,
            balances,
            executor,
            scheduler: BatchScheduler::new(config.scheduler),
            fees: config.fees,
        })
    }

    pub async fn fan_out(&self, request: FanOutRequest) -> Result<BatchSummary> {
        let fraction = Fraction::new(request.fraction)?;
        let accounts = self.ledger.find_accounts_by_owner(&request.owner).await?;

        if !accounts.iter().any(|a| a.authorizes(&request.source)) {
            return Err(TransferError::Unauthorized(format!(
                "source account {} does not belong to owner {}",
                request.source.account, request.owner
            )));
        }

        let source_id = &request.source.account;
        let recipients: Vec<AccountId> = match request.recipients {
            Some(list) => {
                if list.iter().any(|r| r.as_str().is_empty()) {
                    return Err(TransferError::InvalidInput(
                        "recipient address is empty".to_string(),
                    ));
                }
                distinct(list).filter(|r| r != source_id).collect()
            }
            None => accounts
                .iter()
                .map(|a| a.id.clone())
                .filter(|id| id != source_id)
                .collect(),
        };
        if recipients.is_empty() {
            return Err(TransferError::NoRecipients(request.owner.to_string()));
        }

        let balance = self.balances.get_balance(source_id).await?;
        info!(
            owner = %request.owner,
            source = %source_id,
            balance,
            recipients = recipients.len(),
            "Starting fan-out"
        );

        let allocation = allocate_fan_out(
            balance,
            fraction,
            &self.fees.fan_out_policy(),
            &recipients,
        )?;
        debug!(
            distributable = allocation.distributable,
            cap = allocation.per_recipient_cap,
            "Fan-out allocation computed"
        );

        let plan = DistributionPlan::new(
            allocation
                .shares
                .into_iter()
                .map(|(recipient, amount)| PlannedTransfer {
                    account: recipient.clone(),
                    request: TransferRequest {
                        sender: request.source.clone(),
                        recipient,
                        amount,
                    },
                })
                .collect(),
        );

        let mut aggregator = ResultAggregator::new(plan.len());
        self.scheduler
            .execute_plan(plan, self.executor.as_ref(), &mut aggregator)
            .await;

        let summary = aggregator.finish();
        info!(
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            "Fan-out completed"
        );
        Ok(summary)
    }

    pub async fn fan_in(&self, request: FanInRequest) -> Result<BatchSummary> {
        let fraction = Fraction::new(request.fraction)?;
        if request.recipient.as_str().is_empty() {
            return Err(TransferError::InvalidInput(
                "recipient address is empty".to_string(),
            ));
        }

        let accounts = self.ledger.find_accounts_by_owner(&request.owner).await?;
        let sources: Vec<Account> = match request.sources {
            Some(ids) => {
                let mut selected = Vec::with_capacity(ids.len());
                for id in distinct(ids).filter(|id| id != &request.recipient) {
                    let account = accounts.iter().find(|a| a.id == id).ok_or_else(|| {
                        TransferError::Unauthorized(format!(
                            "account {} does not belong to owner {}",
                            id, request.owner
                        ))
                    })?;
                    selected.push(account.clone());
                }
                selected
            }
            None => accounts
                .into_iter()
                .filter(|a| a.id != request.recipient)
                .collect(),
        };
        if sources.is_empty() {
            return Err(TransferError::NoRecipients(request.owner.to_string()));
        }

        info!(
            owner = %request.owner,
            recipient = %request.recipient,
            sources = sources.len(),
            "Starting fan-in"
        );

        // Balances are read up front, under the same batching limits as the
        // transfers themselves.
        let mut probed: Vec<(Account, Result<u64>)> = Vec::with_capacity(sources.len());
        let balances = &self.balances;
        self.scheduler
            .run_batches(
                sources,
                |account| async move {
                    let balance = balances.get_balance(&account.id).await;
                    (account, balance)
                },
                |_, outputs| probed.extend(outputs),
            )
            .await;

        let policy = self.fees.fan_in_policy();
        let mut planned = Vec::new();
        let mut rejected = Vec::new();
        let mut skipped = Vec::new();

        for (account, balance) in probed {
            let balance = match balance {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(account = %account.id, error = %e, "Balance lookup failed");
                    let detail = match e {
                        TransferError::CollaboratorUnavailable(message) => message,
                        other => other.to_string(),
                    };
                    rejected.push(TransferResult::Failure {
                        account: account.id,
                        reason: TransferFailure::Unavailable(detail),
                    });
                    continue;
                }
            };

            match allocate_fan_in(balance, fraction, &policy) {
                SweepDecision::Skip { transferable } => {
                    debug!(account = %account.id, balance, transferable = %transferable, "Nothing to sweep");
                    skipped.push(account.id);
                }
                SweepDecision::Transfer(amount) => match account.credential {
                    Some(sender) => planned.push(PlannedTransfer {
                        account: account.id,
                        request: TransferRequest {
                            sender,
                            recipient: request.recipient.clone(),
                            amount,
                        },
                    }),
                    None => {
                        warn!(account = %account.id, "No credential on file");
                        rejected.push(TransferResult::Failure {
                            account: account.id,
                            reason: TransferFailure::MissingCredential,
                        });
                    }
                },
            }
        }

        let plan = DistributionPlan::new(planned);
        let mut aggregator = ResultAggregator::new(plan.len() + rejected.len());
        for result in rejected {
            aggregator.record(result);
        }
        for account in skipped {
            aggregator.record_skip(account);
        }

        if !plan.is_empty() {
            tokio::time::sleep(self.scheduler.config().rate_limit()).await;
        }
        self.scheduler
            .execute_plan(plan, self.executor.as_ref(), &mut aggregator)
            .await;

        let summary = aggregator.finish();
        info!(
            succeeded = summary.succeeded_count(),
            failed = summary.failed_count(),
            skipped = summary.skipped().len(),
            "Fan-in completed"
        );
        Ok(summary)
    }

    /// Sends a fixed amount from one of the owner's accounts.
    pub async fn transfer(&self, request: SingleTransferRequest) -> Result<Receipt> {
        let amount = Amount::new(request.amount)?;
        if request.recipient.as_str().is_empty() {
            return Err(TransferError::InvalidInput(
                "recipient address is empty".to_string(),
            ));
        }

        let accounts = self.ledger.find_accounts_by_owner(&request.owner).await?;
        if !accounts.iter().any(|a| a.authorizes(&request.sender)) {
            return Err(TransferError::Unauthorized(format!(
                "account {} does not belong to owner {}",
                request.sender.account, request.owner
            )));
        }

        let receipt = self
            .executor
            .execute(&request.sender, &request.recipient, amount)
            .await
            .map_err(|e| TransferError::TransferFailed(e.to_string()))?;

        info!(
            sender = %request.sender.account,
            recipient = %request.recipient,
            amount = amount.lamports(),
            receipt = %receipt,
            "Transfer succeeded"
        );
        Ok(receipt)
    }

    /// Sums the live balances of every account of `owner`, one lookup at a
    /// time with the configured rate limit between lookups.
    pub async fn cumulative_balance(&self, owner: &OwnerId) -> Result<OwnerBalance> {
        let accounts = self.ledger.find_accounts_by_owner(owner).await?;
        let sequential = BatchScheduler::new(SchedulerConfig {
            batch_size: 1,
            per_item_delay_ms: 0,
            ..*self.scheduler.config()
        });

        let mut lookups: Vec<(AccountId, Result<u64>)> = Vec::with_capacity(accounts.len());
        let balances = &self.balances;
        sequential
            .run_batches(
                accounts,
                |account| async move {
                    let balance = balances.get_balance(&account.id).await;
                    (account.id, balance)
                },
                |_, outputs| lookups.extend(outputs),
            )
            .await;

        let mut total: u64 = 0;
        let mut per_account = Vec::with_capacity(lookups.len());
        for (account, balance) in lookups {
            let balance = balance?;
            total = total.saturating_add(balance);
            per_account.push(AccountBalance { account, balance });
        }

        Ok(OwnerBalance {
            owner: owner.clone(),
            total,
            accounts: per_account,
        })
    }
}

/// Drops repeated addresses, keeping the first occurrence of each.
fn distinct(ids: Vec<AccountId>) -> impl Iterator<Item = AccountId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(move |id| seen.insert(id.clone()))
}
