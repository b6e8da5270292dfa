use crate::application::aggregator::ResultAggregator;
use crate::config::SchedulerConfig;
use crate::domain::ports::TransferExecutor;
use crate::domain::transfer::{DistributionPlan, PlannedTransfer, TransferFailure, TransferResult};
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Runs work items in fixed-size groups.
///
/// Items of a group run concurrently, each delayed by its position times
/// `per_item_delay`. Groups run one after the other with `rate_limit` between
/// them, so at most `batch_size` items are ever in flight.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    config: SchedulerConfig,
}

impl BatchScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Drives `work` over `items` group by group and hands each finished
    /// group's outputs, in item order, to `collect`.
    pub async fn run_batches<T, O, F, Fut, C>(&self, items: Vec<T>, work: F, mut collect: C)
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = O>,
        C: FnMut(usize, Vec<O>),
    {
        let batch_size = self.config.batch_size.max(1);
        let total_batches = items.len().div_ceil(batch_size);
        let stagger = self.config.per_item_delay();
        let mut items = items.into_iter();

        for batch_index in 0..total_batches {
            let batch: Vec<T> = items.by_ref().take(batch_size).collect();
            info!(
                batch = batch_index + 1,
                of = total_batches,
                size = batch.len(),
                "Processing batch"
            );

            let pending = batch.into_iter().enumerate().map(|(position, item)| {
                let task = work(item);
                let delay = stagger_delay(stagger, position);
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    task.await
                }
            });
            let outputs = join_all(pending).await;
            collect(batch_index, outputs);

            if batch_index + 1 < total_batches {
                debug!(
                    delay_ms = self.config.rate_limit_ms,
                    "Throttling before next batch"
                );
                tokio::time::sleep(self.config.rate_limit()).await;
            }
        }
    }

    /// Executes every planned transfer, one result per transfer.
    pub async fn execute_plan(
        &self,
        plan: DistributionPlan,
        executor: &dyn TransferExecutor,
        aggregator: &mut ResultAggregator,
    ) {
        self.run_batches(
            plan.into_transfers(),
            |planned| execute_one(executor, planned),
            |_, results| aggregator.record_batch(results),
        )
        .await;
    }
}

/// Offset of the item at `position` within its group, saturating at `Duration::MAX`.
fn stagger_delay(stagger: Duration, position: usize) -> Duration {
    u32::try_from(position)
        .ok()
        .and_then(|position| stagger.checked_mul(position))
        .unwrap_or(Duration::MAX)
}

/// Executes a single transfer. Errors and panics become a `Failure`.
async fn execute_one(executor: &dyn TransferExecutor, planned: PlannedTransfer) -> TransferResult {
    let PlannedTransfer { account, request } = planned;
    let outcome = AssertUnwindSafe(executor.execute(
        &request.sender,
        &request.recipient,
        request.amount,
    ))
    .catch_unwind()
    .await;

    match outcome {
        Ok(Ok(receipt)) => {
            info!(
                account = %account,
                recipient = %request.recipient,
                amount = request.amount.lamports(),
                receipt = %receipt,
                "Transfer succeeded"
            );
            TransferResult::Success {
                account,
                receipt,
                amount: request.amount,
            }
        }
        Ok(Err(reason)) => {
            warn!(
                account = %account,
                recipient = %request.recipient,
                amount = request.amount.lamports(),
                error = %reason,
                "Transfer failed"
            );
            TransferResult::Failure { account, reason }
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(account = %account, error = %message, "Transfer panicked");
            TransferResult::Failure {
                account,
                reason: TransferFailure::Internal(message),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "transfer panicked".to_string()
    }
}
