#![allow(dead_code)]

use fanflow::application::orchestrator::TransferOrchestrator;
use fanflow::config::{FeeSchedule, OrchestratorConfig, SchedulerConfig};
use fanflow::domain::account::{Account, AccountId, Credential, OwnerId};
use fanflow::infrastructure::in_memory::{InMemoryLedgerStore, SimulatedLedger};
use std::sync::Arc;

/// `(owner, address, secret, balance)`
pub type Row<'a> = (&'a str, &'a str, Option<&'a str>, u64);

pub struct Fixture {
    pub orchestrator: TransferOrchestrator,
    pub ledger: SimulatedLedger,
}

pub fn fees(transaction_fee: u64, fan_in_reserve: u64, fan_out_min_distributable: u64) -> FeeSchedule {
    FeeSchedule {
        transaction_fee,
        fan_in_reserve,
        fan_out_min_distributable,
    }
}

pub async fn fixture(rows: &[Row<'_>], ledger_fee: u64, fees: FeeSchedule) -> Fixture {
    fixture_with(rows, ledger_fee, fees, SchedulerConfig::default()).await
}

pub async fn fixture_with(
    rows: &[Row<'_>],
    ledger_fee: u64,
    fees: FeeSchedule,
    scheduler: SchedulerConfig,
) -> Fixture {
    let store = InMemoryLedgerStore::new();
    let ledger = SimulatedLedger::new(ledger_fee);

    for (owner, address, secret, balance) in rows {
        let mut account = Account::new(AccountId::new(*address), OwnerId::new(*owner));
        if let Some(secret) = secret {
            account = account.with_secret(*secret);
        }
        ledger
            .open_account(account.credential.as_ref(), account.id.clone(), *balance)
            .await;
        store.insert(account).await;
    }

    let config = OrchestratorConfig {
        scheduler,
        fees,
        ..OrchestratorConfig::default()
    };
    let orchestrator = TransferOrchestrator::new(
        Arc::new(store),
        Arc::new(ledger.clone()),
        Arc::new(ledger.clone()),
        &config,
    )
    .expect("valid config");

    Fixture {
        orchestrator,
        ledger,
    }
}

pub fn credential(address: &str, secret: &str) -> Credential {
    Credential::new(AccountId::new(address), secret)
}

pub fn ids(addresses: &[&str]) -> Vec<AccountId> {
    addresses.iter().map(|a| AccountId::new(*a)).collect()
}
