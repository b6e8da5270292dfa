use crate::domain::account::{Account, AccountId, OwnerId};
use crate::error::{Result, TransferError};
use serde::Deserialize;
use std::io::Read;

/// One row of an accounts file: `owner, address, secret, balance`.
///
/// An empty `secret` marks a watch-only account that can receive but never send.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountRecord {
    pub owner: String,
    pub address: String,
    pub secret: Option<String>,
    pub balance: u64,
}

impl AccountRecord {
    pub fn to_account(&self) -> Account {
        let account = Account::new(
            AccountId::new(self.address.clone()),
            OwnerId::new(self.owner.clone()),
        );
        match &self.secret {
            Some(secret) => account.with_secret(secret.clone()),
            None => account,
        }
    }
}

/// Reads account records from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace around every field.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    /// Creates a new `AccountReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes records, one `Result` per row.
    pub fn records(self) -> impl Iterator<Item = Result<AccountRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(TransferError::from))
    }
}
