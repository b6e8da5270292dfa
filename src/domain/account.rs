use crate::error::TransferError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public address of an account on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user owning a set of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the signing material of an account.
///
/// The secret is opaque here; signing happens inside the `TransferExecutor`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub account: AccountId,
    secret: String,
}

impl Credential {
    pub fn new(account: AccountId, secret: impl Into<String>) -> Self {
        Self {
            account,
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A positive amount in the smallest currency unit (lamports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(lamports: u64) -> Result<Self, TransferError> {
        if lamports > 0 {
            Ok(Self(lamports))
        } else {
            Err(TransferError::InvalidInput(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn lamports(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = TransferError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An account known to the ledger store.
///
/// Holds no balance. Balances are read live through the `BalanceOracle`.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub owner: OwnerId,
    pub credential: Option<Credential>,
}

impl Account {
    pub fn new(id: AccountId, owner: OwnerId) -> Self {
        Self {
            id,
            owner,
            credential: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.credential = Some(Credential::new(self.id.clone(), secret));
        self
    }

    /// Returns true if `credential` is the one this account was registered with.
    pub fn authorizes(&self, credential: &Credential) -> bool {
        self.credential.as_ref() == Some(credential)
    }
}
