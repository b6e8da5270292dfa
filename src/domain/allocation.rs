//! Amount allocation policy.
//!
//! Pure functions deciding how much each account sends or receives. They run
//! sequentially, before any transfer is dispatched, so the running remainder
//! of a fan-out never needs to be shared between concurrent tasks.

use super::account::{AccountId, Amount};
use crate::error::{Result, TransferError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Share of a balance to move, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fraction(Decimal);

impl Fraction {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO && value <= dec!(1) {
            Ok(Self(value))
        } else {
            Err(TransferError::InvalidInput(format!(
                "Target fraction must be in (0, 1], got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `floor(lamports * fraction)`.
    pub fn apply(&self, lamports: u64) -> u64 {
        (Decimal::from(lamports) * self.0)
            .floor()
            .to_u64()
            .unwrap_or_default()
    }
}

impl TryFrom<Decimal> for Fraction {
    type Error = TransferError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

/// Costs applied to a one-to-many distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutPolicy {
    /// Fee withheld once from the distributable pool.
    pub fee: u64,
    /// The pool must exceed this amount or nothing is sent.
    pub min_distributable: u64,
}

/// Costs applied to each source of a many-to-one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanInPolicy {
    /// Balance every source must keep to stay usable.
    pub reserve: u64,
    pub fee: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FanOutAllocation {
    /// `floor(balance * fraction) - fee`.
    pub distributable: u64,
    /// `floor(distributable / recipients)`.
    pub per_recipient_cap: u64,
    /// Non-zero shares in recipient order.
    pub shares: Vec<(AccountId, Amount)>,
}

impl FanOutAllocation {
    pub fn total(&self) -> u64 {
        self.shares.iter().map(|(_, amount)| amount.lamports()).sum()
    }
}

/// Splits `floor(balance * fraction) - fee` across `recipients`.
///
/// Recipients are served in the order given. Each takes `min(cap, remaining)`;
/// the last one takes whatever remains, so the rounding remainder rolls
/// forward instead of being dropped. The total never exceeds the pool.
pub fn allocate_fan_out(
    balance: u64,
    fraction: Fraction,
    policy: &FanOutPolicy,
    recipients: &[AccountId],
) -> Result<FanOutAllocation> {
    if recipients.is_empty() {
        return Err(TransferError::NoRecipients(
            "recipient list is empty".to_string(),
        ));
    }

    let pool = fraction.apply(balance);
    let distributable = pool.saturating_sub(policy.fee);
    if pool <= policy.fee || distributable <= policy.min_distributable {
        return Err(TransferError::InsufficientFunds(format!(
            "distributable amount {} does not exceed minimum {} (balance {}, fee {})",
            distributable, policy.min_distributable, balance, policy.fee
        )));
    }

    let count = recipients.len() as u64;
    let per_recipient_cap = distributable / count;
    let mut remaining = distributable;
    let mut shares = Vec::with_capacity(recipients.len());

    for (index, recipient) in recipients.iter().enumerate() {
        let share = if index + 1 == recipients.len() {
            remaining
        } else {
            per_recipient_cap.min(remaining)
        };
        remaining -= share;

        // A cap of zero (pool smaller than the recipient count) leaves early
        // recipients empty; they are left out of the plan.
        if let Ok(amount) = Amount::new(share) {
            shares.push((recipient.clone(), amount));
        }
    }

    Ok(FanOutAllocation {
        distributable,
        per_recipient_cap,
        shares,
    })
}

/// What a single source contributes to a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDecision {
    Transfer(Amount),
    /// Nothing to move. Not a failure.
    Skip { transferable: i128 },
}

/// `floor((balance - reserve - fee) * fraction)`, or a skip when that is not
/// positive.
pub fn allocate_fan_in(balance: u64, fraction: Fraction, policy: &FanInPolicy) -> SweepDecision {
    let transferable = i128::from(balance) - i128::from(policy.reserve) - i128::from(policy.fee);
    if transferable <= 0 {
        return SweepDecision::Skip { transferable };
    }

    // transferable <= balance, so it fits in a u64
    match Amount::new(fraction.apply(transferable as u64)) {
        Ok(amount) => SweepDecision::Transfer(amount),
        Err(_) => SweepDecision::Skip { transferable },
    }
}
