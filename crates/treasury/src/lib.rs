//! CTAS Treasury - Custodied balance
//!
//! Funds enter through `deposit` (initial funding included) and leave only
//! through `pay_out`. The treasury keeps a running total of what each
//! destination has received.

use ctas_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from treasury operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Treasury balance overflow")]
    Overflow,
}

/// A completed transfer out of the treasury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub destination: AccountId,
    pub amount: Amount,
    /// Treasury balance after the transfer
    pub remaining: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    balance: Amount,
    paid: BTreeMap<AccountId, Amount>,
}

impl Treasury {
    /// Create a treasury holding `initial_funding`
    pub fn new(initial_funding: Amount) -> Self {
        Self {
            balance: initial_funding,
            paid: BTreeMap::new(),
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Credit the treasury. Returns the new balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<Amount, TreasuryError> {
        self.balance = self
            .balance
            .checked_add(&amount)
            .ok_or(TreasuryError::Overflow)?;
        Ok(self.balance)
    }

    /// Transfer `amount` to `destination`.
    ///
    /// Nothing changes on error.
    pub fn pay_out(
        &mut self,
        destination: &AccountId,
        amount: Amount,
    ) -> Result<Payout, TreasuryError> {
        let remaining =
            self.balance
                .checked_sub(&amount)
                .ok_or(TreasuryError::InsufficientFunds {
                    requested: amount,
                    available: self.balance,
                })?;
        let received = self
            .paid_to(destination)
            .checked_add(&amount)
            .ok_or(TreasuryError::Overflow)?;

        self.balance = remaining;
        self.paid.insert(destination.clone(), received);

        Ok(Payout {
            destination: destination.clone(),
            amount,
            remaining,
        })
    }

    /// Total received by `destination` across all payouts
    pub fn paid_to(&self, destination: &AccountId) -> Amount {
        self.paid.get(destination).copied().unwrap_or_default()
    }

    /// Total paid out to everyone
    pub fn total_paid_out(&self) -> Result<Amount, TreasuryError> {
        self.paid.values().try_fold(Amount::ZERO, |acc, a| {
            acc.checked_add(a).ok_or(TreasuryError::Overflow)
        })
    }
}
