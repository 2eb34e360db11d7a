//! # Payout Ledger
//!
//! Pull-based withdrawal. A release only credits `pending`; tokens move when
//! the payee asks for them, so a payee that cannot receive never blocks a
//! release.

use soroban_sdk::{Address, Env};

use crate::custody;
use crate::storage;
use crate::types::PayeeAccount;
use crate::Error;

/// Move a released amount from `held` to `pending`.
///
/// Only [`crate::ledger::release`] calls this. Both sides count towards the
/// contract's liabilities, so the total is unchanged.
pub(crate) fn credit(env: &Env, payee: &Address, amount: i128) {
    let mut account = storage::load_payee_account(env, payee);
    account.held -= amount;
    account.pending = account.pending.saturating_add(amount);
    storage::save_payee_account(env, payee, &account);
}

/// Transfer `amount` of `payee`'s pending balance to `destination`.
///
/// Partial withdrawals are allowed. The balance is debited before the token
/// call.
pub fn withdraw(
    env: &Env,
    payee: &Address,
    destination: &Address,
    amount: i128,
) -> Result<PayeeAccount, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let mut account = storage::load_payee_account(env, payee);
    if amount > account.pending {
        return Err(Error::InsufficientPending);
    }

    account.pending -= amount;
    account.withdrawn = account
        .withdrawn
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::save_payee_account(env, payee, &account);
    storage::adjust_liabilities(env, -amount)?;

    let config = storage::load_config(env)?;
    custody::push(env, &config.token, destination, amount)?;
    Ok(account)
}

pub fn pending_of(env: &Env, payee: &Address) -> i128 {
    storage::load_payee_account(env, payee).pending
}

/// Recover tokens sent to the contract outside the escrow flows.
///
/// For the escrow token the contract balance left after the transfer must
/// still cover every held and pending amount.
pub fn admin_withdraw(
    env: &Env,
    token: &Address,
    destination: &Address,
    amount: i128,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let config = storage::load_config(env)?;
    if *token == config.token {
        let balance = custody::contract_balance(env, token);
        let remaining = balance.checked_sub(amount).ok_or(Error::Overflow)?;
        if remaining < storage::liabilities(env) {
            return Err(Error::InsufficientReserve);
        }
    }

    custody::push(env, token, destination, amount)
}
