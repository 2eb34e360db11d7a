//! Reward issuance paid from the contract's surplus.
//!
//! Surplus is the escrow-token balance minus liabilities, so rewards can
//! never spend value that is held or owed to a payee.

use soroban_sdk::{Address, Env, Vec};

use crate::custody;
use crate::ledger;
use crate::storage;
use crate::types::{LedgerRecord, RecordHeader, RecordKind, RecordStatus};
use crate::Error;

pub const BPS_DENOMINATOR: u32 = 10_000;

pub fn set_reward_rate(env: &Env, bps: u32) -> Result<(), Error> {
    if bps > BPS_DENOMINATOR {
        return Err(Error::InvalidRate);
    }
    storage::set_reward_rate(env, bps);
    Ok(())
}

/// `base_amount * rate / 10_000`, rounded down.
pub fn compute_reward(base_amount: i128, bps: u32) -> Result<i128, Error> {
    let scaled = base_amount
        .checked_mul(bps as i128)
        .ok_or(Error::Overflow)?;
    Ok(scaled / BPS_DENOMINATOR as i128)
}

/// Pay `recipient` a reward on `base_amount` and append a `Reward` record.
pub fn issue_reward(
    env: &Env,
    manager: &Address,
    recipient: &Address,
    base_amount: i128,
) -> Result<LedgerRecord, Error> {
    if base_amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let reward = compute_reward(base_amount, storage::reward_rate(env))?;
    if reward <= 0 {
        return Err(Error::InvalidAmount);
    }

    let config = storage::load_config(env)?;
    let surplus = custody::contract_balance(env, &config.token) - storage::liabilities(env);
    if reward > surplus {
        return Err(Error::InsufficientReserve);
    }

    let header = RecordHeader {
        id: storage::get_and_increment_record_id(env),
        kind: RecordKind::Reward,
        depositor: manager.clone(),
        registry_key: None,
        payee: recipient.clone(),
        amount: reward,
        items: Vec::new(env),
        timestamp: env.ledger().timestamp(),
    };
    let record = ledger::append(env, header, RecordStatus::Recorded);
    storage::add_rewards_given(env, recipient, reward)?;

    custody::push(env, &config.token, recipient, reward)?;
    Ok(record)
}

pub fn rewards_given(env: &Env, account: &Address) -> i128 {
    storage::rewards_given(env, account)
}
