//! # Escrow & Disbursement Ledger
//!
//! Every deposit action appends exactly one record. Escrow records start
//! `Held` and leave it exactly once, through [`release`] or [`refund`]; the
//! status check on each transition is the only lock either needs, since the
//! host never interleaves two invocations.
//!
//! All internal writes (record, stock, payout account, liabilities) happen
//! before the token call of an operation. A failed token call returns
//! [`Error::TransferFailed`] and the host discards every write of the
//! invocation, so no record exists without its funds and vice versa.

use soroban_sdk::{Address, Env, String, Symbol, Vec};

use crate::custody;
use crate::payout;
use crate::rbac;
use crate::registry;
use crate::storage::{self, Group};
use crate::types::{
    Config, LedgerRecord, LineItem, RecordHeader, RecordKind, RecordState, RecordStatus,
    RegistryEntry, Settlement,
};
use crate::Error;

/// Maximum number of line items in one order.
pub const MAX_LINE_ITEMS: u32 = 10;

/// Maximum page size accepted by the listing queries.
pub const MAX_PAGE_SIZE: u32 = 50;

// ─────────────────────────────────────────────────────────
// Deposits
// ─────────────────────────────────────────────────────────

/// Deposit an arbitrary amount against an open-amount entry.
pub fn deposit(
    env: &Env,
    depositor: &Address,
    key: &Symbol,
    amount: i128,
) -> Result<LedgerRecord, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let entry = registry::require_active(env, key)?;
    if entry.unit_price != 0 {
        return Err(Error::EntryNotOpen);
    }

    let config = storage::load_config(env)?;
    let items = Vec::new(env);
    let record = open_record(env, RecordKind::Deposit, depositor, &entry, amount, items)?;
    index_for_key(env, key, record.id, amount)?;
    settle_inbound(env, &config, &record, entry.settlement)?;
    Ok(record)
}

/// Place a multi-item order against priced entries.
///
/// All-or-nothing: every line is validated and its stock checked before any
/// entry is written.
pub fn purchase(
    env: &Env,
    buyer: &Address,
    items: Vec<LineItem>,
) -> Result<LedgerRecord, Error> {
    if items.is_empty() {
        return Err(Error::EmptyOrder);
    }
    if items.len() > MAX_LINE_ITEMS {
        return Err(Error::TooManyLineItems);
    }

    let mut entries: Vec<RegistryEntry> = Vec::new(env);
    let mut subtotals: Vec<i128> = Vec::new(env);
    let mut total: i128 = 0;

    for (i, item) in items.iter().enumerate() {
        if item.quantity == 0 {
            return Err(Error::InvalidAmount);
        }
        for earlier in items.iter().take(i) {
            if earlier.key == item.key {
                return Err(Error::DuplicateLineItem);
            }
        }

        let mut entry = registry::require_active(env, &item.key)?;
        if entry.unit_price == 0 {
            return Err(Error::EntryNotPriced);
        }
        if let Some(first) = entries.first() {
            if first.payee != entry.payee || first.settlement != entry.settlement {
                return Err(Error::MixedPayees);
            }
        }

        registry::decrement_quantity(&mut entry, item.quantity)?;

        let subtotal = entry
            .unit_price
            .checked_mul(item.quantity as i128)
            .ok_or(Error::Overflow)?;
        total = total.checked_add(subtotal).ok_or(Error::Overflow)?;

        entries.push_back(entry);
        subtotals.push_back(subtotal);
    }

    for entry in entries.iter() {
        storage::save_entry(env, &entry);
    }

    // Non-empty: checked above.
    let lead = entries.first().ok_or(Error::EmptyOrder)?;
    let config = storage::load_config(env)?;
    let record = open_record(env, RecordKind::Order, buyer, &lead, total, items.clone())?;

    for (item, subtotal) in items.iter().zip(subtotals.iter()) {
        index_for_key(env, &item.key, record.id, subtotal)?;
    }
    settle_inbound(env, &config, &record, lead.settlement)?;
    Ok(record)
}

/// Pay an entry's unit price for access to it.
pub fn unlock(env: &Env, account: &Address, key: &Symbol) -> Result<LedgerRecord, Error> {
    let mut entry = registry::require_active(env, key)?;
    if entry.unit_price == 0 {
        return Err(Error::EntryNotPriced);
    }
    if storage::has_access(env, account, key) {
        return Err(Error::AlreadyUnlocked);
    }

    registry::decrement_quantity(&mut entry, 1)?;
    storage::save_entry(env, &entry);
    storage::set_access(env, account, key);

    let config = storage::load_config(env)?;
    let items = Vec::from_array(
        env,
        [LineItem {
            key: key.clone(),
            quantity: 1,
        }],
    );
    let amount = entry.unit_price;
    let record = open_record(env, RecordKind::Unlock, account, &entry, amount, items)?;
    index_for_key(env, key, record.id, amount)?;
    settle_inbound(env, &config, &record, entry.settlement)?;
    Ok(record)
}

pub fn has_access(env: &Env, account: &Address, key: &Symbol) -> bool {
    storage::has_access(env, account, key)
}

// ─────────────────────────────────────────────────────────
// Terminal transitions
// ─────────────────────────────────────────────────────────

/// Held → Released; credits the payee's pending balance.
pub fn release(env: &Env, record_id: u64) -> Result<LedgerRecord, Error> {
    let header = storage::load_record_header(env, record_id).ok_or(Error::UnknownRecord)?;
    let mut state = storage::load_record_state(env, record_id).ok_or(Error::UnknownRecord)?;

    if state.status != RecordStatus::Held {
        return Err(Error::NotHeld);
    }

    state.status = RecordStatus::Released;
    storage::save_record_state(env, record_id, &state);
    payout::credit(env, &header.payee, header.amount);

    Ok(LedgerRecord::from_parts(header, state))
}

/// Held → Refunded; pushes the amount back to the depositor.
///
/// Ordered line items go back into stock and refunded unlocks lose access.
pub fn refund(env: &Env, record_id: u64) -> Result<LedgerRecord, Error> {
    let header = storage::load_record_header(env, record_id).ok_or(Error::UnknownRecord)?;
    let mut state = storage::load_record_state(env, record_id).ok_or(Error::UnknownRecord)?;

    if state.status != RecordStatus::Held {
        return Err(Error::NotRefundable);
    }

    state.status = RecordStatus::Refunded;
    storage::save_record_state(env, record_id, &state);

    let mut account = storage::load_payee_account(env, &header.payee);
    account.held -= header.amount;
    account.refunded += header.amount;
    storage::save_payee_account(env, &header.payee, &account);
    storage::adjust_liabilities(env, -header.amount)?;

    for item in header.items.iter() {
        registry::restock(env, &item.key, item.quantity);
    }
    if header.kind == RecordKind::Unlock {
        if let Some(key) = &header.registry_key {
            storage::clear_access(env, &header.depositor, key);
        }
    }

    let config = storage::load_config(env)?;
    custody::push(env, &config.token, &header.depositor, header.amount)?;

    Ok(LedgerRecord::from_parts(header, state))
}

/// Attach fulfillment evidence to a record.
///
/// Proof is write-once, may be attached in any status except `Refunded`, and
/// only by the record's payee or an admin.
pub fn attach_proof(
    env: &Env,
    caller: &Address,
    record_id: u64,
    proof: String,
) -> Result<LedgerRecord, Error> {
    let header = storage::load_record_header(env, record_id).ok_or(Error::UnknownRecord)?;
    let mut state = storage::load_record_state(env, record_id).ok_or(Error::UnknownRecord)?;

    rbac::require_owner_or_admin(env, caller, &header.payee)?;

    if proof.len() == 0 {
        return Err(Error::EmptyProof);
    }
    if state.status == RecordStatus::Refunded {
        return Err(Error::RecordRefunded);
    }
    if state.proof.is_some() {
        return Err(Error::ProofAlreadySet);
    }

    state.proof = Some(proof);
    storage::save_record_state(env, record_id, &state);
    Ok(LedgerRecord::from_parts(header, state))
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

pub fn get_record(env: &Env, record_id: u64) -> Result<LedgerRecord, Error> {
    load_record(env, record_id).ok_or(Error::UnknownRecord)
}

/// Records `[offset, offset + limit)` clamped to `[0, count)`, ascending by id.
pub fn list_records(env: &Env, offset: u64, limit: u32) -> Result<Vec<LedgerRecord>, Error> {
    let (start, end) = page_bounds(storage::record_count(env), offset, limit)?;
    let mut page = Vec::new(env);
    for id in start..end {
        page.push_back(load_record(env, id).ok_or(Error::UnknownRecord)?);
    }
    Ok(page)
}

/// Record ids of a group, in creation order.
pub fn list_group(env: &Env, group: &Group, offset: u64, limit: u32) -> Result<Vec<u64>, Error> {
    let (start, end) = page_bounds(storage::group_len(env, group), offset, limit)?;
    let mut page = Vec::new(env);
    for index in start..end {
        page.push_back(storage::group_item(env, group, index).ok_or(Error::UnknownRecord)?);
    }
    Ok(page)
}

/// Clamp a page request against `total`.
///
/// `offset == total` yields an empty page so adjacent pages compose; an
/// offset past the end or an oversized page is `OutOfRange`.
pub fn page_bounds(total: u64, offset: u64, limit: u32) -> Result<(u64, u64), Error> {
    if limit > MAX_PAGE_SIZE || offset > total {
        return Err(Error::OutOfRange);
    }
    let end = offset.saturating_add(limit as u64).min(total);
    Ok((offset, end))
}

// ─────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────

fn load_record(env: &Env, record_id: u64) -> Option<LedgerRecord> {
    let header = storage::load_record_header(env, record_id)?;
    let state = storage::load_record_state(env, record_id)?;
    Some(LedgerRecord::from_parts(header, state))
}

/// Append a record for a registry-backed deposit, index it by depositor and
/// add the amount to the depositor's running total.
fn open_record(
    env: &Env,
    kind: RecordKind,
    depositor: &Address,
    entry: &RegistryEntry,
    amount: i128,
    items: Vec<LineItem>,
) -> Result<LedgerRecord, Error> {
    storage::add_depositor_total(env, depositor, amount)?;
    let status = match entry.settlement {
        Settlement::Escrow => RecordStatus::Held,
        Settlement::Direct => RecordStatus::Recorded,
    };
    let header = RecordHeader {
        id: storage::get_and_increment_record_id(env),
        kind,
        depositor: depositor.clone(),
        registry_key: Some(entry.key.clone()),
        payee: entry.payee.clone(),
        amount,
        items,
        timestamp: env.ledger().timestamp(),
    };
    Ok(append(env, header, status))
}

/// Persist a new record and add it to its depositor's index.
pub(crate) fn append(env: &Env, header: RecordHeader, status: RecordStatus) -> LedgerRecord {
    let state = RecordState {
        status,
        proof: None,
    };
    storage::save_record(env, &header, &state);
    storage::push_group(env, &Group::Depositor(header.depositor.clone()), header.id);
    LedgerRecord::from_parts(header, state)
}

fn index_for_key(env: &Env, key: &Symbol, record_id: u64, amount: i128) -> Result<(), Error> {
    storage::push_group(env, &Group::Entry(key.clone()), record_id);
    storage::add_key_total(env, key, amount)
}

/// Book the inbound value on the payee's account, then move the tokens.
fn settle_inbound(
    env: &Env,
    config: &Config,
    record: &LedgerRecord,
    settlement: Settlement,
) -> Result<(), Error> {
    let mut account = storage::load_payee_account(env, &record.payee);
    match settlement {
        Settlement::Escrow => {
            account.escrowed = account
                .escrowed
                .checked_add(record.amount)
                .ok_or(Error::Overflow)?;
            account.held = account
                .held
                .checked_add(record.amount)
                .ok_or(Error::Overflow)?;
            storage::save_payee_account(env, &record.payee, &account);
            storage::adjust_liabilities(env, record.amount)?;
            custody::pull(env, &config.token, &record.depositor, record.amount)
        }
        Settlement::Direct => {
            account.settled = account
                .settled
                .checked_add(record.amount)
                .ok_or(Error::Overflow)?;
            storage::save_payee_account(env, &record.payee, &account);
            custody::transfer(
                env,
                &config.token,
                &record.depositor,
                &record.payee,
                record.amount,
            )
        }
    }
}
