//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the ledger:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type      | Description                                |
//! |----------------|-----------|--------------------------------------------|
//! | `Config`       | `Config`  | Escrow token and registry policy           |
//! | `RecordCount`  | `u64`     | Auto-increment record ID counter           |
//! | `Paused`       | `bool`    | Circuit breaker flag                       |
//! | `RewardRate`   | `u32`     | Reward rate in basis points                |
//! | `Liabilities`  | `i128`    | Held + pending value owed to payees        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type            | Description                        |
//! |----------------------|-----------------|------------------------------------|
//! | `Entry(key)`         | `RegistryEntry` | Registry entry                     |
//! | `RecHeader(id)`      | `RecordHeader`  | Immutable record fields            |
//! | `RecState(id)`       | `RecordState`   | Status and proof                   |
//! | `GroupLen(group)`    | `u64`           | Number of ids in a group index     |
//! | `GroupItem(group,n)` | `u64`           | n-th record id of a group          |
//! | `KeyTotal(key)`      | `i128`          | Running amount total per entry     |
//! | `DepositorTotal(a)`  | `i128`          | Running amount total per depositor |
//! | `Payee(addr)`        | `PayeeAccount`  | Payout ledger row                  |
//! | `Access(addr,key)`   | `bool`          | Unlocked content                   |
//! | `Rewards(addr)`      | `i128`          | Rewards paid to an account         |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Why index groups entry-by-entry?
//!
//! The ledger is append-only and ids are monotonic, so a group index is just
//! a counter plus one small entry per id. Appending is O(1) and never rewrites
//! a growing vector; paging reads exactly `limit` entries.

use soroban_sdk::{contracttype, Address, Env, Symbol};

use crate::types::{Config, PayeeAccount, RecordHeader, RecordState, RegistryEntry};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// A logical grouping of records with its own id index.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Group {
    /// Records targeting a registry entry.
    Entry(Symbol),
    /// Records created by an account.
    Depositor(Address),
}

/// All contract storage keys (role storage lives in `RbacKey` inside rbac.rs).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    RecordCount,
    Paused,
    RewardRate,
    Liabilities,
    Entry(Symbol),
    RecHeader(u64),
    RecState(u64),
    GroupLen(Group),
    GroupItem(Group, u64),
    KeyTotal(Symbol),
    DepositorTotal(Address),
    Payee(Address),
    Access(Address, Symbol),
    Rewards(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn save_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Result<Config, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

/// Atomically reads, increments, and stores the record counter.
/// Returns the ID to use for the *current* record (pre-increment value).
pub fn get_and_increment_record_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = record_count(env);
    env.storage()
        .instance()
        .set(&DataKey::RecordCount, &(current + 1));
    current
}

pub fn record_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::RecordCount)
        .unwrap_or(0)
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    bump_instance(env);
}

pub fn reward_rate(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::RewardRate)
        .unwrap_or(0)
}

pub fn set_reward_rate(env: &Env, bps: u32) {
    env.storage().instance().set(&DataKey::RewardRate, &bps);
    bump_instance(env);
}

/// Value the contract owes payees: every `Held` amount plus every pending payout.
pub fn liabilities(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::Liabilities)
        .unwrap_or(0)
}

pub fn adjust_liabilities(env: &Env, delta: i128) -> Result<(), Error> {
    let next = liabilities(env)
        .checked_add(delta)
        .ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::Liabilities, &next);
    bump_instance(env);
    Ok(())
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key of any key type.
pub(crate) fn bump_persistent<K>(env: &Env, key: &K)
where
    K: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn write_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

// Registry

pub fn has_entry(env: &Env, key: &Symbol) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Entry(key.clone()))
}

pub fn load_entry(env: &Env, key: &Symbol) -> Option<RegistryEntry> {
    read_persistent(env, &DataKey::Entry(key.clone()))
}

pub fn save_entry(env: &Env, entry: &RegistryEntry) {
    write_persistent(env, &DataKey::Entry(entry.key.clone()), entry);
}

// Records

/// Save both the immutable header and initial mutable state for a new record.
pub fn save_record(env: &Env, header: &RecordHeader, state: &RecordState) {
    write_persistent(env, &DataKey::RecHeader(header.id), header);
    write_persistent(env, &DataKey::RecState(header.id), state);
}

pub fn load_record_header(env: &Env, id: u64) -> Option<RecordHeader> {
    read_persistent(env, &DataKey::RecHeader(id))
}

pub fn load_record_state(env: &Env, id: u64) -> Option<RecordState> {
    read_persistent(env, &DataKey::RecState(id))
}

/// Save only the mutable record state (release, refund, proof).
pub fn save_record_state(env: &Env, id: u64, state: &RecordState) {
    write_persistent(env, &DataKey::RecState(id), state);
}

// Group indexes

pub fn group_len(env: &Env, group: &Group) -> u64 {
    read_persistent(env, &DataKey::GroupLen(group.clone())).unwrap_or(0)
}

/// Append `record_id` to the end of `group`'s index.
pub fn push_group(env: &Env, group: &Group, record_id: u64) {
    let len = group_len(env, group);
    write_persistent(env, &DataKey::GroupItem(group.clone(), len), &record_id);
    write_persistent(env, &DataKey::GroupLen(group.clone()), &(len + 1));
}

pub fn group_item(env: &Env, group: &Group, index: u64) -> Option<u64> {
    read_persistent(env, &DataKey::GroupItem(group.clone(), index))
}

pub fn key_total(env: &Env, key: &Symbol) -> i128 {
    read_persistent(env, &DataKey::KeyTotal(key.clone())).unwrap_or(0)
}

pub fn add_key_total(env: &Env, key: &Symbol, amount: i128) -> Result<(), Error> {
    let next = key_total(env, key)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    write_persistent(env, &DataKey::KeyTotal(key.clone()), &next);
    Ok(())
}

pub fn depositor_total(env: &Env, depositor: &Address) -> i128 {
    read_persistent(env, &DataKey::DepositorTotal(depositor.clone())).unwrap_or(0)
}

pub fn add_depositor_total(env: &Env, depositor: &Address, amount: i128) -> Result<(), Error> {
    let next = depositor_total(env, depositor)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    write_persistent(env, &DataKey::DepositorTotal(depositor.clone()), &next);
    Ok(())
}

// Payout ledger

/// Load a payee's account. Accounts are created implicitly on first credit.
pub fn load_payee_account(env: &Env, payee: &Address) -> PayeeAccount {
    read_persistent(env, &DataKey::Payee(payee.clone())).unwrap_or_default()
}

pub fn save_payee_account(env: &Env, payee: &Address, account: &PayeeAccount) {
    write_persistent(env, &DataKey::Payee(payee.clone()), account);
}

// Access grants

pub fn has_access(env: &Env, account: &Address, key: &Symbol) -> bool {
    read_persistent(env, &DataKey::Access(account.clone(), key.clone())).unwrap_or(false)
}

pub fn set_access(env: &Env, account: &Address, key: &Symbol) {
    write_persistent(env, &DataKey::Access(account.clone(), key.clone()), &true);
}

pub fn clear_access(env: &Env, account: &Address, key: &Symbol) {
    env.storage()
        .persistent()
        .remove(&DataKey::Access(account.clone(), key.clone()));
}

// Rewards

pub fn rewards_given(env: &Env, account: &Address) -> i128 {
    read_persistent(env, &DataKey::Rewards(account.clone())).unwrap_or(0)
}

pub fn add_rewards_given(env: &Env, account: &Address, amount: i128) -> Result<(), Error> {
    let next = rewards_given(env, account)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    write_persistent(env, &DataKey::Rewards(account.clone()), &next);
    Ok(())
}
