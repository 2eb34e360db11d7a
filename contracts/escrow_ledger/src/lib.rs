//! # Escrow Ledger Contract
//!
//! A registry-gated escrow and disbursement ledger. It exposes the single
//! Soroban contract `EscrowLedger` whose entry points cover the full custody
//! lifecycle:
//!
//! | Phase        | Entry Point(s)                                             |
//! |--------------|------------------------------------------------------------|
//! | Bootstrap    | [`EscrowLedger::init`]                                     |
//! | Role admin   | `grant_role`, `revoke_role`, `transfer_super_admin`        |
//! | Emergency    | `pause`, `unpause`                                         |
//! | Registry     | `create_entry`, `approve_entry`, `update_entry`, `remove_entry` |
//! | Deposits     | `deposit`, `purchase`, `unlock`                            |
//! | Settlement   | `release`, `refund`, `attach_proof`                        |
//! | Payouts      | `withdraw`, `admin_withdraw`                               |
//! | Rewards      | `set_reward_rate`, `issue_reward`                          |
//! | Queries      | `get_record`, `list_records`, `list_records_for_key`, ...  |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`]. Registry rules live in
//! `registry`, the record state machine in `ledger`, pull-based payouts in
//! `payout`. Storage access is delegated to `storage`. This file contains
//! only the public entry points and event emissions.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Symbol, Vec};

pub mod events;
pub mod rbac;

mod custody;
mod ledger;
mod payout;
mod registry;
mod rewards;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_registry;
#[cfg(test)]
mod test_utils;

pub use ledger::{MAX_LINE_ITEMS, MAX_PAGE_SIZE};
pub use rbac::Role;
use storage::Group;
pub use types::{
    Config, EntryState, LedgerRecord, LineItem, PayeeAccount, RecordKind, RecordStatus,
    RegistryEntry, RegistryPolicy, Settlement,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    RoleNotFound = 4,
    UnknownKey = 5,
    UnknownRecord = 6,
    DuplicateKey = 7,
    AlreadyActive = 8,
    AlreadyRemoved = 9,
    InactiveTarget = 10,
    InsufficientQuantity = 11,
    TransferFailed = 12,
    NotHeld = 13,
    NotRefundable = 14,
    InsufficientPending = 15,
    OutOfRange = 16,
    InvalidAmount = 17,
    Overflow = 18,
    ProtocolPaused = 19,
    EmptyOrder = 20,
    TooManyLineItems = 21,
    DuplicateLineItem = 22,
    /// Line items of one order disagree on payee or settlement.
    MixedPayees = 23,
    EntryNotOpen = 24,
    EntryNotPriced = 25,
    AlreadyUnlocked = 26,
    ProofAlreadySet = 27,
    RecordRefunded = 28,
    EmptyProof = 29,
    /// Contract surplus cannot cover the transfer without touching liabilities.
    InsufficientReserve = 30,
    InvalidRate = 31,
}

#[contract]
pub struct EscrowLedger;

#[contractimpl]
impl EscrowLedger {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract, set the first SuperAdmin and fix the escrow
    /// token and registry policy.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls fail with `Error::AlreadyInitialized`.
    pub fn init(
        env: Env,
        super_admin: Address,
        token: Address,
        policy: RegistryPolicy,
    ) -> Result<(), Error> {
        super_admin.require_auth();
        if storage::has_config(&env) {
            return Err(Error::AlreadyInitialized);
        }
        rbac::init_super_admin(&env, &super_admin)?;
        storage::save_config(&env, &Config { token, policy });
        Ok(())
    }

    pub fn config(env: Env) -> Result<Config, Error> {
        storage::load_config(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant `role` to `target`.
    ///
    /// - `caller` must hold `SuperAdmin` or `Admin`.
    /// - `SuperAdmin` cannot be granted; use `transfer_super_admin`.
    pub fn grant_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        rbac::grant_role(&env, &caller, &target, role)
    }

    /// Revoke any role from `target`.
    ///
    /// - `caller` must hold `SuperAdmin` or `Admin`.
    /// - Cannot be used to remove the SuperAdmin; use `transfer_super_admin`.
    pub fn revoke_role(env: Env, caller: Address, target: Address) -> Result<(), Error> {
        rbac::revoke_role(&env, &caller, &target)
    }

    /// Transfer SuperAdmin to `new_super_admin`. The previous SuperAdmin loses
    /// the role immediately.
    pub fn transfer_super_admin(
        env: Env,
        current_super_admin: Address,
        new_super_admin: Address,
    ) -> Result<(), Error> {
        rbac::transfer_super_admin(&env, &current_super_admin, &new_super_admin)
    }

    /// Return the role held by `address`, or `None`.
    pub fn role_of(env: Env, address: Address) -> Option<Role> {
        rbac::role_of(&env, address)
    }

    /// Return `true` if `address` holds `role`.
    pub fn has_role(env: Env, address: Address, role: Role) -> bool {
        rbac::has_role(&env, address, role)
    }

    // ─────────────────────────────────────────────────────────
    // Emergency control
    // ─────────────────────────────────────────────────────────

    /// Pause every value-moving entry point. Queries keep working.
    pub fn pause(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller)?;
        storage::set_paused(&env, true);
        events::emit_protocol_paused(&env, caller);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller)?;
        storage::set_paused(&env, false);
        events::emit_protocol_unpaused(&env, caller);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Create a registry entry.
    ///
    /// Under `AdminOnly` the caller must hold `RegistryAdmin` (or be an admin)
    /// and the entry starts `Active`. Under `OpenWithApproval` any caller may
    /// create and the entry starts `Pending`.
    ///
    /// `unit_price == 0` makes an open-amount entry for `deposit`; a positive
    /// price makes a priced entry for `purchase` and `unlock`.
    pub fn create_entry(
        env: Env,
        caller: Address,
        key: Symbol,
        payee: Address,
        settlement: Settlement,
        unit_price: i128,
        quantity: Option<u32>,
    ) -> Result<RegistryEntry, Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();

        let entry = registry::create_entry(
            &env, &caller, key, payee, settlement, unit_price, quantity,
        )?;

        events::emit_entry_created(
            &env,
            entry.key.clone(),
            entry.payee.clone(),
            entry.state,
            entry.unit_price,
            entry.quantity,
        );
        Ok(entry)
    }

    /// Move a `Pending` entry to `Active`. Registry admins only.
    pub fn approve_entry(env: Env, caller: Address, key: Symbol) -> Result<RegistryEntry, Error> {
        caller.require_auth();
        let entry = registry::approve_entry(&env, &caller, &key)?;
        events::emit_entry_approved(&env, key, caller);
        Ok(entry)
    }

    /// Reprice or restock an entry. Payee or registry admin only.
    pub fn update_entry(
        env: Env,
        caller: Address,
        key: Symbol,
        unit_price: i128,
        quantity: Option<u32>,
    ) -> Result<RegistryEntry, Error> {
        caller.require_auth();
        let entry = registry::update_entry(&env, &caller, &key, unit_price, quantity)?;
        events::emit_entry_updated(&env, key, entry.unit_price, entry.quantity);
        Ok(entry)
    }

    /// Flag an entry `Removed`. Payee or registry admin only.
    pub fn remove_entry(env: Env, caller: Address, key: Symbol) -> Result<(), Error> {
        caller.require_auth();
        registry::remove_entry(&env, &caller, &key)?;
        events::emit_entry_removed(&env, key, caller);
        Ok(())
    }

    pub fn get_entry(env: Env, key: Symbol) -> Result<RegistryEntry, Error> {
        registry::get_entry(&env, &key)
    }

    pub fn is_active(env: Env, key: Symbol) -> bool {
        registry::is_active(&env, &key)
    }

    // ─────────────────────────────────────────────────────────
    // Deposits
    // ─────────────────────────────────────────────────────────

    /// Deposit `amount` against an open-amount entry. Returns the record id.
    pub fn deposit(env: Env, depositor: Address, key: Symbol, amount: i128) -> Result<u64, Error> {
        Self::require_not_paused(&env)?;
        depositor.require_auth();
        let record = ledger::deposit(&env, &depositor, &key, amount)?;
        Self::emit_created(&env, &record);
        Ok(record.id)
    }

    /// Order priced entries. All line items succeed or none do.
    pub fn purchase(env: Env, buyer: Address, items: Vec<LineItem>) -> Result<u64, Error> {
        Self::require_not_paused(&env)?;
        buyer.require_auth();
        let record = ledger::purchase(&env, &buyer, items)?;
        Self::emit_created(&env, &record);
        Ok(record.id)
    }

    /// Pay a priced entry's unit price to gain access to it.
    pub fn unlock(env: Env, account: Address, key: Symbol) -> Result<u64, Error> {
        Self::require_not_paused(&env)?;
        account.require_auth();
        let record = ledger::unlock(&env, &account, &key)?;
        Self::emit_created(&env, &record);
        Ok(record.id)
    }

    pub fn has_access(env: Env, account: Address, key: Symbol) -> bool {
        ledger::has_access(&env, &account, &key)
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Release a held record to its payee's pending balance.
    ///
    /// `caller` must hold `Disburser` (or be an admin).
    pub fn release(env: Env, caller: Address, record_id: u64) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require(&env, &caller, Role::Disburser)?;

        let record = ledger::release(&env, record_id)?;
        events::emit_record_released(&env, record.id, record.payee, record.amount, caller);
        Ok(())
    }

    /// Refund a held record to its depositor.
    ///
    /// `caller` must hold `RefundManager` (or be an admin).
    pub fn refund(env: Env, caller: Address, record_id: u64) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        caller.require_auth();
        rbac::require(&env, &caller, Role::RefundManager)?;

        let record = ledger::refund(&env, record_id)?;
        events::emit_record_refunded(&env, record.id, record.depositor, record.amount, caller);
        Ok(())
    }

    /// Attach write-once fulfillment evidence. Payee or admin only.
    pub fn attach_proof(env: Env, caller: Address, record_id: u64, proof: String) -> Result<(), Error> {
        caller.require_auth();
        ledger::attach_proof(&env, &caller, record_id, proof.clone())?;
        events::emit_proof_attached(&env, record_id, caller, proof);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Payouts
    // ─────────────────────────────────────────────────────────

    /// Withdraw `amount` of `payee`'s pending balance to `destination`.
    pub fn withdraw(env: Env, payee: Address, destination: Address, amount: i128) -> Result<(), Error> {
        Self::require_not_paused(&env)?;
        payee.require_auth();
        let account = payout::withdraw(&env, &payee, &destination, amount)?;
        events::emit_payout_withdrawn(&env, payee, destination, amount, account.pending);
        Ok(())
    }

    /// Recover tokens that are not owed to any payee. Admins only.
    pub fn admin_withdraw(
        env: Env,
        caller: Address,
        token: Address,
        destination: Address,
        amount: i128,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller)?;
        payout::admin_withdraw(&env, &token, &destination, amount)?;
        events::emit_token_recovered(&env, token, destination, amount, caller);
        Ok(())
    }

    pub fn pending_of(env: Env, payee: Address) -> i128 {
        payout::pending_of(&env, &payee)
    }

    pub fn account_of(env: Env, payee: Address) -> PayeeAccount {
        storage::load_payee_account(&env, &payee)
    }

    /// Held plus pending value across all payees.
    pub fn liabilities(env: Env) -> i128 {
        storage::liabilities(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Rewards
    // ─────────────────────────────────────────────────────────

    /// Set the reward rate in basis points (at most 10 000). Admins only.
    pub fn set_reward_rate(env: Env, caller: Address, bps: u32) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller)?;
        rewards::set_reward_rate(&env, bps)
    }

    pub fn reward_rate(env: Env) -> u32 {
        storage::reward_rate(&env)
    }

    /// Pay `recipient` `base_amount * rate / 10_000` from the contract surplus.
    ///
    /// `manager` must hold `RewardManager` (or be an admin).
    pub fn issue_reward(
        env: Env,
        manager: Address,
        recipient: Address,
        base_amount: i128,
    ) -> Result<u64, Error> {
        Self::require_not_paused(&env)?;
        manager.require_auth();
        rbac::require(&env, &manager, Role::RewardManager)?;

        let record = rewards::issue_reward(&env, &manager, &recipient, base_amount)?;
        Self::emit_created(&env, &record);
        events::emit_reward_issued(&env, record.id, recipient, base_amount, record.amount);
        Ok(record.id)
    }

    pub fn rewards_given(env: Env, account: Address) -> i128 {
        rewards::rewards_given(&env, &account)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_record(env: Env, record_id: u64) -> Result<LedgerRecord, Error> {
        ledger::get_record(&env, record_id)
    }

    pub fn record_count(env: Env) -> u64 {
        storage::record_count(&env)
    }

    /// Records `[offset, offset + limit)` in ascending id order.
    ///
    /// `offset == record_count` returns an empty page; a larger offset or a
    /// `limit` above `MAX_PAGE_SIZE` fails with `OutOfRange`.
    pub fn list_records(env: Env, offset: u64, limit: u32) -> Result<Vec<LedgerRecord>, Error> {
        ledger::list_records(&env, offset, limit)
    }

    /// Ids of the records targeting `key`, paged like `list_records`.
    pub fn list_records_for_key(
        env: Env,
        key: Symbol,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u64>, Error> {
        ledger::list_group(&env, &Group::Entry(key), offset, limit)
    }

    pub fn record_count_for_key(env: Env, key: Symbol) -> u64 {
        storage::group_len(&env, &Group::Entry(key))
    }

    /// Sum of every amount ever deposited against `key`.
    pub fn total_amount_for_key(env: Env, key: Symbol) -> i128 {
        storage::key_total(&env, &key)
    }

    /// Ids of the records created by `depositor`, paged like `list_records`.
    pub fn list_records_for_depositor(
        env: Env,
        depositor: Address,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u64>, Error> {
        ledger::list_group(&env, &Group::Depositor(depositor), offset, limit)
    }

    /// Sum of every deposit, order and unlock `depositor` has made. Refunds
    /// do not reduce it and rewards are not counted.
    pub fn total_amount_for_depositor(env: Env, depositor: Address) -> i128 {
        storage::depositor_total(&env, &depositor)
    }

    // ─────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────

    fn require_not_paused(env: &Env) -> Result<(), Error> {
        if storage::is_paused(env) {
            return Err(Error::ProtocolPaused);
        }
        Ok(())
    }

    fn emit_created(env: &Env, record: &LedgerRecord) {
        events::emit_record_created(
            env,
            events::RecordCreated {
                record_id: record.id,
                kind: record.kind,
                depositor: record.depositor.clone(),
                registry_key: record.registry_key.clone(),
                payee: record.payee.clone(),
                amount: record.amount,
                status: record.status,
            },
        );
    }
}
