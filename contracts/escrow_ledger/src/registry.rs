//! # Registry
//!
//! Keyed deposit targets. Entries are never deleted: removal flips the state to
//! `Removed`, which rejects new deposits while historical records stay valid.
//! The payee bound to a key at creation never changes.

use soroban_sdk::{Address, Env, Symbol};

use crate::rbac::{self, Role};
use crate::storage;
use crate::types::{EntryState, RegistryEntry, RegistryPolicy, Settlement};
use crate::Error;

pub fn create_entry(
    env: &Env,
    caller: &Address,
    key: Symbol,
    payee: Address,
    settlement: Settlement,
    unit_price: i128,
    quantity: Option<u32>,
) -> Result<RegistryEntry, Error> {
    let config = storage::load_config(env)?;

    let state = match config.policy {
        RegistryPolicy::AdminOnly => {
            rbac::require(env, caller, Role::RegistryAdmin)?;
            EntryState::Active
        }
        RegistryPolicy::OpenWithApproval => EntryState::Pending,
    };

    validate_pricing(unit_price, quantity)?;

    if storage::has_entry(env, &key) {
        return Err(Error::DuplicateKey);
    }

    let entry = RegistryEntry {
        key,
        payee,
        state,
        settlement,
        unit_price,
        quantity,
        created_at: env.ledger().timestamp(),
    };
    storage::save_entry(env, &entry);
    Ok(entry)
}

/// Pending → Active.
pub fn approve_entry(env: &Env, caller: &Address, key: &Symbol) -> Result<RegistryEntry, Error> {
    rbac::require(env, caller, Role::RegistryAdmin)?;

    let mut entry = storage::load_entry(env, key).ok_or(Error::UnknownKey)?;
    match entry.state {
        EntryState::Pending => {}
        EntryState::Active => return Err(Error::AlreadyActive),
        EntryState::Removed => return Err(Error::AlreadyRemoved),
    }

    entry.state = EntryState::Active;
    storage::save_entry(env, &entry);
    Ok(entry)
}

/// Reprice or restock an entry. The payee is not updatable.
pub fn update_entry(
    env: &Env,
    caller: &Address,
    key: &Symbol,
    unit_price: i128,
    quantity: Option<u32>,
) -> Result<RegistryEntry, Error> {
    let mut entry = storage::load_entry(env, key).ok_or(Error::UnknownKey)?;
    require_payee_or_registry_admin(env, caller, &entry)?;

    if entry.state == EntryState::Removed {
        return Err(Error::AlreadyRemoved);
    }
    validate_pricing(unit_price, quantity)?;

    entry.unit_price = unit_price;
    entry.quantity = quantity;
    storage::save_entry(env, &entry);
    Ok(entry)
}

pub fn remove_entry(env: &Env, caller: &Address, key: &Symbol) -> Result<RegistryEntry, Error> {
    let mut entry = storage::load_entry(env, key).ok_or(Error::UnknownKey)?;
    require_payee_or_registry_admin(env, caller, &entry)?;

    if entry.state == EntryState::Removed {
        return Err(Error::AlreadyRemoved);
    }

    entry.state = EntryState::Removed;
    storage::save_entry(env, &entry);
    Ok(entry)
}

pub fn get_entry(env: &Env, key: &Symbol) -> Result<RegistryEntry, Error> {
    storage::load_entry(env, key).ok_or(Error::UnknownKey)
}

pub fn is_active(env: &Env, key: &Symbol) -> bool {
    matches!(
        storage::load_entry(env, key),
        Some(RegistryEntry {
            state: EntryState::Active,
            ..
        })
    )
}

/// Load an entry that can take deposits. Missing, pending and removed keys
/// all fail the same way.
pub(crate) fn require_active(env: &Env, key: &Symbol) -> Result<RegistryEntry, Error> {
    match storage::load_entry(env, key) {
        Some(entry) if entry.state == EntryState::Active => Ok(entry),
        _ => Err(Error::InactiveTarget),
    }
}

/// Take `n` units of stock from an in-memory entry. The caller persists it.
pub(crate) fn decrement_quantity(entry: &mut RegistryEntry, n: u32) -> Result<(), Error> {
    if let Some(available) = entry.quantity {
        if n > available {
            return Err(Error::InsufficientQuantity);
        }
        entry.quantity = Some(available - n);
    }
    Ok(())
}

/// Return `n` units to a bounded entry's stock.
pub(crate) fn restock(env: &Env, key: &Symbol, n: u32) {
    if let Some(mut entry) = storage::load_entry(env, key) {
        if let Some(available) = entry.quantity {
            entry.quantity = Some(available.saturating_add(n));
            storage::save_entry(env, &entry);
        }
    }
}

fn require_payee_or_registry_admin(
    env: &Env,
    caller: &Address,
    entry: &RegistryEntry,
) -> Result<(), Error> {
    if *caller == entry.payee {
        return Ok(());
    }
    rbac::require(env, caller, Role::RegistryAdmin)
}

/// Open-amount entries carry no price and no stock.
fn validate_pricing(unit_price: i128, quantity: Option<u32>) -> Result<(), Error> {
    if unit_price < 0 {
        return Err(Error::InvalidAmount);
    }
    if unit_price == 0 && quantity.is_some() {
        return Err(Error::EntryNotPriced);
    }
    Ok(())
}
