//! # Role-Based Access Control
//!
//! Every address holds at most one [`Role`]. `SuperAdmin` and `Admin` satisfy
//! every permission-group check; the remaining roles each gate one family of
//! operations:
//!
//! | Role            | Gates                                             |
//! |-----------------|---------------------------------------------------|
//! | `RegistryAdmin` | `create_entry` (admin-only policy), `approve_entry` |
//! | `Disburser`     | `release`                                         |
//! | `RefundManager` | `refund`                                          |
//! | `RewardManager` | `issue_reward`                                    |
//!
//! There is exactly one `SuperAdmin`. It is set by `init`, can only be moved
//! with [`transfer_super_admin`] and can never be revoked.

use soroban_sdk::{contracttype, log, Address, Env};

use crate::events;
use crate::storage;
use crate::Error;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    SuperAdmin,
    Admin,
    RegistryAdmin,
    Disburser,
    RefundManager,
    RewardManager,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum RbacKey {
    SuperAdmin,
    Role(Address),
}

/// Record the first SuperAdmin. Fails once one exists.
pub fn init_super_admin(env: &Env, super_admin: &Address) -> Result<(), Error> {
    if env.storage().instance().has(&RbacKey::SuperAdmin) {
        return Err(Error::AlreadyInitialized);
    }
    env.storage().instance().set(&RbacKey::SuperAdmin, super_admin);
    set_role(env, super_admin, Role::SuperAdmin);
    events::emit_role_set(env, super_admin.clone(), Role::SuperAdmin, super_admin.clone());
    Ok(())
}

pub fn role_of(env: &Env, address: Address) -> Option<Role> {
    let key = RbacKey::Role(address);
    let role = env.storage().persistent().get(&key);
    if role.is_some() {
        storage::bump_persistent(env, &key);
    }
    role
}

pub fn has_role(env: &Env, address: Address, role: Role) -> bool {
    role_of(env, address) == Some(role)
}

/// `true` when `account` may act for `group`.
pub fn authorize(env: &Env, account: &Address, group: Role) -> bool {
    match role_of(env, account.clone()) {
        Some(Role::SuperAdmin) | Some(Role::Admin) => true,
        Some(role) => role == group,
        None => false,
    }
}

/// Fail with `Unauthorized` unless `account` may act for `group`. The
/// rejected caller and group go to the diagnostic log.
pub fn require(env: &Env, account: &Address, group: Role) -> Result<(), Error> {
    if authorize(env, account, group) {
        Ok(())
    } else {
        log!(env, "unauthorized: caller lacks role", account.clone(), group);
        Err(Error::Unauthorized)
    }
}

pub fn require_admin_or_above(env: &Env, account: &Address) -> Result<(), Error> {
    require(env, account, Role::Admin)
}

/// Pass when `caller` is `owner` itself or an admin.
pub fn require_owner_or_admin(env: &Env, caller: &Address, owner: &Address) -> Result<(), Error> {
    if caller == owner {
        return Ok(());
    }
    require_admin_or_above(env, caller)
}

/// Grant `role` to `target`, replacing any role it held.
pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<(), Error> {
    caller.require_auth();
    require_admin_or_above(env, caller)?;

    // SuperAdmin moves only through `transfer_super_admin`, and is never demoted here.
    if role == Role::SuperAdmin || has_role(env, target.clone(), Role::SuperAdmin) {
        return Err(Error::Unauthorized);
    }

    set_role(env, target, role);
    events::emit_role_set(env, target.clone(), role, caller.clone());
    Ok(())
}

pub fn revoke_role(env: &Env, caller: &Address, target: &Address) -> Result<(), Error> {
    caller.require_auth();
    require_admin_or_above(env, caller)?;

    match role_of(env, target.clone()) {
        None => Err(Error::RoleNotFound),
        Some(Role::SuperAdmin) => Err(Error::Unauthorized),
        Some(_) => {
            env.storage()
                .persistent()
                .remove(&RbacKey::Role(target.clone()));
            events::emit_role_del(env, target.clone(), caller.clone());
            Ok(())
        }
    }
}

pub fn transfer_super_admin(
    env: &Env,
    current_super_admin: &Address,
    new_super_admin: &Address,
) -> Result<(), Error> {
    current_super_admin.require_auth();
    if !has_role(env, current_super_admin.clone(), Role::SuperAdmin) {
        return Err(Error::Unauthorized);
    }

    env.storage()
        .persistent()
        .remove(&RbacKey::Role(current_super_admin.clone()));
    env.storage()
        .instance()
        .set(&RbacKey::SuperAdmin, new_super_admin);
    set_role(env, new_super_admin, Role::SuperAdmin);

    events::emit_role_del(env, current_super_admin.clone(), current_super_admin.clone());
    events::emit_role_set(
        env,
        new_super_admin.clone(),
        Role::SuperAdmin,
        current_super_admin.clone(),
    );
    Ok(())
}

fn set_role(env: &Env, target: &Address, role: Role) {
    let key = RbacKey::Role(target.clone());
    env.storage().persistent().set(&key, &role);
    storage::bump_persistent(env, &key);
}
