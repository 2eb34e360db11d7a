//! Contract events.
//!
//! Every event is published with topics `(name, subject)` and a
//! `#[contracttype]` payload as data:
//!
//! | Topic 1 | Topic 2 (subject) | Data |
//! |---------|-------------------|------|
//! | `ent_new`, `ent_ok`, `ent_upd`, `ent_del` | entry key | entry payload |
//! | `rec_new`, `released`, `refunded`, `proof`, `reward` | record id | record payload |
//! | `withdrawn` | payee | `PayoutWithdrawn` |
//! | `recovered` | token | `TokenRecovered` |
//! | `role_set` | target, then role as topic 3 | granting address |
//! | `role_del` | target | revoking address |
//! | `paused`, `unpaused` | admin | `()` |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::rbac::Role;
use crate::types::{EntryState, RecordKind, RecordStatus};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryCreated {
    pub key: Symbol,
    pub payee: Address,
    pub state: EntryState,
    pub unit_price: i128,
    pub quantity: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryApproved {
    pub key: Symbol,
    pub approver: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryUpdated {
    pub key: Symbol,
    pub unit_price: i128,
    pub quantity: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryRemoved {
    pub key: Symbol,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordCreated {
    pub record_id: u64,
    pub kind: RecordKind,
    pub depositor: Address,
    pub registry_key: Option<Symbol>,
    pub payee: Address,
    pub amount: i128,
    pub status: RecordStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordReleased {
    pub record_id: u64,
    pub payee: Address,
    pub amount: i128,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordRefunded {
    pub record_id: u64,
    pub depositor: Address,
    pub amount: i128,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofAttached {
    pub record_id: u64,
    pub by: Address,
    pub proof: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutWithdrawn {
    pub payee: Address,
    pub destination: Address,
    pub amount: i128,
    pub remaining: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenRecovered {
    pub token: Address,
    pub destination: Address,
    pub amount: i128,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardIssued {
    pub record_id: u64,
    pub recipient: Address,
    pub base_amount: i128,
    pub reward: i128,
}

pub fn emit_entry_created(
    env: &Env,
    key: Symbol,
    payee: Address,
    state: EntryState,
    unit_price: i128,
    quantity: Option<u32>,
) {
    let topics = (symbol_short!("ent_new"), key.clone());
    let data = EntryCreated {
        key,
        payee,
        state,
        unit_price,
        quantity,
    };
    env.events().publish(topics, data);
}

pub fn emit_entry_approved(env: &Env, key: Symbol, approver: Address) {
    let topics = (symbol_short!("ent_ok"), key.clone());
    env.events().publish(topics, EntryApproved { key, approver });
}

pub fn emit_entry_updated(env: &Env, key: Symbol, unit_price: i128, quantity: Option<u32>) {
    let topics = (symbol_short!("ent_upd"), key.clone());
    let data = EntryUpdated {
        key,
        unit_price,
        quantity,
    };
    env.events().publish(topics, data);
}

pub fn emit_entry_removed(env: &Env, key: Symbol, by: Address) {
    let topics = (symbol_short!("ent_del"), key.clone());
    env.events().publish(topics, EntryRemoved { key, by });
}

pub fn emit_record_created(env: &Env, data: RecordCreated) {
    let topics = (symbol_short!("rec_new"), data.record_id);
    env.events().publish(topics, data);
}

pub fn emit_record_released(env: &Env, record_id: u64, payee: Address, amount: i128, by: Address) {
    let topics = (symbol_short!("released"), record_id);
    let data = RecordReleased {
        record_id,
        payee,
        amount,
        by,
    };
    env.events().publish(topics, data);
}

pub fn emit_record_refunded(
    env: &Env,
    record_id: u64,
    depositor: Address,
    amount: i128,
    by: Address,
) {
    let topics = (symbol_short!("refunded"), record_id);
    let data = RecordRefunded {
        record_id,
        depositor,
        amount,
        by,
    };
    env.events().publish(topics, data);
}

pub fn emit_proof_attached(env: &Env, record_id: u64, by: Address, proof: String) {
    let topics = (symbol_short!("proof"), record_id);
    let data = ProofAttached {
        record_id,
        by,
        proof,
    };
    env.events().publish(topics, data);
}

pub fn emit_payout_withdrawn(
    env: &Env,
    payee: Address,
    destination: Address,
    amount: i128,
    remaining: i128,
) {
    let topics = (symbol_short!("withdrawn"), payee.clone());
    let data = PayoutWithdrawn {
        payee,
        destination,
        amount,
        remaining,
    };
    env.events().publish(topics, data);
}

pub fn emit_token_recovered(
    env: &Env,
    token: Address,
    destination: Address,
    amount: i128,
    by: Address,
) {
    let topics = (symbol_short!("recovered"), token.clone());
    let data = TokenRecovered {
        token,
        destination,
        amount,
        by,
    };
    env.events().publish(topics, data);
}

pub fn emit_reward_issued(
    env: &Env,
    record_id: u64,
    recipient: Address,
    base_amount: i128,
    reward: i128,
) {
    let topics = (symbol_short!("reward"), record_id);
    let data = RewardIssued {
        record_id,
        recipient,
        base_amount,
        reward,
    };
    env.events().publish(topics, data);
}

pub fn emit_role_set(env: &Env, target: Address, role: Role, by: Address) {
    env.events()
        .publish((symbol_short!("role_set"), target, role), by);
}

pub fn emit_role_del(env: &Env, target: Address, by: Address) {
    env.events().publish((symbol_short!("role_del"), target), by);
}

pub fn emit_protocol_paused(env: &Env, admin: Address) {
    env.events().publish((symbol_short!("paused"), admin), ());
}

pub fn emit_protocol_unpaused(env: &Env, admin: Address) {
    env.events().publish((symbol_short!("unpaused"), admin), ());
}
