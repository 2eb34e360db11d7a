//! # Types
//!
//! Shared data structures used across all modules of the escrow ledger.
//!
//! ## Design decisions
//!
//! ### Header / State split
//!
//! A `LedgerRecord` is internally stored as two separate ledger entries:
//!
//! - [`RecordHeader`] is written once at deposit time; never mutated.
//! - [`RecordState`] is written on release, refund and proof attachment.
//!
//! The public API exposes the reconstructed [`LedgerRecord`] struct.
//!
//! ### Record status as a Finite-State Machine
//!
//! ```text
//! Held ──► Released
//!   └────► Refunded
//! Recorded            (direct settlement, terminal on creation)
//! ```
//!
//! Transitions out of `Released`, `Refunded` and `Recorded` are rejected by
//! the ledger's state guards; the guard itself is the lock.

use soroban_sdk::{contracttype, Address, String, Symbol, Vec};

/// Registry creation policy, fixed at `init`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryPolicy {
    /// Only registry admins create entries; entries start `Active`.
    AdminOnly,
    /// Anyone creates entries; they start `Pending` until approved.
    OpenWithApproval,
}

/// Contract configuration written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Token held in escrow and paid out.
    pub token: Address,
    pub policy: RegistryPolicy,
}

/// Lifecycle of a registry entry.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryState {
    /// Awaiting admin approval; rejects deposits.
    Pending,
    /// Accepting deposits.
    Active,
    /// Retired; history stays readable.
    Removed,
}

/// How value deposited against an entry is settled.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Settlement {
    /// Held by the contract until released or refunded.
    Escrow,
    /// Forwarded to the payee in the same call.
    Direct,
}

/// A named deposit target: campaign, product or content item.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryEntry {
    pub key: Symbol,
    /// Receives released funds. Bound to the key for its whole life.
    pub payee: Address,
    pub state: EntryState,
    pub settlement: Settlement,
    /// Price per unit. `0` marks an open-amount entry (donation campaign).
    pub unit_price: i128,
    /// Remaining stock. `None` means unlimited.
    pub quantity: Option<u32>,
    pub created_at: u64,
}

/// One line of a multi-item order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineItem {
    pub key: Symbol,
    pub quantity: u32,
}

/// The deposit action that produced a record.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    Deposit,
    Order,
    Unlock,
    Reward,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordStatus {
    Held,
    Released,
    Refunded,
    /// Settled atomically at creation; no further transition.
    Recorded,
}

/// Immutable part of a ledger record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordHeader {
    pub id: u64,
    pub kind: RecordKind,
    pub depositor: Address,
    pub registry_key: Option<Symbol>,
    /// Snapshot of the entry payee (or reward recipient) at creation.
    pub payee: Address,
    pub amount: i128,
    pub items: Vec<LineItem>,
    pub timestamp: u64,
}

/// Mutable part of a ledger record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordState {
    pub status: RecordStatus,
    pub proof: Option<String>,
}

/// Full ledger record as returned by queries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerRecord {
    /// Zero-based, assigned in creation order.
    pub id: u64,
    pub kind: RecordKind,
    pub depositor: Address,
    pub registry_key: Option<Symbol>,
    pub payee: Address,
    /// Token base units; for orders the sum over line items.
    pub amount: i128,
    pub items: Vec<LineItem>,
    pub status: RecordStatus,
    /// Fulfillment evidence (content hash or URI). Write-once.
    pub proof: Option<String>,
    pub timestamp: u64,
}

impl LedgerRecord {
    pub fn from_parts(header: RecordHeader, state: RecordState) -> Self {
        LedgerRecord {
            id: header.id,
            kind: header.kind,
            depositor: header.depositor,
            registry_key: header.registry_key,
            payee: header.payee,
            amount: header.amount,
            items: header.items,
            status: state.status,
            proof: state.proof,
            timestamp: header.timestamp,
        }
    }
}

/// Per-payee running totals.
///
/// Conservation: `held + pending + withdrawn == escrowed - refunded`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PayeeAccount {
    /// Total ever escrowed for this payee.
    pub escrowed: i128,
    /// Currently in `Held` records.
    pub held: i128,
    /// Released and awaiting withdrawal.
    pub pending: i128,
    pub withdrawn: i128,
    pub refunded: i128,
    /// Forwarded directly by `Direct` entries; outside the escrow balance.
    pub settled: i128,
}
