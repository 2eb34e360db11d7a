//! Canonical event types emitted by the escrow ledger contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/escrow_ledger/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A registry entry was created (`ent_new` topic).
    EntryCreated,
    /// A pending entry was approved (`ent_ok` topic).
    EntryApproved,
    /// An entry was repriced or restocked (`ent_upd` topic).
    EntryUpdated,
    /// An entry was flagged removed (`ent_del` topic).
    EntryRemoved,
    /// A ledger record was appended (`rec_new` topic).
    RecordCreated,
    /// A held record was released to its payee (`released` topic).
    RecordReleased,
    /// A held record was refunded to its depositor (`refunded` topic).
    RecordRefunded,
    /// Fulfillment evidence was attached (`proof` topic).
    ProofAttached,
    /// A payee withdrew pending funds (`withdrawn` topic).
    PayoutWithdrawn,
    /// An admin recovered surplus or stray tokens (`recovered` topic).
    TokenRecovered,
    /// A reward was paid from surplus (`reward` topic).
    RewardIssued,
    /// A role was granted or replaced (`role_set` topic).
    RoleSet,
    /// A role was revoked (`role_del` topic).
    RoleDel,
    /// Protocol was paused (`paused` topic).
    ProtocolPaused,
    /// Protocol was unpaused (`unpaused` topic).
    ProtocolUnpaused,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "ent_new" => Self::EntryCreated,
            "ent_ok" => Self::EntryApproved,
            "ent_upd" => Self::EntryUpdated,
            "ent_del" => Self::EntryRemoved,
            "rec_new" => Self::RecordCreated,
            "released" => Self::RecordReleased,
            "refunded" => Self::RecordRefunded,
            "proof" => Self::ProofAttached,
            "withdrawn" => Self::PayoutWithdrawn,
            "recovered" => Self::TokenRecovered,
            "reward" => Self::RewardIssued,
            "role_set" => Self::RoleSet,
            "role_del" => Self::RoleDel,
            "paused" => Self::ProtocolPaused,
            "unpaused" => Self::ProtocolUnpaused,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryCreated => "entry_created",
            Self::EntryApproved => "entry_approved",
            Self::EntryUpdated => "entry_updated",
            Self::EntryRemoved => "entry_removed",
            Self::RecordCreated => "record_created",
            Self::RecordReleased => "record_released",
            Self::RecordRefunded => "record_refunded",
            Self::ProofAttached => "proof_attached",
            Self::PayoutWithdrawn => "payout_withdrawn",
            Self::TokenRecovered => "token_recovered",
            Self::RewardIssued => "reward_issued",
            Self::RoleSet => "role_set",
            Self::RoleDel => "role_del",
            Self::ProtocolPaused => "protocol_paused",
            Self::ProtocolUnpaused => "protocol_unpaused",
            Self::Unknown => "unknown",
        }
    }

    /// Events whose second topic is a registry key.
    pub fn is_entry_event(&self) -> bool {
        matches!(
            self,
            Self::EntryCreated | Self::EntryApproved | Self::EntryUpdated | Self::EntryRemoved
        )
    }

    /// Events whose second topic is a record id.
    pub fn is_record_event(&self) -> bool {
        matches!(
            self,
            Self::RecordCreated
                | Self::RecordReleased
                | Self::RecordRefunded
                | Self::ProofAttached
                | Self::RewardIssued
        )
    }

    pub const ENTRY_TYPES: [&'static str; 4] = [
        "entry_created",
        "entry_approved",
        "entry_updated",
        "entry_removed",
    ];

    pub const RECORD_TYPES: [&'static str; 5] = [
        "record_created",
        "record_released",
        "record_refunded",
        "proof_attached",
        "reward_issued",
    ];
}

/// A fully decoded contract event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub event_type: String,
    /// Second topic: registry key, record id or address, depending on the kind.
    pub subject: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Registry key a record event belongs to, when the payload names one.
    pub entry_key: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub subject: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub entry_key: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
