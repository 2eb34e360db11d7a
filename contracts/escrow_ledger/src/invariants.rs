#![allow(dead_code)]

extern crate std;

use soroban_sdk::Vec;

use crate::types::{LedgerRecord, PayeeAccount, RecordStatus, RegistryEntry};

/// INV-1: No value is created or destroyed for a payee:
/// `held + pending + withdrawn == escrowed - refunded`.
pub fn assert_conservation(account: &PayeeAccount) {
    assert_eq!(
        account.held + account.pending + account.withdrawn,
        account.escrowed - account.refunded,
        "INV-1 violated: held {} + pending {} + withdrawn {} != escrowed {} - refunded {}",
        account.held,
        account.pending,
        account.withdrawn,
        account.escrowed,
        account.refunded
    );
}

/// INV-2: Every running total of a payee account is non-negative.
pub fn assert_account_non_negative(account: &PayeeAccount) {
    for (name, value) in [
        ("escrowed", account.escrowed),
        ("held", account.held),
        ("pending", account.pending),
        ("withdrawn", account.withdrawn),
        ("refunded", account.refunded),
        ("settled", account.settled),
    ] {
        assert!(value >= 0, "INV-2 violated: {name} is negative ({value})");
    }
}

/// INV-3: Record ids are sequential from `first_id` and timestamps never decrease.
pub fn assert_monotonic_records(records: &Vec<LedgerRecord>, first_id: u64) {
    let mut previous: Option<LedgerRecord> = None;
    for (i, record) in records.iter().enumerate() {
        assert_eq!(
            record.id,
            first_id + i as u64,
            "INV-3 violated: expected id {}, got {}",
            first_id + i as u64,
            record.id
        );
        if let Some(prev) = &previous {
            assert!(
                prev.timestamp <= record.timestamp,
                "INV-3 violated: record {} is older than record {}",
                record.id,
                prev.id
            );
        }
        previous = Some(record);
    }
}

/// INV-4: Status transition validity. Only `Held` may move, and only to a
/// terminal status.
pub fn assert_valid_status_transition(from: &RecordStatus, to: &RecordStatus) {
    let valid = matches!(
        (from, to),
        (RecordStatus::Held, RecordStatus::Released) | (RecordStatus::Held, RecordStatus::Refunded)
    );
    assert!(
        valid,
        "INV-4 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-5: Fields fixed at creation never change on a record.
pub fn assert_record_immutable_fields(original: &LedgerRecord, current: &LedgerRecord) {
    assert_eq!(original.id, current.id, "INV-5 violated: record id changed");
    assert_eq!(
        original.depositor, current.depositor,
        "INV-5 violated: record depositor changed"
    );
    assert_eq!(
        original.payee, current.payee,
        "INV-5 violated: record payee changed"
    );
    assert_eq!(
        original.amount, current.amount,
        "INV-5 violated: record amount changed"
    );
    assert_eq!(
        original.registry_key, current.registry_key,
        "INV-5 violated: record registry_key changed"
    );
    assert_eq!(
        original.timestamp, current.timestamp,
        "INV-5 violated: record timestamp changed"
    );
}

/// INV-6: An entry's key and payee binding never changes.
pub fn assert_entry_binding_unchanged(original: &RegistryEntry, current: &RegistryEntry) {
    assert_eq!(original.key, current.key, "INV-6 violated: entry key changed");
    assert_eq!(
        original.payee, current.payee,
        "INV-6 violated: entry payee changed"
    );
}

/// INV-7: The contract always holds at least what it owes.
pub fn assert_reserve_covers_liabilities(balance: i128, liabilities: i128) {
    assert!(
        balance >= liabilities,
        "INV-7 violated: balance {} below liabilities {}",
        balance,
        liabilities
    );
}

/// Run all stateless payee-account invariants.
pub fn assert_all_account_invariants(account: &PayeeAccount) {
    assert_account_non_negative(account);
    assert_conservation(account);
}
