extern crate std;

use crate::invariants::assert_entry_binding_unchanged;
use crate::test_utils::TestContext;
use crate::{EntryState, Error, RegistryPolicy, Settlement};

#[test]
fn test_admin_only_entry_starts_active() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let entry = ctx.campaign("food_march", &payee);

    assert_eq!(entry.state, EntryState::Active);
    assert_eq!(entry.payee, payee);
    assert_eq!(entry.created_at, 100_000);
    assert!(ctx.client.is_active(&ctx.key("food_march")));
}

#[test]
fn test_duplicate_key_rejected_in_any_state() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    ctx.campaign("meal_march", &payee);

    let again = ctx.client.try_create_entry(
        &ctx.registrar,
        &ctx.key("meal_march"),
        &payee,
        &Settlement::Escrow,
        &0,
        &None,
    );
    assert_eq!(again, Err(Ok(Error::DuplicateKey)));

    ctx.client.remove_entry(&ctx.registrar, &ctx.key("meal_march"));
    let other = ctx.generate_address();
    let reuse = ctx.client.try_create_entry(
        &ctx.registrar,
        &ctx.key("meal_march"),
        &other,
        &Settlement::Escrow,
        &0,
        &None,
    );
    assert_eq!(reuse, Err(Ok(Error::DuplicateKey)));
    assert_eq!(ctx.client.get_entry(&ctx.key("meal_march")).payee, payee);
}

#[test]
fn test_open_policy_requires_approval() {
    let ctx = TestContext::with_policy(RegistryPolicy::OpenWithApproval);
    let creator = ctx.generate_address();
    let donor = ctx.funded_account(100);

    let entry = ctx.client.create_entry(
        &creator,
        &ctx.key("temple_help"),
        &creator,
        &Settlement::Escrow,
        &0,
        &None,
    );
    assert_eq!(entry.state, EntryState::Pending);
    assert!(!ctx.client.is_active(&ctx.key("temple_help")));
    assert_eq!(
        ctx.client.try_deposit(&donor, &ctx.key("temple_help"), &10),
        Err(Ok(Error::InactiveTarget))
    );

    // The creator cannot approve their own entry.
    assert_eq!(
        ctx.client.try_approve_entry(&creator, &ctx.key("temple_help")),
        Err(Ok(Error::Unauthorized))
    );

    let approved = ctx.client.approve_entry(&ctx.registrar, &ctx.key("temple_help"));
    assert_eq!(approved.state, EntryState::Active);
    ctx.client.deposit(&donor, &ctx.key("temple_help"), &10);

    assert_eq!(
        ctx.client.try_approve_entry(&ctx.registrar, &ctx.key("temple_help")),
        Err(Ok(Error::AlreadyActive))
    );
}

#[test]
fn test_approve_unknown_and_removed_keys() {
    let ctx = TestContext::with_policy(RegistryPolicy::OpenWithApproval);
    let creator = ctx.generate_address();

    assert_eq!(
        ctx.client.try_approve_entry(&ctx.registrar, &ctx.key("missing")),
        Err(Ok(Error::UnknownKey))
    );

    ctx.client.create_entry(
        &creator,
        &ctx.key("pending"),
        &creator,
        &Settlement::Direct,
        &0,
        &None,
    );
    ctx.client.remove_entry(&creator, &ctx.key("pending"));
    assert_eq!(
        ctx.client.try_approve_entry(&ctx.registrar, &ctx.key("pending")),
        Err(Ok(Error::AlreadyRemoved))
    );
}

#[test]
fn test_payee_can_update_and_binding_is_kept() {
    let ctx = TestContext::new();
    let vendor = ctx.generate_address();
    let original = ctx.product("book", &vendor, 100, 5);

    let updated = ctx
        .client
        .update_entry(&vendor, &ctx.key("book"), &150, &Some(10));
    assert_eq!(updated.unit_price, 150);
    assert_eq!(updated.quantity, Some(10));
    assert_entry_binding_unchanged(&original, &updated);
}

#[test]
fn test_stranger_cannot_update_or_remove() {
    let ctx = TestContext::new();
    let vendor = ctx.generate_address();
    let stranger = ctx.generate_address();
    ctx.product("book", &vendor, 100, 5);

    assert_eq!(
        ctx.client
            .try_update_entry(&stranger, &ctx.key("book"), &1, &Some(1)),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        ctx.client.try_remove_entry(&stranger, &ctx.key("book")),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(ctx.client.get_entry(&ctx.key("book")).unit_price, 100);
}

#[test]
fn test_update_and_remove_unknown_key() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.client
            .try_update_entry(&ctx.registrar, &ctx.key("nope"), &1, &None),
        Err(Ok(Error::UnknownKey))
    );
    assert_eq!(
        ctx.client.try_remove_entry(&ctx.registrar, &ctx.key("nope")),
        Err(Ok(Error::UnknownKey))
    );
    assert_eq!(
        ctx.client.try_get_entry(&ctx.key("nope")),
        Err(Ok(Error::UnknownKey))
    );
}

#[test]
fn test_remove_twice_fails_and_history_stays_readable() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let donor = ctx.funded_account(100);
    ctx.campaign("camp", &payee);
    let id = ctx.client.deposit(&donor, &ctx.key("camp"), &25);

    ctx.client.remove_entry(&payee, &ctx.key("camp"));
    assert_eq!(
        ctx.client.try_remove_entry(&payee, &ctx.key("camp")),
        Err(Ok(Error::AlreadyRemoved))
    );
    assert_eq!(
        ctx.client
            .try_update_entry(&payee, &ctx.key("camp"), &0, &None),
        Err(Ok(Error::AlreadyRemoved))
    );

    assert_eq!(
        ctx.client.get_entry(&ctx.key("camp")).state,
        EntryState::Removed
    );
    assert_eq!(ctx.client.get_record(&id).amount, 25);

    // Held value against a removed entry can still settle.
    ctx.client.release(&ctx.disburser, &id);
    assert_eq!(ctx.client.pending_of(&payee), 25);
}

#[test]
fn test_invalid_pricing_rejected() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();

    assert_eq!(
        ctx.client.try_create_entry(
            &ctx.registrar,
            &ctx.key("neg"),
            &payee,
            &Settlement::Escrow,
            &-1,
            &None,
        ),
        Err(Ok(Error::InvalidAmount))
    );
    assert_eq!(
        ctx.client.try_create_entry(
            &ctx.registrar,
            &ctx.key("stocked"),
            &payee,
            &Settlement::Escrow,
            &0,
            &Some(3),
        ),
        Err(Ok(Error::EntryNotPriced))
    );
}
