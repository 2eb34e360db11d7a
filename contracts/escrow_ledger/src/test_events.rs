extern crate std;

use soroban_sdk::{symbol_short, testutils::Events, vec, Address, IntoVal, String, TryIntoVal, Val};

use crate::events::{
    EntryCreated, PayoutWithdrawn, ProofAttached, RecordCreated, RecordRefunded, RecordReleased,
    RewardIssued,
};
use crate::test_utils::TestContext;
use crate::{EntryState, RecordKind, RecordStatus, Role};

fn last_event(ctx: &TestContext) -> (Address, soroban_sdk::Vec<Val>, Val) {
    let all_events = ctx.env.events().all();
    all_events.last().expect("No events found")
}

#[test]
fn test_entry_created_event() {
    let ctx = TestContext::new();
    let vendor = ctx.generate_address();
    ctx.product("lamp", &vendor, 12, 3);

    let (contract, topics, data) = last_event(&ctx);
    assert_eq!(contract, ctx.client.address);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("ent_new").into_val(&ctx.env),
            ctx.key("lamp").into_val(&ctx.env),
        ]
    );

    let event_data: EntryCreated = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        EntryCreated {
            key: ctx.key("lamp"),
            payee: vendor,
            state: EntryState::Active,
            unit_price: 12,
            quantity: Some(3),
        }
    );
}

#[test]
fn test_record_created_event() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let donor = ctx.funded_account(75);
    ctx.campaign("relief", &payee);

    let id = ctx.client.deposit(&donor, &ctx.key("relief"), &75);

    let (contract, topics, data) = last_event(&ctx);
    assert_eq!(contract, ctx.client.address);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("rec_new").into_val(&ctx.env),
            id.into_val(&ctx.env),
        ]
    );

    let event_data: RecordCreated = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        RecordCreated {
            record_id: id,
            kind: RecordKind::Deposit,
            depositor: donor,
            registry_key: Some(ctx.key("relief")),
            payee,
            amount: 75,
            status: RecordStatus::Held,
        }
    );
}

#[test]
fn test_release_and_refund_events() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let donor = ctx.funded_account(30);
    ctx.campaign("relief", &payee);
    let first = ctx.client.deposit(&donor, &ctx.key("relief"), &10);
    let second = ctx.client.deposit(&donor, &ctx.key("relief"), &20);

    ctx.client.release(&ctx.disburser, &first);
    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("released").into_val(&ctx.env),
            first.into_val(&ctx.env),
        ]
    );
    let released: RecordReleased = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        released,
        RecordReleased {
            record_id: first,
            payee: payee.clone(),
            amount: 10,
            by: ctx.disburser.clone(),
        }
    );

    ctx.client.refund(&ctx.refunder, &second);
    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("refunded").into_val(&ctx.env),
            second.into_val(&ctx.env),
        ]
    );
    let refunded: RecordRefunded = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        refunded,
        RecordRefunded {
            record_id: second,
            depositor: donor,
            amount: 20,
            by: ctx.refunder.clone(),
        }
    );
}

#[test]
fn test_proof_attached_event() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let donor = ctx.funded_account(5);
    ctx.campaign("relief", &payee);
    let id = ctx.client.deposit(&donor, &ctx.key("relief"), &5);
    let proof = String::from_str(&ctx.env, "QmDeliveryReceipt");

    ctx.client.attach_proof(&payee, &id, &proof);

    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("proof").into_val(&ctx.env),
            id.into_val(&ctx.env),
        ]
    );
    let event_data: ProofAttached = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        ProofAttached {
            record_id: id,
            by: payee,
            proof,
        }
    );
}

#[test]
fn test_payout_withdrawn_event() {
    let ctx = TestContext::new();
    let payee = ctx.generate_address();
    let wallet = ctx.generate_address();
    let donor = ctx.funded_account(90);
    ctx.campaign("relief", &payee);
    let id = ctx.client.deposit(&donor, &ctx.key("relief"), &90);
    ctx.client.release(&ctx.disburser, &id);

    ctx.client.withdraw(&payee, &wallet, &60);

    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("withdrawn").into_val(&ctx.env),
            payee.into_val(&ctx.env),
        ]
    );
    let event_data: PayoutWithdrawn = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        PayoutWithdrawn {
            payee: payee.clone(),
            destination: wallet,
            amount: 60,
            remaining: 30,
        }
    );
}

#[test]
fn test_reward_issued_event() {
    let ctx = TestContext::new();
    let volunteer = ctx.generate_address();
    ctx.sac.mint(&ctx.client.address, &100);
    ctx.client.set_reward_rate(&ctx.admin, &1_000);

    let id = ctx.client.issue_reward(&ctx.rewarder, &volunteer, &300);

    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("reward").into_val(&ctx.env),
            id.into_val(&ctx.env),
        ]
    );
    let event_data: RewardIssued = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(
        event_data,
        RewardIssued {
            record_id: id,
            recipient: volunteer,
            base_amount: 300,
            reward: 30,
        }
    );
}

#[test]
fn test_role_set_event() {
    let ctx = TestContext::new();
    let target = ctx.generate_address();
    ctx.client.grant_role(&ctx.admin, &target, &Role::Disburser);

    let (_, topics, data) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("role_set").into_val(&ctx.env),
            target.into_val(&ctx.env),
            Role::Disburser.into_val(&ctx.env),
        ]
    );
    let by: Address = data.try_into_val(&ctx.env).unwrap();
    assert_eq!(by, ctx.admin);
}

#[test]
fn test_pause_event() {
    let ctx = TestContext::new();
    ctx.client.pause(&ctx.admin);

    let (_, topics, _) = last_event(&ctx);
    assert_eq!(
        topics,
        vec![
            &ctx.env,
            symbol_short!("paused").into_val(&ctx.env),
            ctx.admin.into_val(&ctx.env),
        ]
    );
}
