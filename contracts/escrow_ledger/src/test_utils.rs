extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger, LedgerInfo},
    token, Address, Env, Symbol,
};

use crate::{
    EscrowLedger, EscrowLedgerClient, RegistryEntry, RegistryPolicy, Role, Settlement,
};

pub struct TestContext {
    pub env: Env,
    pub client: EscrowLedgerClient<'static>,
    pub admin: Address,
    pub registrar: Address,
    pub disburser: Address,
    pub refunder: Address,
    pub rewarder: Address,
    pub token: token::Client<'static>,
    pub sac: token::StellarAssetClient<'static>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(RegistryPolicy::AdminOnly)
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        let env = Env::default();
        env.mock_all_auths();

        env.ledger().set(LedgerInfo {
            timestamp: 100_000,
            protocol_version: 22,
            sequence_number: 100,
            network_id: [0u8; 32],
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 3_110_400,
        });

        let contract_id = env.register(EscrowLedger, ());
        let client = EscrowLedgerClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        let registrar = Address::generate(&env);
        let disburser = Address::generate(&env);
        let refunder = Address::generate(&env);
        let rewarder = Address::generate(&env);

        let sac_contract = env.register_stellar_asset_contract_v2(admin.clone());
        let token = token::Client::new(&env, &sac_contract.address());
        let sac = token::StellarAssetClient::new(&env, &sac_contract.address());

        client.init(&admin, &token.address, &policy);
        client.grant_role(&admin, &registrar, &Role::RegistryAdmin);
        client.grant_role(&admin, &disburser, &Role::Disburser);
        client.grant_role(&admin, &refunder, &Role::RefundManager);
        client.grant_role(&admin, &rewarder, &Role::RewardManager);

        Self {
            env,
            client,
            admin,
            registrar,
            disburser,
            refunder,
            rewarder,
            token,
            sac,
        }
    }

    pub fn generate_address(&self) -> Address {
        Address::generate(&self.env)
    }

    pub fn key(&self, name: &str) -> Symbol {
        Symbol::new(&self.env, name)
    }

    /// Open-amount escrow entry (donation campaign).
    pub fn campaign(&self, name: &str, payee: &Address) -> RegistryEntry {
        self.client.create_entry(
            &self.registrar,
            &self.key(name),
            payee,
            &Settlement::Escrow,
            &0,
            &None,
        )
    }

    /// Open-amount entry whose deposits go straight to the payee.
    pub fn direct_campaign(&self, name: &str, payee: &Address) -> RegistryEntry {
        self.client.create_entry(
            &self.registrar,
            &self.key(name),
            payee,
            &Settlement::Direct,
            &0,
            &None,
        )
    }

    /// Priced escrow entry with bounded stock.
    pub fn product(&self, name: &str, payee: &Address, price: i128, stock: u32) -> RegistryEntry {
        self.client.create_entry(
            &self.registrar,
            &self.key(name),
            payee,
            &Settlement::Escrow,
            &price,
            &Some(stock),
        )
    }

    /// Fresh account holding `amount` escrow tokens.
    pub fn funded_account(&self, amount: i128) -> Address {
        let account = self.generate_address();
        self.sac.mint(&account, &amount);
        account
    }

    pub fn jump_time(&self, seconds: u64) {
        let mut ledger = self.env.ledger().get();
        ledger.timestamp += seconds;
        ledger.sequence_number += 1;
        self.env.ledger().set(ledger);
    }

    /// Close `count` ledgers at five seconds each.
    pub fn jump_ledgers(&self, count: u32) {
        let mut ledger = self.env.ledger().get();
        ledger.sequence_number += count;
        ledger.timestamp += u64::from(count) * 5;
        self.env.ledger().set(ledger);
    }
}
