//! Token movement through the fungible-token capability.
//!
//! Every call goes through the `try_` client so a failing transfer surfaces
//! as [`Error::TransferFailed`] and the whole invocation rolls back, instead of
//! trapping with the token contract's own error.

use soroban_sdk::{token, Address, Env};

use crate::Error;

pub fn transfer(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), Error> {
    let client = token::Client::new(env, token);
    match client.try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Pull `amount` from `from` into the contract.
pub fn pull(env: &Env, token: &Address, from: &Address, amount: i128) -> Result<(), Error> {
    transfer(env, token, from, &env.current_contract_address(), amount)
}

/// Push `amount` from the contract to `to`.
pub fn push(env: &Env, token: &Address, to: &Address, amount: i128) -> Result<(), Error> {
    transfer(env, token, &env.current_contract_address(), to, amount)
}

pub fn contract_balance(env: &Env, token: &Address) -> i128 {
    token::Client::new(env, token).balance(&env.current_contract_address())
}
