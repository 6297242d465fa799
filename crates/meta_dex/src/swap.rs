use crate::{error::DexError, MeasurementSession, Venue};
use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::ContractCall,
    prelude::*,
};
use meta_alchemy::{errors::SessionError, oracle::read_reference_price, ChainSession, SessionClient};
use meta_common::constants::is_native;
use meta_contracts::wrappers::{Erc20Wrapper, ExchangeWrapper};
use meta_util::FixedPoint;
use tracing::debug;

/// Sends a transaction and waits for a successful receipt.
async fn submit<D>(call: ContractCall<SessionClient, D>) -> Result<TransactionReceipt, DexError>
where
    D: Detokenize + Send + Sync,
{
    let pending = call.send().await?;
    let tx_hash = pending.tx_hash();
    let receipt = pending.await?.ok_or(DexError::Dropped(tx_hash))?;
    if receipt.status == Some(U64::zero()) {
        return Err(DexError::Reverted(tx_hash));
    }
    Ok(receipt)
}

/// Native spent on gas by a mined transaction.
fn gas_cost(receipt: &TransactionReceipt) -> Result<U256, DexError> {
    let gas_used = receipt.gas_used.unwrap_or_default();
    let gas_price = receipt.effective_gas_price.unwrap_or_default();
    gas_used.checked_mul(gas_price).ok_or(DexError::Overflow)
}

/// Native received by the signer: balance change with the gas paid added back.
fn native_received(before: U256, after: U256, gas_cost: U256) -> Result<U256, DexError> {
    after
        .checked_add(gas_cost)
        .and_then(|gross| gross.checked_sub(before))
        .ok_or(DexError::BalanceUnderflow { before, after })
}

fn token_received(before: U256, after: U256, decimals: u8) -> Result<FixedPoint, DexError> {
    let received =
        after.checked_sub(before).ok_or(DexError::BalanceUnderflow { before, after })?;
    FixedPoint::from_raw(received, decimals as u32).ok_or(DexError::Overflow)
}

fn bound_exchange(session: &ChainSession) -> Result<ExchangeWrapper<SessionClient>, SessionError> {
    let profile = session.profile().ok_or(SessionError::NotBound)?;
    Ok(ExchangeWrapper::new(profile.exchange, session.client()))
}

/// Runs `call` and measures how much of `token` it credited to the signer.
async fn swap_into_token(
    session: &ChainSession,
    call: ContractCall<SessionClient, U256>,
    token: Address,
) -> Result<FixedPoint, DexError> {
    let signer = session.signer();
    let mut output = Erc20Wrapper::new(token, session.client());
    let before = output.balance_of(signer).await?;
    submit(call).await?;
    let after = output.balance_of(signer).await?;
    let decimals = output.get_or_fetch_decimals().await?;
    token_received(before, after, decimals)
}

#[async_trait]
impl Venue for ChainSession {
    type Error = DexError;

    async fn swap(&mut self, from: Address, to: Address, amount: U256) -> Result<FixedPoint, DexError> {
        let exchange = bound_exchange(self)?;
        let call = exchange.exchange(from, to, amount);

        if is_native(&from) {
            return swap_into_token(self, call, to).await;
        }

        let input = Erc20Wrapper::new(from, self.client());
        submit(input.approve(exchange.address(), amount)).await?;

        if !is_native(&to) {
            return swap_into_token(self, call, to).await;
        }

        let signer = self.signer();
        let before = self.provider().get_balance(signer, None).await?;
        let receipt = submit(call).await?;
        let after = self.provider().get_balance(signer, None).await?;
        let cost = gas_cost(&receipt)?;
        debug!("native leg gas cost {} wei", cost);
        let received = native_received(before, after, cost)?;
        FixedPoint::from_wei(received).ok_or(DexError::Overflow)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, DexError> {
        let balance = Erc20Wrapper::new(token, self.client()).balance_of(self.signer()).await?;
        Ok(balance)
    }

    async fn reference_price(&self) -> Result<FixedPoint, DexError> {
        let feed = self.profile().ok_or(SessionError::NotBound)?.price_feed;
        Ok(read_reference_price(self.client(), feed).await?)
    }
}

#[async_trait]
impl MeasurementSession for ChainSession {
    async fn reset_to_network(&mut self, name: &str) -> Result<String, DexError> {
        let profile = ChainSession::reset_to_network(self, name).await?;
        Ok(profile.network.to_string())
    }

    async fn refresh(&mut self) -> Result<(), DexError> {
        Ok(ChainSession::refresh(self).await?)
    }

    fn base_amount(&self) -> Option<U256> {
        self.profile().map(|p| p.base_amount)
    }

    async fn route_length(&self, token: Address) -> Result<usize, DexError> {
        let wrapped_native = self.profile().ok_or(SessionError::NotBound)?.wrapped_native;
        Ok(bound_exchange(self)?.route_length(wrapped_native, token).await?)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, DexError> {
        Ok(Erc20Wrapper::new(token, self.client()).get_or_fetch_symbol().await?)
    }
}
