use crate::bindings::IExchange;
use ethers::{
    abi::{self, Token},
    contract::ContractCall,
    prelude::*,
    types::transaction::eip2718::TypedTransaction,
    utils::id,
};
use meta_common::constants::{is_native, NATIVE_ASSET, SWAP_GAS_LIMIT};
use std::sync::Arc;

const WORD: usize = 32;

pub struct ExchangeWrapper<M> {
    pub exchange_contract: IExchange<M>,
    pub client: Arc<M>,
}

impl<M: Middleware> ExchangeWrapper<M> {
    pub fn new(exchange_address: Address, client: Arc<M>) -> Self {
        let exchange_contract = IExchange::new(exchange_address, client.clone());
        ExchangeWrapper { exchange_contract, client }
    }

    pub fn address(&self) -> Address {
        self.exchange_contract.address()
    }

    /// Unsent swap of `amount_in` from `from` to `to` with no slippage bound.
    ///
    /// Native input is always passed as the sentinel address and attached as call value.
    pub fn exchange(&self, from: Address, to: Address, amount_in: U256) -> ContractCall<M, U256> {
        let (from, to) = (normalize(from), normalize(to));
        let call = self
            .exchange_contract
            .exchange(from, to, amount_in, U256::zero())
            .gas(SWAP_GAS_LIMIT);
        if is_native(&from) {
            call.value(amount_in)
        } else {
            call
        }
    }

    /// Number of hops the exchange would route `from -> to` through.
    pub async fn route_length(&self, from: Address, to: Address) -> Result<usize, ContractError<M>> {
        let mut data = id("buildRoute(address,address)").to_vec();
        data.extend(abi::encode(&[Token::Address(from), Token::Address(to)]));
        let tx: TypedTransaction =
            TransactionRequest::new().to(self.address()).data(Bytes::from(data)).into();

        let raw = self.client.call(&tx, None).await.map_err(ContractError::from_middleware_error)?;
        dynamic_array_length(&raw).ok_or(ContractError::DecodingError(abi::Error::InvalidData))
    }
}

fn normalize(asset: Address) -> Address {
    if is_native(&asset) {
        NATIVE_ASSET
    } else {
        asset
    }
}

/// Length of a dynamic array returned as the only value of an ABI encoded payload.
pub fn dynamic_array_length(raw: &[u8]) -> Option<usize> {
    let offset = read_word(raw, 0)?;
    let length = read_word(raw, offset)?;
    // every element occupies at least one word
    let payload = raw.len().checked_sub(offset + WORD)?;
    (length.checked_mul(WORD)? <= payload).then_some(length)
}

fn read_word(raw: &[u8], at: usize) -> Option<usize> {
    let word = raw.get(at..at.checked_add(WORD)?)?;
    let value = U256::from_big_endian(word);
    if value > U256::from(usize::MAX) {
        return None;
    }
    Some(value.as_usize())
}
