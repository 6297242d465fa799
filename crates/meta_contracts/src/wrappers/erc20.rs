use crate::bindings::ERC20;
use ethers::{contract::ContractCall, prelude::*};
use std::sync::Arc;

pub struct Erc20Wrapper<M> {
    pub token_contract: ERC20<M>,
    pub client: Arc<M>,
    decimals: Option<u8>,
    symbol: Option<String>,
}

impl<M: Middleware> Erc20Wrapper<M> {
    pub fn new(token_address: Address, client: Arc<M>) -> Self {
        let token_contract = ERC20::new(token_address, client.clone());
        Erc20Wrapper { token_contract, client, decimals: None, symbol: None }
    }

    pub fn address(&self) -> Address {
        self.token_contract.address()
    }

    pub async fn get_or_fetch_decimals(&mut self) -> Result<u8, ContractError<M>> {
        match self.decimals {
            Some(num) => Ok(num),
            None => {
                let decimal_num = self.token_contract.decimals().call().await?;
                self.decimals = Some(decimal_num);
                Ok(decimal_num)
            }
        }
    }

    pub async fn get_or_fetch_symbol(&mut self) -> Result<String, ContractError<M>> {
        if let Some(symbol) = &self.symbol {
            return Ok(symbol.clone());
        }
        let symbol = self.token_contract.symbol().call().await?;
        self.symbol = Some(symbol.clone());
        Ok(symbol)
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ContractError<M>> {
        self.token_contract.balance_of(owner).call().await
    }

    /// Unsent `approve` transaction; the caller decides how to submit and confirm it.
    pub fn approve(&self, spender: Address, amount: U256) -> ContractCall<M, bool> {
        self.token_contract.approve(spender, amount)
    }
}
