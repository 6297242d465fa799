use ethers::prelude::{ContractError, ProviderError, TxHash, U256};
use meta_alchemy::{errors::SessionError, SessionClient};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DexError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("contract error: {0}")]
    Contract(#[from] ContractError<SessionClient>),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),
    #[error("transaction {0:?} dropped from the mempool")]
    Dropped(TxHash),
    #[error("native balance went from {before} to {after} beyond the gas spent")]
    BalanceUnderflow { before: U256, after: U256 },
    #[error("amount does not fit a fixed-point quantity")]
    Overflow,
}
