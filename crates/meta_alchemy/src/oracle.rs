use ethers::prelude::*;
use meta_contracts::bindings::IChainlinkOracle;
use meta_util::FixedPoint;
use std::sync::Arc;

/// Latest answer of a Chainlink aggregator at the feed's own precision.
pub async fn read_reference_price<M: Middleware>(
    client: Arc<M>,
    feed: Address,
) -> Result<FixedPoint, ContractError<M>> {
    let oracle = IChainlinkOracle::new(feed, client);
    let answer = oracle.latest_answer().call().await?;
    let decimals = oracle.decimals().call().await?;
    Ok(FixedPoint::new(answer, decimals as u32))
}
