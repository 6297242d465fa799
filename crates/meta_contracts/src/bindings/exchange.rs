use ethers::contract::abigen;

// `buildRoute` returns an array of route steps whose element layout differs between
// deployments, so it is queried raw (see `ExchangeWrapper::route_length`).
abigen!(
    IExchange,
    r#"[
        function exchange(address from, address to, uint256 amountIn, uint256 minAmountOut) external payable returns (uint256)
    ]"#,
);
