use ethers::contract::abigen;

abigen!(
    IChainlinkOracle,
    r#"[
        function latestAnswer() external view returns (int256)
        function decimals() external view returns (uint8)
    ]"#,
);
