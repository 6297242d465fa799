use ethers::contract::abigen;

abigen!(
    ERC20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
    ]"#,
);
