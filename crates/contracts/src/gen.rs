use ethers::contract::abigen;

abigen!(
    EntryPointAPI,
    r#"[
        function getSenderAddress(bytes memory initCode) external
        error FailedOp(uint256 opIndex, string reason)
        error SenderAddressResult(address sender)
    ]"#
);

abigen!(
    AccountFactoryAPI,
    r#"[
        function createAccount(address owner, uint256 salt) public returns (address)
    ]"#
);

abigen!(
    SimpleAccountAPI,
    r#"[
        function execute(address dest, uint256 value, bytes calldata func) external
        function nonce() public view returns (uint256)
    ]"#
);
