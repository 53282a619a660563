//! Account abstraction (ERC-4337)-related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract (same on every network)
    pub const ADDRESS: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";
    /// Version of the entry point smart contract
    pub const VERSION: &str = "0.6.0";
}

/// Deterministic (CREATE2) deployment proxy
pub mod deterministic_deployer {
    /// Address of the deployment proxy, placed at the same address on every
    /// network by a presigned transaction
    pub const PROXY_ADDRESS: &str = "0x4e59b44847b379578588920cA78FbF26c0B4956C";
    /// The externally-owned account that signed the proxy deployment
    /// transaction; it must hold enough balance before the proxy itself can
    /// be deployed on a fresh network
    pub const PROXY_DEPLOYER: &str = "0x3fAB184622Dc19b6109349B94811493BF2a45362";
}

/// Account factory smart contract
pub mod account_factory {
    /// Address of the simple account factory
    pub const ADDRESS: &str = "0x9406Cc6185a346906296840746125a0E44976454";
}

/// Well-known development accounts
pub mod dev_accounts {
    /// First account of the standard development mnemonic
    pub const DEV_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    /// Private key of the first development account, used as the default
    /// funding signer against a local node
    pub const DEV_ACCOUNT_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    /// Account the bundler signs bundles with in the reference setup
    pub const BUNDLER_ACCOUNT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
}

/// Gas and fee defaults for user operation construction
pub mod gas {
    /// Fixed margin added on top of the account creation gas when computing
    /// the verification gas limit
    pub const VERIFICATION_GAS_BUFFER: u64 = 100_000;
    /// Gas paid to the bundler for pre-verification work and calldata
    pub const PRE_VERIFICATION_GAS: u64 = 45_040;
    /// Fee per gas used when the network does not report EIP-1559 fee data
    /// (fee market not active), in wei
    pub const DEFAULT_FEE_PER_GAS: u128 = 100_000_000_000_000_000;
}

/// Polling discipline for deployment confirmation and sender resolution
pub mod polling {
    /// Fixed backoff between polling attempts (in seconds)
    pub const POLL_INTERVAL: u64 = 5;
    /// Attempts before a polling loop gives up
    pub const MAX_ATTEMPTS: u64 = 60;
}

/// Funding
pub mod funding {
    /// Minimum balance each participating account is topped up to (1 ether,
    /// in wei)
    pub const MIN_BALANCE: u128 = 1_000_000_000_000_000_000;
}
