use crate::utils::{parse_address, parse_duration, parse_u256, validate_private_key};
use clap::Parser;
use ethers::types::{Address, U256};
use opcast_primitives::constants::{deterministic_deployer, dev_accounts, polling};
use std::time::Duration;

/// Ethereum execution client args
#[derive(Debug, Clone, Parser)]
pub struct EthClientArgs {
    /// Ethereum execution client RPC endpoint.
    #[clap(long, default_value = "http://127.0.0.1:8545")]
    pub eth_client_address: String,

    /// Private key of the funding signer.
    ///
    /// By default, the first account of a local development node.
    #[clap(long, default_value = dev_accounts::DEV_ACCOUNT_KEY, value_parser = validate_private_key)]
    pub signer_key: String,
}

/// Funding args
#[derive(Debug, Clone, Parser)]
pub struct FundingArgs {
    /// The minimum balance each participating account is topped up to, in
    /// wei.
    ///
    /// By default, this option is set to 1 ether.
    #[clap(long, default_value = "1000000000000000000", value_parser = parse_u256)]
    pub min_balance: U256,
}

/// Polling args, shared by deployment confirmation and sender resolution
#[derive(Debug, Clone, Parser)]
pub struct PollingArgs {
    /// The interval between polling attempts, in seconds.
    #[clap(long, default_value = "5", value_parser = parse_duration)]
    pub poll_interval: Duration,

    /// The number of attempts before a polling loop gives up.
    #[clap(long, default_value_t = polling::MAX_ATTEMPTS)]
    pub max_attempts: u64,
}

/// Accounts funded before the entry point deployment
#[derive(Debug, Clone, Parser)]
pub struct FundingTargetsArgs {
    /// The account the bundler signs bundles with.
    #[clap(long, default_value = dev_accounts::BUNDLER_ACCOUNT, value_parser = parse_address)]
    pub bundler_account: Address,

    /// The development account.
    #[clap(long, default_value = dev_accounts::DEV_ACCOUNT, value_parser = parse_address)]
    pub dev_account: Address,

    /// The externally-owned account behind the deterministic deployment
    /// proxy; on a fresh network it must hold balance before the proxy
    /// itself can be deployed.
    #[clap(long, default_value = deterministic_deployer::PROXY_DEPLOYER, value_parser = parse_address)]
    pub proxy_deployer: Address,
}
