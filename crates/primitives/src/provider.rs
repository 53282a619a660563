//! Utils for creating ethers providers

use ethers::providers::{Http, Middleware, Provider};
use std::time::Duration;

/// Local development chain id; polled faster than public networks
const DEV_CHAIN_ID: u64 = 1337;

/// Creates ethers provider with HTTP connection
pub async fn create_http_provider(addr: &str) -> eyre::Result<Provider<Http>> {
    let provider = Provider::<Http>::try_from(addr)?;

    let chain_id = provider.get_chainid().await?;

    Ok(provider.interval(if chain_id == DEV_CHAIN_ID.into() {
        Duration::from_millis(5u64)
    } else {
        Duration::from_millis(500u64)
    }))
}
