//! Deterministic (CREATE2) deployment through the well-known deployment
//! proxy. The proxy's own "already deployed" signals are unreliable right
//! after a deployment, so code-at-address is the only terminal signal; send
//! failures merely feed the polling loop.

use ethers::{
    abi::Token,
    providers::Middleware,
    types::{Address, Bytes, TransactionRequest, H256},
    utils::{get_create2_address, hex},
};
use lazy_static::lazy_static;
use opcast_primitives::constants::{deterministic_deployer::PROXY_ADDRESS, polling};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

lazy_static! {
    /// The deployment proxy, placed at the same address on every network
    pub static ref DEPLOYMENT_PROXY: Address =
        PROXY_ADDRESS.parse().expect("well-known proxy address is valid");
}

/// Deterministic deployment errors
#[derive(Debug, Error)]
pub enum DeployerError {
    /// Malformed byte input (odd length, non-hex)
    #[error("encoding error: {inner}")]
    Encoding {
        /// The inner error message
        inner: String,
    },

    /// Provider error outside the polling loop
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },

    /// Code never appeared at the derived address within the retry budget
    #[error("no code at {address} after {attempts} attempts")]
    PollTimeout {
        /// The derived deployment address
        address: Address,
        /// Attempts made before giving up
        attempts: u64,
    },
}

/// Deployment configuration, passed in explicitly so runs against a mocked
/// chain stay deterministic
#[derive(Clone, Debug)]
pub struct DeployerConfig {
    /// CREATE2 salt
    pub salt: H256,
    /// Fixed backoff between polling attempts
    pub poll_interval: Duration,
    /// Attempts before the deployment loop gives up
    pub max_attempts: u64,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            salt: H256::zero(),
            poll_interval: Duration::from_secs(polling::POLL_INTERVAL),
            max_attempts: polling::MAX_ATTEMPTS,
        }
    }
}

/// Deploys bytecode through the deployment proxy and polls until the code is
/// observably present at the derived address
pub struct DeterministicDeployer<M: Middleware + 'static> {
    eth_client: Arc<M>,
    config: DeployerConfig,
}

/// Parses hex-encoded creation bytecode (with or without the `0x` prefix)
pub fn parse_bytecode(s: &str) -> Result<Bytes, DeployerError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes =
        hex::decode(s).map_err(|e| DeployerError::Encoding { inner: e.to_string() })?;
    Ok(bytes.into())
}

/// Assembles init code from creation bytecode and ABI-encoded constructor
/// arguments
pub fn assemble_init_code(bytecode: &Bytes, ctor_args: &[Token]) -> Bytes {
    if ctor_args.is_empty() {
        return bytecode.clone();
    }
    [bytecode.to_vec(), ethers::abi::encode(ctor_args)].concat().into()
}

impl<M: Middleware + 'static> DeterministicDeployer<M> {
    pub fn new(eth_client: Arc<M>, config: DeployerConfig) -> Self {
        Self { eth_client, config }
    }

    /// The deterministic deployment address for the given init code. Pure
    /// CREATE2 derivation, no network access.
    pub fn derive_address(&self, init_code: &Bytes) -> Address {
        get_create2_address(*DEPLOYMENT_PROXY, self.config.salt.as_bytes(), init_code)
    }

    /// Whether code is present at the address. Always a fresh query, never
    /// cached.
    pub async fn is_deployed(&self, address: Address) -> Result<bool, DeployerError> {
        let code = self
            .eth_client
            .get_code(address, None)
            .await
            .map_err(|e| DeployerError::Provider { inner: e.to_string() })?;
        Ok(!code.is_empty())
    }

    /// Deploys the init code through the proxy and returns the derived
    /// address once code is present there. Idempotent: if the code is
    /// already present the send is skipped entirely, and re-sending the same
    /// deployment transaction is a chain-level no-op.
    pub async fn deploy(&self, init_code: Bytes) -> Result<Address, DeployerError> {
        let address = self.derive_address(&init_code);

        // code-at-address is the only terminal signal, so a failed initial
        // read feeds the loop instead of aborting
        match self.is_deployed(address).await {
            Ok(true) => {
                info!(target: "opcast::deployer", ?address, "contract already deployed");
                return Ok(address);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(target: "opcast::deployer", error = %snippet(&e.to_string()), "code query failed");
            }
        }

        // salt ++ init code, sent straight to the proxy
        let data: Bytes =
            [self.config.salt.as_bytes().to_vec(), init_code.to_vec()].concat().into();
        let tx = TransactionRequest::new().to(*DEPLOYMENT_PROXY).data(data);

        let mut attempts: u64 = 0;
        loop {
            if attempts >= self.config.max_attempts {
                return Err(DeployerError::PollTimeout { address, attempts });
            }
            attempts += 1;

            info!(target: "opcast::deployer", ?address, attempts, "deploying deterministically");

            // Send failures are hints, not verdicts: the deployment may have
            // succeeded already or may land via a racing deployer.
            match self.eth_client.send_transaction(tx.clone(), None).await {
                Ok(pending) => {
                    if let Err(e) = pending.await {
                        warn!(target: "opcast::deployer", error = %snippet(&e.to_string()), "deployment tx not confirmed");
                    }
                }
                Err(e) => {
                    warn!(target: "opcast::deployer", error = %snippet(&e.to_string()), "deployment tx rejected");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;

            // transient read failures feed the loop like an empty code read
            match self.is_deployed(address).await {
                Ok(true) => {
                    info!(target: "opcast::deployer", ?address, "contract deployed deterministically");
                    return Ok(address);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(target: "opcast::deployer", error = %snippet(&e.to_string()), "code query failed");
                }
            }
        }
    }
}

/// First characters of an error message, enough to recognize the failure in
/// polling logs without flooding them
fn snippet(msg: &str) -> String {
    msg.chars().take(20).collect()
}
