//! Assembles a complete, signed user operation for an account that may not
//! exist on chain yet. Sender resolution goes through the entry point's
//! revert-based lookup and follows the same polling discipline as the
//! deterministic deployer, because the chain state the lookup depends on may
//! not be settled yet.

use ethers::{
    abi::AbiEncode,
    providers::Middleware,
    types::{Address, BlockNumber, Bytes, TransactionRequest, U256},
};
use opcast_contracts::{
    gen::{account_factory_api::CreateAccountCall, simple_account_api::ExecuteCall},
    EntryPoint, SimpleAccountAPI,
};
use opcast_primitives::{
    constants::{gas, polling},
    SignedUserOperation, UserOperation, Wallet,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

/// User operation assembly errors
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The expected-revert sender lookup never produced an address within
    /// the retry budget
    #[error("sender resolution failed after {attempts} attempts: {inner}")]
    SenderResolution {
        /// Attempts made before giving up
        attempts: u64,
        /// The last error observed
        inner: String,
    },

    /// Gas estimation reverted; the operation must not be submitted with a
    /// guessed gas limit
    #[error("gas estimation failed: {inner}")]
    Estimation {
        /// The inner error message
        inner: String,
    },

    /// Provider error outside the polling loop
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },

    /// Signing failed
    #[error("signing failed: {inner}")]
    Signing {
        /// The inner error message
        inner: String,
    },
}

/// Builder configuration, passed in explicitly instead of read from ambient
/// state
#[derive(Clone, Debug)]
pub struct BuilderConfig {
    /// Entry point contract address
    pub entry_point: Address,
    /// Account factory contract address
    pub account_factory: Address,
    /// Chain id the signature is bound to
    pub chain_id: U256,
    /// Fixed backoff between sender resolution attempts
    pub poll_interval: Duration,
    /// Attempts before sender resolution gives up
    pub max_attempts: u64,
    /// Fixed margin added on top of the account creation gas
    pub verification_gas_buffer: U256,
    /// Gas paid to the bundler for pre-verification work
    pub pre_verification_gas: U256,
    /// Fee per gas used when the network reports no EIP-1559 fee data
    pub default_fee_per_gas: U256,
}

impl BuilderConfig {
    pub fn new(entry_point: Address, account_factory: Address, chain_id: U256) -> Self {
        Self {
            entry_point,
            account_factory,
            chain_id,
            poll_interval: Duration::from_secs(polling::POLL_INTERVAL),
            max_attempts: polling::MAX_ATTEMPTS,
            verification_gas_buffer: gas::VERIFICATION_GAS_BUFFER.into(),
            pre_verification_gas: gas::PRE_VERIFICATION_GAS.into(),
            default_fee_per_gas: gas::DEFAULT_FEE_PER_GAS.into(),
        }
    }
}

/// The call the account should execute on behalf of its owner
#[derive(Clone, Debug)]
pub struct ExecuteArgs {
    pub dest: Address,
    pub value: U256,
    pub func: Bytes,
}

/// Calldata for `createAccount(owner, index)` on the account factory
pub fn create_account_calldata(owner: Address, index: U256) -> Bytes {
    CreateAccountCall { owner, salt: index }.encode().into()
}

/// Init code: the factory address concatenated with the creation calldata
pub fn account_init_code(factory: Address, calldata: &Bytes) -> Bytes {
    [factory.as_bytes().to_vec(), calldata.to_vec()].concat().into()
}

/// Calldata for `execute(dest, value, func)` on the account contract
pub fn execute_calldata(args: &ExecuteArgs) -> Bytes {
    ExecuteCall { dest: args.dest, value: args.value, func: args.func.clone() }.encode().into()
}

/// Nonce and init code for the operation given the account's deployment
/// state: a counterfactual account deploys itself with the first operation,
/// a deployed account must not carry init code again
pub fn apply_deployment_state(
    deployed: bool,
    on_chain_nonce: U256,
    init_code: Bytes,
) -> (U256, Bytes) {
    if deployed {
        (on_chain_nonce, Bytes::default())
    } else {
        (U256::zero(), init_code)
    }
}

/// Builds one user operation end to end: sender derivation, deployment
/// state, gas and fee computation, canonical hash, signature
pub struct UserOperationBuilder<M: Middleware + 'static> {
    eth_client: Arc<M>,
    entry_point: EntryPoint<M>,
    config: BuilderConfig,
}

impl<M: Middleware + 'static> UserOperationBuilder<M> {
    pub fn new(eth_client: Arc<M>, config: BuilderConfig) -> Self {
        let entry_point = EntryPoint::new(eth_client.clone(), config.entry_point);
        Self { eth_client, entry_point, config }
    }

    pub fn entry_point(&self) -> &EntryPoint<M> {
        &self.entry_point
    }

    /// Resolves the sender address for the given init code through the entry
    /// point's expected revert, retrying with fixed backoff until the revert
    /// carries an address
    pub async fn resolve_sender(&self, init_code: &Bytes) -> Result<Address, BuilderError> {
        let mut last_err = String::new();

        for attempt in 1..=self.config.max_attempts {
            match self.entry_point.get_sender_address(init_code.clone()).await {
                Ok(sender) => {
                    info!(target: "opcast::builder", ?sender, attempt, "sender resolved");
                    return Ok(sender);
                }
                Err(e) => {
                    last_err = e.to_string();
                    warn!(
                        target: "opcast::builder",
                        attempt,
                        error = %snippet(&last_err),
                        "sender resolution attempt failed"
                    );
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(BuilderError::SenderResolution {
            attempts: self.config.max_attempts,
            inner: last_err,
        })
    }

    /// Fresh deployment state read: `(deployed, on-chain nonce)`. The nonce
    /// is only meaningful when the account is deployed.
    async fn deployment_state(&self, sender: Address) -> Result<(bool, U256), BuilderError> {
        let code = self
            .eth_client
            .get_code(sender, None)
            .await
            .map_err(|e| BuilderError::Provider { inner: e.to_string() })?;

        if code.is_empty() {
            return Ok((false, U256::zero()));
        }

        let account = SimpleAccountAPI::new(sender, self.eth_client.clone());
        let nonce = account
            .nonce()
            .call()
            .await
            .map_err(|e| BuilderError::Provider { inner: e.to_string() })?;
        Ok((true, nonce))
    }

    async fn estimate_gas(
        &self,
        from: Option<Address>,
        to: Address,
        data: Bytes,
    ) -> Result<U256, BuilderError> {
        let mut tx = TransactionRequest::new().to(to).data(data);
        if let Some(from) = from {
            tx = tx.from(from);
        }
        self.eth_client
            .estimate_gas(&tx.into(), None)
            .await
            .map_err(|e| BuilderError::Estimation { inner: e.to_string() })
    }

    /// Current fee data. The configured default applies only when the fee
    /// market is not active on this network (no base fee in the latest
    /// block); transport failures propagate instead of being papered over
    /// with a guessed fee.
    async fn fees(&self) -> Result<(U256, U256), BuilderError> {
        let base_fee = self
            .eth_client
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| BuilderError::Provider { inner: e.to_string() })?
            .and_then(|block| block.base_fee_per_gas);

        if base_fee.is_none() {
            info!(target: "opcast::builder", "fee market not active, using default fee");
            return Ok((self.config.default_fee_per_gas, self.config.default_fee_per_gas));
        }

        self.eth_client
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| BuilderError::Provider { inner: e.to_string() })
    }

    /// Runs the assembly pipeline for an already-resolved sender and returns
    /// the signed, frozen operation. `sender` must come from
    /// [`resolve_sender`](Self::resolve_sender) for the same owner and
    /// index; resolution is not repeated here.
    pub async fn build(
        &self,
        owner: &Wallet,
        sender: Address,
        execute: ExecuteArgs,
        index: U256,
    ) -> Result<SignedUserOperation, BuilderError> {
        let factory_calldata = create_account_calldata(owner.address(), index);
        let full_init_code = account_init_code(self.config.account_factory, &factory_calldata);

        let (deployed, on_chain_nonce) = self.deployment_state(sender).await?;
        let (nonce, init_code) = apply_deployment_state(deployed, on_chain_nonce, full_init_code);

        // account creation gas only matters while the account is
        // counterfactual
        let init_gas = if deployed {
            U256::zero()
        } else {
            self.estimate_gas(None, self.config.account_factory, factory_calldata).await?
        };

        let call_data = execute_calldata(&execute);
        let call_gas_limit =
            self.estimate_gas(Some(self.config.entry_point), sender, call_data.clone()).await?;

        let (max_fee_per_gas, max_priority_fee_per_gas) = self.fees().await?;

        let uo = UserOperation::default()
            .sender(sender)
            .nonce(nonce)
            .init_code(init_code)
            .call_data(call_data)
            .call_gas_limit(call_gas_limit)
            .verification_gas_limit(self.config.verification_gas_buffer + init_gas)
            .pre_verification_gas(self.config.pre_verification_gas)
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas);

        info!(
            target: "opcast::builder",
            ?sender,
            %nonce,
            %call_gas_limit,
            deployed,
            "user operation assembled"
        );

        let signed = owner
            .sign_user_operation(&uo, &self.config.entry_point, &self.config.chain_id)
            .await
            .map_err(|e| BuilderError::Signing { inner: e.to_string() })?;

        Ok(signed)
    }
}

fn snippet(msg: &str) -> String {
    msg.chars().take(20).collect()
}
