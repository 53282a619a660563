use super::args::{EthClientArgs, FundingArgs, FundingTargetsArgs, PollingArgs};
use crate::utils::{parse_address, parse_salt, parse_u256, validate_private_key};
use clap::Parser;
use ethers::{
    abi::Token,
    prelude::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, H256, U256},
};
use opcast_builder::{
    account_init_code, create_account_calldata, BuilderConfig, ExecuteArgs, FundingService,
    UserOperationBuilder,
};
use opcast_contracts::{
    assemble_init_code, parse_bytecode, DeployerConfig, DeterministicDeployer,
};
use opcast_primitives::{
    constants::{account_factory, entry_point},
    provider::create_http_provider,
    Wallet,
};
use opcast_relay::BundlerClient;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// Reference owner key for local runs; never holds funds on a real network
const DEFAULT_OWNER_KEY: &str =
    "0x7777777777777777777777777777777777777777777777777777777777777777";

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

async fn create_signer_client(args: &EthClientArgs) -> eyre::Result<(Arc<SignerClient>, U256)> {
    let provider = create_http_provider(&args.eth_client_address).await?;
    let chain_id = provider.get_chainid().await?;

    let key = args.signer_key.strip_prefix("0x").unwrap_or(&args.signer_key);
    let wallet: LocalWallet = key.parse()?;
    let client =
        Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(chain_id.as_u64())));

    info!(%chain_id, url = %args.eth_client_address, "connected to eth client");
    Ok((client, chain_id))
}

/// Deploys the entry point at its deterministic address after funding the
/// accounts the reference setup expects to hold balance
#[derive(Debug, Parser)]
pub struct DeployEntryPointCommand {
    /// All eth client args
    #[command(flatten)]
    eth_client: EthClientArgs,

    /// All funding args
    #[command(flatten)]
    funding: FundingArgs,

    /// All funding target args
    #[command(flatten)]
    targets: FundingTargetsArgs,

    /// All polling args
    #[command(flatten)]
    polling: PollingArgs,

    /// Path to a file holding the hex-encoded entry point creation bytecode.
    #[clap(long)]
    bytecode_path: PathBuf,

    /// The CREATE2 salt.
    #[clap(long, default_value = "0x0000000000000000000000000000000000000000000000000000000000000000", value_parser = parse_salt)]
    salt: H256,

    /// The address the entry point is expected to land on.
    #[clap(long, default_value = entry_point::ADDRESS, value_parser = parse_address)]
    entry_point: Address,
}

impl DeployEntryPointCommand {
    pub async fn execute(self) -> eyre::Result<()> {
        let (client, _) = create_signer_client(&self.eth_client).await?;

        FundingService::new(client.clone(), self.funding.min_balance)
            .ensure_funded(&[
                ("bundler account", self.targets.bundler_account),
                ("dev account", self.targets.dev_account),
                ("proxy deployer", self.targets.proxy_deployer),
                ("entry point", self.entry_point),
            ])
            .await?;

        let bytecode_hex = std::fs::read_to_string(&self.bytecode_path)?;
        let bytecode = parse_bytecode(&bytecode_hex)?;
        // the entry point takes no constructor arguments
        let init_code = assemble_init_code(&bytecode, &[]);

        let deployer = DeterministicDeployer::new(
            client,
            DeployerConfig {
                salt: self.salt,
                poll_interval: self.polling.poll_interval,
                max_attempts: self.polling.max_attempts,
            },
        );
        let address = deployer.deploy(init_code).await?;

        if address != self.entry_point {
            warn!(
                ?address,
                expected = ?self.entry_point,
                "entry point landed on an unexpected address"
            );
        }
        info!(?address, version = entry_point::VERSION, "entry point deployed");
        Ok(())
    }
}

/// Builds, signs, and submits a user operation for a counterfactual account
#[derive(Debug, Parser)]
pub struct SendUserOpCommand {
    /// All eth client args
    #[command(flatten)]
    eth_client: EthClientArgs,

    /// All funding args
    #[command(flatten)]
    funding: FundingArgs,

    /// All polling args
    #[command(flatten)]
    polling: PollingArgs,

    /// Bundler JSON-RPC endpoint.
    #[clap(long, default_value = "http://127.0.0.1:3000")]
    bundler_url: String,

    /// Private key of the account owner.
    #[clap(long, default_value = DEFAULT_OWNER_KEY, value_parser = validate_private_key)]
    owner_key: String,

    /// Account index under the same owner.
    #[clap(long, default_value = "0", value_parser = parse_u256)]
    index: U256,

    /// The entry point contract address.
    #[clap(long, default_value = entry_point::ADDRESS, value_parser = parse_address)]
    entry_point: Address,

    /// The account factory contract address.
    #[clap(long, default_value = account_factory::ADDRESS, value_parser = parse_address)]
    account_factory: Address,

    /// Path to a file holding the hex-encoded account factory creation
    /// bytecode; when given, the factory is deterministically deployed (with
    /// the entry point address as its constructor argument) and its derived
    /// address replaces --account-factory.
    #[clap(long)]
    factory_bytecode_path: Option<PathBuf>,

    /// Target the account should call; the account itself when omitted.
    #[clap(long, value_parser = parse_address)]
    call_target: Option<Address>,

    /// Value the call carries, in wei.
    #[clap(long, default_value = "0", value_parser = parse_u256)]
    call_value: U256,

    /// Calldata of the call.
    #[clap(long, default_value = "0xaffed0e0")]
    call_data: Bytes,
}

impl SendUserOpCommand {
    pub async fn execute(self) -> eyre::Result<()> {
        let (client, chain_id) = create_signer_client(&self.eth_client).await?;

        let owner = Wallet::from_key(&self.owner_key, chain_id.as_u64())?;
        info!(owner = ?owner.address(), "owner wallet derived");

        // the account factory must exist before init code referencing it can
        // resolve to a sender
        let account_factory = match &self.factory_bytecode_path {
            Some(path) => {
                let bytecode = parse_bytecode(&std::fs::read_to_string(path)?)?;
                let deployer = DeterministicDeployer::new(
                    client.clone(),
                    DeployerConfig {
                        poll_interval: self.polling.poll_interval,
                        max_attempts: self.polling.max_attempts,
                        ..DeployerConfig::default()
                    },
                );
                let address =
                    deployer.deploy(factory_init_code(&bytecode, self.entry_point)).await?;
                info!(?address, "account factory deployed");
                address
            }
            None => self.account_factory,
        };

        let mut config = BuilderConfig::new(self.entry_point, account_factory, chain_id);
        config.poll_interval = self.polling.poll_interval;
        config.max_attempts = self.polling.max_attempts;
        let builder = UserOperationBuilder::new(client.clone(), config);

        let init_code = account_init_code(
            account_factory,
            &create_account_calldata(owner.address(), self.index),
        );
        let sender = builder.resolve_sender(&init_code).await?;
        info!(?sender, "counterfactual account resolved");

        // the account prefunds its own operations from its balance
        FundingService::new(client, self.funding.min_balance)
            .ensure_funded(&[("account", sender)])
            .await?;

        let execute = ExecuteArgs {
            dest: self.call_target.unwrap_or(sender),
            value: self.call_value,
            func: self.call_data.clone(),
        };
        let signed = builder.build(&owner, sender, execute, self.index).await?;

        let bundler = BundlerClient::new(self.bundler_url.clone());
        let bundler_chain = bundler.ping().await?;
        if U256::from(bundler_chain.as_u64()) != chain_id {
            eyre::bail!(
                "bundler serves chain {bundler_chain}, eth client serves chain {chain_id}"
            );
        }

        let hash = bundler.send_user_operation(&signed, &self.entry_point).await?;
        info!(user_operation_hash = ?hash, "user operation submitted");
        Ok(())
    }
}

/// Factory init code: creation bytecode followed by the ABI-encoded entry
/// point address the factory is constructed with
fn factory_init_code(bytecode: &Bytes, entry_point: Address) -> Bytes {
    assemble_init_code(bytecode, &[Token::Address(entry_point)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_init_code_appends_the_entry_point() {
        let bytecode: Bytes = "0x600080fd".parse().unwrap();
        let ep: Address = entry_point::ADDRESS.parse().unwrap();

        let init_code = factory_init_code(&bytecode, ep);
        // one 32-byte constructor word, address right-aligned in it
        assert_eq!(init_code.len(), bytecode.len() + 32);
        assert_eq!(&init_code[..bytecode.len()], bytecode.as_ref());
        assert_eq!(&init_code[init_code.len() - 20..], ep.as_bytes());
    }
}
