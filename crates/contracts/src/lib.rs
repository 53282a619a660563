//! Client-side wrappers around the on-chain contracts opcast talks to: the
//! entry point, the account factory and account, and the deterministic
//! deployment proxy.

pub mod deployer;
pub mod entry_point;
mod error;
pub mod gen;

pub use deployer::{
    assemble_init_code, parse_bytecode, DeployerConfig, DeployerError, DeterministicDeployer,
    DEPLOYMENT_PROXY,
};
pub use entry_point::EntryPoint;
pub use error::{decode_revert_error, decode_revert_string, EntryPointError};
pub use gen::{AccountFactoryAPI, EntryPointAPI, SimpleAccountAPI};
