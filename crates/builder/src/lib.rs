//! Pre-flight services for user operation submission: the assembly pipeline
//! that builds, hashes, and signs a user operation for a possibly
//! counterfactual account, and the funding service that tops up the
//! participating addresses.

pub mod builder;
pub mod funding;

pub use builder::{
    account_init_code, create_account_calldata, BuilderConfig, BuilderError, ExecuteArgs,
    UserOperationBuilder,
};
pub use funding::{FundingError, FundingService};
