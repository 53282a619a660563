//! Primitive types shared by every opcast component: the user operation
//! value object, its canonical hash, the signing wallet, and well-known
//! ERC-4337 constants.

pub mod constants;
pub mod provider;
pub mod user_operation;
pub mod utils;
pub mod wallet;

pub use user_operation::{
    SignedUserOperation, SignedUserOperationError, UserOperation, UserOperationHash,
};
pub use wallet::Wallet;
