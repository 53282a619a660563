//! A `Wallet` wraps an ethers local wallet and signs user operations with
//! the EIP-191 personal-message scheme the entry point verifies.

use crate::{SignedUserOperation, UserOperation};
use ethers::{
    prelude::k256::ecdsa::SigningKey,
    signers::Signer,
    types::{Address, U256},
};

/// Wrapper around an ethers wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: ethers::signers::Wallet<SigningKey>,
}

impl Wallet {
    /// Creates a wallet from a hex-encoded private key (with or without the
    /// `0x` prefix)
    pub fn from_key(key: &str, chain_id: u64) -> eyre::Result<Self> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer = key.parse::<ethers::signers::Wallet<SigningKey>>()?;
        Ok(Self { signer: signer.with_chain_id(chain_id) })
    }

    /// Address of the wallet
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs the user operation and freezes it together with the hash the
    /// signature covers
    ///
    /// # Arguments
    /// * `uo` - The [UserOperation](UserOperation) to be signed
    /// * `entry_point` - The entry point contract address
    /// * `chain_id` - The chain id of the blockchain network to be used
    ///
    /// # Returns
    /// * `SignedUserOperation` - The signed [UserOperation](UserOperation)
    pub async fn sign_user_operation(
        &self,
        uo: &UserOperation,
        entry_point: &Address,
        chain_id: &U256,
    ) -> eyre::Result<SignedUserOperation> {
        let hash = uo.hash(entry_point, chain_id);
        let sig = self.signer.sign_message(hash.0.as_bytes()).await?;
        Ok(SignedUserOperation::new(
            uo.clone().signature(sig.to_vec().into()),
            hash,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;

    const OWNER_KEY: &str = "0x0707070707070707070707070707070707070707070707070707070707070707";
    const ENTRY_POINT: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";
    const CHAIN_ID: u64 = 1337;

    #[test]
    fn wallet_from_key_is_deterministic() {
        let w1 = Wallet::from_key(OWNER_KEY, CHAIN_ID).unwrap();
        let w2 = Wallet::from_key(OWNER_KEY.strip_prefix("0x").unwrap(), CHAIN_ID).unwrap();
        assert_eq!(w1.address(), w2.address());
    }

    #[tokio::test]
    async fn sign_and_verify() {
        let wallet = Wallet::from_key(OWNER_KEY, CHAIN_ID).unwrap();
        let ep: Address = ENTRY_POINT.parse().unwrap();

        let uo = UserOperation::default()
            .sender("0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap())
            .call_gas_limit(33_100.into())
            .verification_gas_limit(100_000.into())
            .pre_verification_gas(45_040.into());

        let signed = wallet.sign_user_operation(&uo, &ep, &CHAIN_ID.into()).await.unwrap();
        assert!(signed.verify(&ep, &CHAIN_ID.into(), wallet.address()).is_ok());

        // another owner does not verify
        let other = Wallet::from_key(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
            CHAIN_ID,
        )
        .unwrap();
        assert!(signed.verify(&ep, &CHAIN_ID.into(), other.address()).is_err());
    }

    #[tokio::test]
    async fn mutation_invalidates_signature() {
        let wallet = Wallet::from_key(OWNER_KEY, CHAIN_ID).unwrap();
        let ep: Address = ENTRY_POINT.parse().unwrap();

        let uo = UserOperation::default().call_gas_limit(33_100.into());
        let signed = wallet.sign_user_operation(&uo, &ep, &CHAIN_ID.into()).await.unwrap();

        let mutated = SignedUserOperation::new(
            signed.user_operation().clone().call_data(Bytes::from(vec![0xde, 0xad])),
            signed.hash(),
        );
        assert!(mutated.verify(&ep, &CHAIN_ID.into(), wallet.address()).is_err());
    }
}
