//! Tops up a set of addresses to a minimum balance from a funded signer.
//! Every decision is made from a fresh balance read; a transfer that went
//! out is never retried within the same call.

use ethers::{
    providers::Middleware,
    types::{Address, TransactionReceipt, TransactionRequest, TxHash, U256},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Funding errors
#[derive(Debug, Error)]
pub enum FundingError {
    /// The transfer was rejected or never confirmed (for example because the
    /// funding signer itself is underfunded)
    #[error("funding transfer to {address} failed: {inner}")]
    Broadcast {
        /// The address that was being funded
        address: Address,
        /// The inner error message
        inner: String,
    },

    /// Balance query failed
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },
}

/// The amount missing from `balance` to reach `min_balance`, if any
pub fn shortfall(balance: U256, min_balance: U256) -> Option<U256> {
    if balance < min_balance {
        Some(min_balance - balance)
    } else {
        None
    }
}

/// A transfer only counts once it is included; a pending transaction that
/// resolves without a receipt was dropped from the mempool
fn confirm_transfer(
    address: Address,
    receipt: Option<TransactionReceipt>,
) -> Result<TxHash, FundingError> {
    match receipt {
        Some(receipt) => Ok(receipt.transaction_hash),
        None => Err(FundingError::Broadcast {
            address,
            inner: "transaction dropped from the mempool without a receipt".into(),
        }),
    }
}

/// Ensures a set of addresses hold a minimum balance, transferring the
/// shortfall from the signer behind `eth_client`
pub struct FundingService<M: Middleware + 'static> {
    eth_client: Arc<M>,
    min_balance: U256,
}

impl<M: Middleware + 'static> FundingService<M> {
    pub fn new(eth_client: Arc<M>, min_balance: U256) -> Self {
        Self { eth_client, min_balance }
    }

    /// Tops up every target below the minimum balance. Returns the transfer
    /// transaction hash per target, `None` where the balance was already
    /// sufficient.
    pub async fn ensure_funded(
        &self,
        targets: &[(&str, Address)],
    ) -> Result<Vec<Option<TxHash>>, FundingError> {
        let mut transfers = Vec::with_capacity(targets.len());

        for (label, address) in targets {
            let balance = self
                .eth_client
                .get_balance(*address, None)
                .await
                .map_err(|e| FundingError::Provider { inner: e.to_string() })?;

            let Some(missing) = shortfall(balance, self.min_balance) else {
                info!(target: "opcast::funding", %label, %balance, "balance is sufficient");
                transfers.push(None);
                continue;
            };

            let tx = TransactionRequest::new().to(*address).value(missing);
            let receipt = self
                .eth_client
                .send_transaction(tx, None)
                .await
                .map_err(|e| FundingError::Broadcast { address: *address, inner: e.to_string() })?
                .await
                .map_err(|e| FundingError::Broadcast { address: *address, inner: e.to_string() })?;

            let tx_hash = confirm_transfer(*address, receipt)?;
            info!(
                target: "opcast::funding",
                %label,
                %balance,
                %missing,
                ?tx_hash,
                "funded to minimum balance"
            );
            transfers.push(Some(tx_hash));
        }

        Ok(transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::parse_ether;

    #[test]
    fn no_shortfall_at_or_above_minimum() {
        let min: U256 = parse_ether(1).unwrap();
        assert_eq!(shortfall(min, min), None);
        assert_eq!(shortfall(min + 1, min), None);
    }

    #[test]
    fn shortfall_is_the_exact_difference() {
        let min: U256 = parse_ether(1).unwrap();
        assert_eq!(shortfall(U256::zero(), min), Some(min));
        assert_eq!(shortfall(min - 7, min), Some(7.into()));
    }

    #[test]
    fn dropped_transfer_is_an_error() {
        let address: Address = "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap();

        let receipt = TransactionReceipt {
            transaction_hash: TxHash::from_low_u64_be(42),
            ..Default::default()
        };
        assert_eq!(
            confirm_transfer(address, Some(receipt)).unwrap(),
            TxHash::from_low_u64_be(42)
        );

        let err = confirm_transfer(address, None).unwrap_err();
        assert!(matches!(err, FundingError::Broadcast { address: a, .. } if a == address));
    }
}
