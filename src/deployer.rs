use std::future::Future;

use alloy::{
    dyn_abi::DynSolValue,
    network::{Ethereum, ReceiptResponse, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{PendingTransactionBuilder, PendingTransactionError, Provider, WalletProvider},
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportErrorKind},
};
use log::{debug, info};
use owo_colors::OwoColorize;

use crate::{
    artifact::{ArtifactError, Artifacts},
    constants::{INIT_CODE_LIMIT_KIB, RUNTIME_CODE_LIMIT_KIB},
    formatting::{format_cost, format_file_size, format_gas},
};

/// Submits and confirms contract-creation transactions.
pub trait ChainClient {
    /// Handle to a broadcast, not yet confirmed, creation transaction.
    type Pending;

    /// Broadcasts a transaction creating `contract_identifier` with the given
    /// constructor arguments.
    fn deploy_contract(
        &self,
        contract_identifier: &str,
        constructor_arguments: &[DynSolValue],
    ) -> impl Future<Output = Result<Self::Pending, ChainClientError>>;

    /// Waits, without a timeout, until the creation transaction is mined.
    fn wait_for_deployment(
        &self,
        pending: Self::Pending,
    ) -> impl Future<Output = Result<ConfirmedDeployment, ChainClientError>>;
}

/// A contract whose creation transaction has been mined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedDeployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub gas_used: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error(
        "not enough funds in account {} to deploy\n\
         balance {} < {}",
        .sender.red(),
        .balance.red(),
        format!("{} wei", .cost).red(),
    )]
    NotEnoughFunds {
        sender: Address,
        balance: U256,
        cost: U256,
    },
    #[error("deploy tx failed to complete: {0}")]
    FailedToComplete(#[from] PendingTransactionError),
    #[error("deploy tx reverted {}", .tx_hash.red())]
    Reverted { tx_hash: TxHash },
    #[error("no contract address in receipt of {tx_hash}")]
    NoContractAddress { tx_hash: TxHash },
}

/// [`ChainClient`] backed by a JSON-RPC provider holding the deployer's wallet.
pub struct RpcChainClient<P> {
    provider: P,
    artifacts: Artifacts,
}

impl<P> RpcChainClient<P> {
    pub fn new(provider: P, artifacts: Artifacts) -> Self {
        Self {
            provider,
            artifacts,
        }
    }
}

impl<P> ChainClient for RpcChainClient<P>
where
    P: Provider + WalletProvider,
{
    type Pending = PendingTransactionBuilder<Ethereum>;

    async fn deploy_contract(
        &self,
        contract_identifier: &str,
        constructor_arguments: &[DynSolValue],
    ) -> Result<Self::Pending, ChainClientError> {
        let artifact = self.artifacts.load(contract_identifier)?;
        let init_code = artifact.init_code(constructor_arguments)?;
        info!(
            "init code size: {}",
            format_file_size(init_code.len(), RUNTIME_CODE_LIMIT_KIB, INIT_CODE_LIMIT_KIB)
        );

        let sender = self.provider.default_signer_address();
        debug!("sender address: {sender}");
        let tx = TransactionRequest::default()
            .with_from(sender)
            .with_deploy_code(init_code);

        // Check funds early, the node's rejection is far less readable.
        let gas = self.provider.estimate_gas(tx.clone()).await?;
        let gas_price = self.provider.get_gas_price().await?;
        let balance = self.provider.get_balance(sender).await?;
        let cost = check_funds(sender, balance, gas, gas_price)?;
        debug!("estimated deployment cost: {}", format_cost(cost));

        let pending = self.provider.send_transaction(tx).await?;
        info!("deployment tx hash: {}", pending.tx_hash().bright_magenta());
        Ok(pending)
    }

    async fn wait_for_deployment(
        &self,
        pending: Self::Pending,
    ) -> Result<ConfirmedDeployment, ChainClientError> {
        let tx_hash = *pending.tx_hash();
        let receipt = pending.get_receipt().await?;
        confirm(tx_hash, &receipt)
    }
}

/// Returns the cost of `gas` at `gas_price`, failing when `balance` can't
/// cover it.
fn check_funds(
    sender: Address,
    balance: U256,
    gas: u64,
    gas_price: u128,
) -> Result<U256, ChainClientError> {
    let cost = U256::from(gas) * U256::from(gas_price);
    if balance < cost {
        return Err(ChainClientError::NotEnoughFunds {
            sender,
            balance,
            cost,
        });
    }
    Ok(cost)
}

/// Checks a mined creation receipt for the deployed address.
fn confirm<R: ReceiptResponse>(
    tx_hash: TxHash,
    receipt: &R,
) -> Result<ConfirmedDeployment, ChainClientError> {
    if !receipt.status() {
        return Err(ChainClientError::Reverted { tx_hash });
    }
    let address = receipt
        .contract_address()
        .ok_or(ChainClientError::NoContractAddress { tx_hash })?;

    let gas_used = receipt.gas_used();
    let cost = U256::from(gas_used) * U256::from(receipt.effective_gas_price());
    info!(
        "deployed with {} costing {}",
        format_gas(gas_used),
        format_cost(cost)
    );

    Ok(ConfirmedDeployment {
        address,
        tx_hash,
        gas_used,
    })
}
