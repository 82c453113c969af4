//! Deploy, wait for confirmation, then verify.

use std::{io::Write, time::Duration};

use alloy::{dyn_abi::DynSolValue, primitives::Address};
use log::info;

use crate::{
    constants::DEFAULT_VERIFICATION_DELAY_SECS,
    deployer::{ChainClient, ChainClientError},
    verifier::{VerificationError, VerificationService},
};

/// A confirmed deployment, handed to the verification step.
#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentRecord {
    contract_identifier: String,
    deployed_address: Address,
    constructor_arguments: Vec<DynSolValue>,
}

impl DeploymentRecord {
    pub(crate) fn new(
        contract_identifier: impl Into<String>,
        deployed_address: Address,
        constructor_arguments: Vec<DynSolValue>,
    ) -> Self {
        Self {
            contract_identifier: contract_identifier.into(),
            deployed_address,
            constructor_arguments,
        }
    }

    pub fn contract_identifier(&self) -> &str {
        &self.contract_identifier
    }

    pub fn deployed_address(&self) -> Address {
        self.deployed_address
    }

    pub fn constructor_arguments(&self) -> &[DynSolValue] {
        &self.constructor_arguments
    }
}

#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Pause between confirmation and verification, letting the explorer
    /// index the new contract.
    pub verification_delay: Duration,
    pub skip_verification: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            verification_delay: Duration::from_secs(DEFAULT_VERIFICATION_DELAY_SECS),
            skip_verification: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("deployment failed: {0}")]
    Chain(#[from] ChainClientError),
    #[error("contract deployed at {address} but verification failed: {source}")]
    Verification {
        address: Address,
        source: VerificationError,
    },
    #[error("failed to report deployment: {0}")]
    Report(#[from] std::io::Error),
}

/// Runs a single deployment followed by a single verification attempt.
pub struct DeploymentRunner<C, V, W> {
    chain: C,
    verifier: V,
    out: W,
    config: RunnerConfig,
}

impl<C, V, W> DeploymentRunner<C, V, W>
where
    C: ChainClient,
    V: VerificationService,
    W: Write,
{
    /// `out` receives the deployed address, one line per run.
    pub fn new(chain: C, verifier: V, out: W, config: RunnerConfig) -> Self {
        Self {
            chain,
            verifier,
            out,
            config,
        }
    }

    pub async fn deploy_and_verify(
        &mut self,
        contract_identifier: &str,
        constructor_arguments: Vec<DynSolValue>,
    ) -> Result<DeploymentRecord, DeploymentError> {
        let pending = self
            .chain
            .deploy_contract(contract_identifier, &constructor_arguments)
            .await?;
        let confirmed = self.chain.wait_for_deployment(pending).await?;
        let record =
            DeploymentRecord::new(contract_identifier, confirmed.address, constructor_arguments);

        writeln!(
            self.out,
            "{contract_identifier} Contract Address: {}",
            record.deployed_address
        )?;
        self.out.flush()?;

        if self.config.skip_verification {
            info!("skipping verification");
            return Ok(record);
        }

        info!(
            "waiting {}s for the explorer to index the contract",
            self.config.verification_delay.as_secs()
        );
        tokio::time::sleep(self.config.verification_delay).await;

        self.verifier
            .verify(&record)
            .await
            .map_err(|source| DeploymentError::Verification {
                address: record.deployed_address,
                source,
            })?;
        Ok(record)
    }
}
