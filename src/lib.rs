pub mod config;
pub use config::run;

pub mod artifact;
pub mod deployer;
pub mod runner;
pub mod verifier;

mod constants;
mod formatting;
mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use deployer::{ChainClient, ChainClientError, ConfirmedDeployment, RpcChainClient};
pub use runner::{DeploymentError, DeploymentRecord, DeploymentRunner, RunnerConfig};
pub use verifier::{Etherscan, EtherscanConfig, VerificationError, VerificationService};
