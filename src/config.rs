use std::{io, path::PathBuf, time::Duration};

use alloy::providers::{Provider, ProviderBuilder};
use clap::{Args, Parser};
use eyre::Context;
use log::LevelFilter;
use reqwest::Url;
use simple_logger::SimpleLogger;
use tokio::runtime::Builder;

use crate::{
    artifact::Artifacts,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONSTRUCTOR_ARGS, DEFAULT_CONTRACT, DEFAULT_ENDPOINT,
        DEFAULT_ETHERSCAN_API_URL, DEFAULT_VERIFICATION_DELAY_SECS, MAX_STATUS_CHECKS,
        STATUS_POLL_INTERVAL,
    },
    deployer::RpcChainClient,
    runner::{DeploymentRunner, RunnerConfig},
    verifier::{Etherscan, EtherscanConfig},
};

/// Main entrypoint to `deploy-verify`.
pub fn run() -> eyre::Result<()> {
    let config = Config::parse();
    init_logger(config.verbose)?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(config.run())
}

fn init_logger(verbose: bool) -> eyre::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("deploy_verify", level)
        .init()
        .wrap_err("failed to set up logger")
}

/// Deploy a compiled contract, wait for it to be mined, then verify its
/// source on Etherscan.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Contract to deploy, either `Name` or `path/to/Source.sol:Name`.
    #[arg(long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,
    /// Constructor arguments, in declaration order.
    #[arg(
        long,
        num_args(0..),
        value_name = "ARGS",
        allow_negative_numbers = true,
        default_values = DEFAULT_CONSTRUCTOR_ARGS,
    )]
    pub constructor_args: Vec<String>,
    /// Hardhat artifacts directory.
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,
    /// JSON-RPC endpoint of the target chain.
    #[arg(long, env = "ETH_RPC_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Wallet source to use.
    #[command(flatten)]
    pub auth: PrivateKey,
    #[command(flatten)]
    pub verification: Verification,
    /// Whether to print debug info.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Config {
    async fn run(&self) -> eyre::Result<()> {
        let artifacts = Artifacts::new(&self.artifacts);
        let artifact = artifacts.load(&self.contract)?;
        let constructor_args = artifact.constructor_args(&self.constructor_args)?;

        let rpc_url: Url = self.endpoint.parse().wrap_err("invalid RPC endpoint")?;
        let chain_id = ProviderBuilder::new()
            .connect_http(rpc_url.clone())
            .get_chain_id()
            .await
            .wrap_err_with(|| format!("failed to reach RPC endpoint {}", self.endpoint))?;
        log::debug!("chain id: {chain_id}");

        let wallet = self.auth.wallet(chain_id)?;
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url);

        let chain = RpcChainClient::new(provider, artifacts.clone());
        let verifier = Etherscan::new(self.verification.etherscan(chain_id), artifacts)?;
        let mut runner =
            DeploymentRunner::new(chain, verifier, io::stdout(), self.verification.runner());

        runner
            .deploy_and_verify(&self.contract, constructor_args)
            .await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PrivateKey {
    /// Private key as a hex string. Warning: this exposes your key to shell history.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// File path to a text file containing a hex-encoded private key.
    #[arg(long)]
    pub private_key_path: Option<PathBuf>,
    /// Path to an Ethereum wallet keystore file.
    #[arg(long)]
    pub keystore_path: Option<PathBuf>,
    /// Keystore password file.
    #[arg(long)]
    pub keystore_password_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct Verification {
    /// Etherscan API key.
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,
    /// Etherscan API endpoint.
    #[arg(long, default_value = DEFAULT_ETHERSCAN_API_URL)]
    pub etherscan_api_url: String,
    /// Seconds to wait after deployment before submitting for verification.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_VERIFICATION_DELAY_SECS)]
    pub verification_delay: u64,
    /// Deploy only, without verifying.
    #[arg(long)]
    pub no_verify: bool,
}

impl Verification {
    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig {
            verification_delay: Duration::from_secs(self.verification_delay),
            skip_verification: self.no_verify,
        }
    }

    pub fn etherscan(&self, chain_id: u64) -> EtherscanConfig {
        EtherscanConfig {
            api_url: self.etherscan_api_url.clone(),
            api_key: self.etherscan_api_key.clone(),
            chain_id,
            poll_interval: STATUS_POLL_INTERVAL,
            max_status_checks: MAX_STATUS_CHECKS,
        }
    }
}
