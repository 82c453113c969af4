//! Source verification through the Etherscan API.

use std::{future::Future, time::Duration};

use log::{debug, info};
use owo_colors::OwoColorize;
use serde::Deserialize;

use crate::{
    artifact::{encode_constructor_args, Artifact, ArtifactError, Artifacts, BuildInfo},
    runner::DeploymentRecord,
};

/// Publishes the source of a deployed contract.
pub trait VerificationService {
    fn verify(
        &self,
        record: &DeploymentRecord,
    ) -> impl Future<Output = Result<(), VerificationError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("no Etherscan API key, set ETHERSCAN_API_KEY or pass --etherscan-api-key")]
    MissingApiKey,
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error("failed to encode compiler input: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to reach verification service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("verification rejected: {0}")]
    Rejected(String),
    #[error("verification still pending after {0} status checks")]
    StillPending(usize),
}

#[derive(Clone, Debug)]
pub struct EtherscanConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub chain_id: u64,
    /// Interval between verification status checks.
    pub poll_interval: Duration,
    pub max_status_checks: usize,
}

/// [`VerificationService`] submitting Solidity standard JSON input to
/// Etherscan.
pub struct Etherscan {
    client: reqwest::Client,
    config: EtherscanConfig,
    artifacts: Artifacts,
}

impl Etherscan {
    pub fn new(config: EtherscanConfig, artifacts: Artifacts) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            artifacts,
        })
    }

    fn api_key(&self) -> Result<&str, VerificationError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(VerificationError::MissingApiKey)
    }

    async fn submit(
        &self,
        api_key: &str,
        record: &DeploymentRecord,
    ) -> Result<Submission, VerificationError> {
        let artifact = self.artifacts.load(record.contract_identifier())?;
        let build_info = artifact.build_info()?;
        let form = submission_form(api_key, record, &artifact, &build_info)?;

        info!(
            "submitting {} for verification",
            artifact.fully_qualified_name().bright_cyan()
        );
        let response: ApiResponse = self
            .client
            .post(&self.config.api_url)
            .query(&[("chainid", self.config.chain_id)])
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_submission(response)
    }

    async fn status(&self, api_key: &str, guid: &str) -> Result<Status, VerificationError> {
        let chain_id = self.config.chain_id.to_string();
        let response: ApiResponse = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("chainid", chain_id.as_str()),
                ("apikey", api_key),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_status(response)
    }
}

impl VerificationService for Etherscan {
    async fn verify(&self, record: &DeploymentRecord) -> Result<(), VerificationError> {
        let api_key = self.api_key()?;

        let guid = match self.submit(api_key, record).await? {
            Submission::Queued(guid) => guid,
            Submission::AlreadyVerified => {
                info!("{}", "contract is already verified".bright_green());
                return Ok(());
            }
        };
        debug!("verification guid: {guid}");

        // Etherscan verifies asynchronously, this polls the one submission.
        for _ in 0..self.config.max_status_checks {
            tokio::time::sleep(self.config.poll_interval).await;
            match self.status(api_key, &guid).await? {
                Status::Pending => debug!("verification pending"),
                Status::Verified => {
                    info!(
                        "verified {}",
                        record.deployed_address().to_string().bright_green()
                    );
                    return Ok(());
                }
            }
        }

        Err(VerificationError::StillPending(self.config.max_status_checks))
    }
}

/// Envelope of every Etherscan API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    result: String,
}

#[derive(Debug, PartialEq)]
enum Submission {
    Queued(String),
    AlreadyVerified,
}

#[derive(Debug, PartialEq)]
enum Status {
    Pending,
    Verified,
}

fn submission_form(
    api_key: &str,
    record: &DeploymentRecord,
    artifact: &Artifact,
    build_info: &BuildInfo,
) -> Result<Vec<(&'static str, String)>, VerificationError> {
    let constructor_args = hex::encode(encode_constructor_args(record.constructor_arguments()));
    Ok(vec![
        ("apikey", api_key.to_owned()),
        ("module", "contract".to_owned()),
        ("action", "verifysourcecode".to_owned()),
        ("contractaddress", record.deployed_address().to_string()),
        ("sourceCode", serde_json::to_string(&build_info.input)?),
        ("codeformat", "solidity-standard-json-input".to_owned()),
        ("contractname", artifact.fully_qualified_name()),
        (
            "compilerversion",
            format!("v{}", build_info.solc_long_version),
        ),
        // Misspelled in the Etherscan API.
        ("constructorArguements", constructor_args),
    ])
}

fn parse_submission(response: ApiResponse) -> Result<Submission, VerificationError> {
    if response.status == "1" {
        return Ok(Submission::Queued(response.result));
    }
    if is_already_verified(&response.result) {
        return Ok(Submission::AlreadyVerified);
    }
    Err(VerificationError::Rejected(response.result))
}

fn parse_status(response: ApiResponse) -> Result<Status, VerificationError> {
    if response.result == "Pending in queue" {
        return Ok(Status::Pending);
    }
    if response.status == "1" || is_already_verified(&response.result) {
        return Ok(Status::Verified);
    }
    Err(VerificationError::Rejected(response.result))
}

fn is_already_verified(result: &str) -> bool {
    result.to_lowercase().contains("already verified")
}
