//! Certificate loading - connect, enumerate token ids, fetch every token
//!
//! Per-token failures are dropped from the batch (and reported back) so the
//! filter engine only ever sees complete records.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use anyhow::Context;
use futures::future::join_all;

use crate::domain::{same_address, Certificate};
use crate::infrastructure::ethereum::contract::IGraduateCertificate;
use crate::infrastructure::ethereum::provider::CertificateSource;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("no certificate contract configured (set `contract` in config or pass --contract)")]
    MissingContract,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("wrong network: expected chain id {expected}, node reports {actual}")]
    WrongChain { expected: u64, actual: u64 },
    #[error("failed to enumerate certificates: {0}")]
    Enumerate(String),
}

/// Established session facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub endpoint: String,
    pub chain_id: u64,
    /// Lowercase hex address used for ownership, if any
    pub viewer: Option<String>,
}

/// One token that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedToken {
    /// Decimal token id as enumerated; may exceed `u64`
    pub token_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Enumeration order
    pub certificates: Vec<Certificate>,
    pub failed: Vec<FailedToken>,
}

impl LoadReport {
    fn drop_token(&mut self, token_id: String, error: String) {
        tracing::warn!(token_id = %token_id, error = %error, "dropping certificate");
        self.failed.push(FailedToken { token_id, error });
    }
}

/// Verify the chain and resolve the viewer identity
///
/// A configured viewer wins; otherwise the node's first account is used,
/// which only dev nodes expose.
pub async fn connect(
    source: &dyn CertificateSource,
    expected_chain_id: u64,
    configured_viewer: Option<&str>,
) -> Result<Connection, LoaderError> {
    let chain_id = source
        .chain_id()
        .await
        .map_err(|err| LoaderError::Connection(format!("{err:#}")))?;
    if chain_id != expected_chain_id {
        return Err(LoaderError::WrongChain {
            expected: expected_chain_id,
            actual: chain_id,
        });
    }

    let viewer = match configured_viewer {
        Some(raw) => Some(format_address(parse_address(raw)?)),
        None => match source.accounts().await {
            Ok(accounts) => accounts.first().copied().map(format_address),
            Err(err) => {
                tracing::debug!(error = %err, "node exposes no accounts");
                None
            }
        },
    };

    tracing::info!(
        endpoint = %source.endpoint_name(),
        chain_id,
        viewer = viewer.as_deref().unwrap_or("-"),
        "connected"
    );

    Ok(Connection {
        endpoint: source.endpoint_name(),
        chain_id,
        viewer,
    })
}

/// Fetch every certificate the contract knows about
pub async fn load_certificates(
    source: &dyn CertificateSource,
    contract: Address,
    viewer: Option<&str>,
) -> Result<LoadReport, LoaderError> {
    let token_ids = fetch_token_ids(source, contract)
        .await
        .map_err(|err| LoaderError::Enumerate(format!("{err:#}")))?;
    tracing::info!(count = token_ids.len(), %contract, "enumerated certificates");

    let mut report = LoadReport::default();
    let mut ids = Vec::with_capacity(token_ids.len());
    for id in &token_ids {
        match u64::try_from(*id) {
            Ok(id) => ids.push(id),
            Err(_) => report.drop_token(id.to_string(), "token id does not fit in 64 bits".to_string()),
        }
    }

    let results = join_all(
        ids.iter()
            .map(|id| fetch_certificate(source, contract, *id, viewer)),
    )
    .await;

    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(certificate) => report.certificates.push(certificate),
            Err(err) => report.drop_token(id.to_string(), format!("{err:#}")),
        }
    }

    tracing::info!(
        loaded = report.certificates.len(),
        failed = report.failed.len(),
        "certificates fetched"
    );
    Ok(report)
}

async fn fetch_token_ids(source: &dyn CertificateSource, contract: Address) -> anyhow::Result<Vec<U256>> {
    let data = IGraduateCertificate::getAllTokenIdsCall {}.abi_encode();
    let raw = source.call(contract, data).await.context("getAllTokenIds")?;
    IGraduateCertificate::getAllTokenIdsCall::abi_decode_returns(&raw)
        .context("decode getAllTokenIds")
}

async fn fetch_certificate(
    source: &dyn CertificateSource,
    contract: Address,
    id: u64,
    viewer: Option<&str>,
) -> anyhow::Result<Certificate> {
    let token_id = U256::from(id);
    let graduate = async {
        let data = IGraduateCertificate::getGraduateCall { tokenId: token_id }.abi_encode();
        let raw = source.call(contract, data).await.context("getGraduate")?;
        IGraduateCertificate::getGraduateCall::abi_decode_returns(&raw).context("decode getGraduate")
    };
    let owner = async {
        let data = IGraduateCertificate::ownerOfCall { tokenId: token_id }.abi_encode();
        let raw = source.call(contract, data).await.context("ownerOf")?;
        IGraduateCertificate::ownerOfCall::abi_decode_returns(&raw).context("decode ownerOf")
    };
    let uri = async {
        let data = IGraduateCertificate::tokenURICall { tokenId: token_id }.abi_encode();
        let raw = source.call(contract, data).await.context("tokenURI")?;
        IGraduateCertificate::tokenURICall::abi_decode_returns(&raw).context("decode tokenURI")
    };

    let (graduate, owner, token_uri) = futures::try_join!(graduate, owner, uri)?;
    let owner = owner.to_checksum(None);
    let is_owner = viewer.is_some_and(|viewer| same_address(&owner, viewer));

    Ok(Certificate {
        token_id: id,
        name: graduate.name,
        program: graduate.program,
        grade: graduate.grade,
        year: graduate.year.saturating_to::<u64>(),
        issued_at: graduate.timestamp.saturating_to::<u64>(),
        owner,
        token_uri,
        is_owner,
    })
}

/// Parse a 0x-prefixed 20-byte hex address
pub fn parse_address(s: &str) -> Result<Address, LoaderError> {
    let trimmed = s.trim();
    let normalized = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if normalized.len() != 40 {
        return Err(LoaderError::InvalidAddress(trimmed.to_string()));
    }
    let bytes =
        hex::decode(normalized).map_err(|_| LoaderError::InvalidAddress(trimmed.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

fn format_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}
