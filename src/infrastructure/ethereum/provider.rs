//! Certificate source abstraction and its Alloy implementation
//!
//! The loader only needs chain id, node accounts, and `eth_call`, so the
//! trait stays that narrow and tests can answer calls from memory.

use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Classify an endpoint string; bare host:port is treated as HTTP
    pub fn from_endpoint(endpoint: &str) -> Self {
        let trimmed = endpoint.trim();
        if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
            ProviderConfig::WebSocket(trimmed.to_string())
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ProviderConfig::Http(trimmed.to_string())
        } else {
            ProviderConfig::Http(format!("http://{}", trimmed))
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }
}

/// Read access to a node hosting the certificate contract
#[async_trait::async_trait]
pub trait CertificateSource: Send + Sync + 'static {
    /// Chain id reported by the node
    async fn chain_id(&self) -> Result<u64>;

    /// Accounts managed by the node (dev nodes only; usually empty)
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Execute a read-only call (eth_call)
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

pub struct AlloyCertificateSource {
    provider: DynProvider,
    endpoint: String,
}

/// Create a source from configuration
pub async fn create_source(config: ProviderConfig) -> Result<Box<dyn CertificateSource>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
            Ok(Box::new(AlloyCertificateSource {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?
                .erased();
            Ok(Box::new(AlloyCertificateSource {
                provider,
                endpoint: url,
            }))
        }
    }
}

#[async_trait::async_trait]
impl CertificateSource for AlloyCertificateSource {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        let request = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(data).into());
        Ok(self.provider.call(request).await?)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_classification() {
        assert_eq!(
            ProviderConfig::from_endpoint("localhost:8545"),
            ProviderConfig::Http("http://localhost:8545".into())
        );
        assert_eq!(
            ProviderConfig::from_endpoint(" https://bsc-testnet.example "),
            ProviderConfig::Http("https://bsc-testnet.example".into())
        );
        assert_eq!(
            ProviderConfig::from_endpoint("wss://node.example/ws"),
            ProviderConfig::WebSocket("wss://node.example/ws".into())
        );
    }
}
