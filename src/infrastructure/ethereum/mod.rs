//! Ethereum infrastructure - contract ABI, Alloy source, certificate loader

pub(crate) mod contract;
mod loader;
mod provider;

pub use loader::{
    connect, load_certificates, parse_address, Connection, FailedToken, LoadReport, LoaderError,
};
pub use provider::{create_source, AlloyCertificateSource, CertificateSource, ProviderConfig};
