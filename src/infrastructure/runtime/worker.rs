//! Async worker - runs in the Tokio runtime and performs certificate loads

use alloy::primitives::Address;
use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::infrastructure::ethereum::{
    connect, create_source, load_certificates, parse_address, CertificateSource, Connection,
    LoaderError,
};
use crate::infrastructure::runtime::bridge::{
    EventSender, RuntimeCommand, RuntimeEvent, WorkerConfig,
};

struct Session {
    source: Box<dyn CertificateSource>,
    connection: Connection,
}

/// Run the async worker loop
///
/// Reloads are handled strictly in arrival order; the UI additionally
/// discards any `Loaded` batch older than its newest request.
pub async fn run_async_worker(
    config: WorkerConfig,
    mut cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: EventSender,
) -> Result<()> {
    let mut session: Option<Session> = None;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            RuntimeCommand::Shutdown => return Ok(()),

            RuntimeCommand::Reload { seq } => {
                let contract = match resolve_contract(config.contract.as_deref()) {
                    Ok(contract) => contract,
                    Err(err) => {
                        send_error(&evt_tx, seq, err.to_string());
                        continue;
                    }
                };

                if session.is_none() {
                    match open_session(&config).await {
                        Ok(opened) => {
                            let _ = evt_tx.send(RuntimeEvent::Connected(opened.connection.clone()));
                            session = Some(opened);
                        }
                        Err(err) => {
                            send_error(&evt_tx, seq, format!("{err:#}"));
                            continue;
                        }
                    }
                }
                let Some(active) = session.as_ref() else {
                    continue;
                };

                let viewer = active.connection.viewer.as_deref();
                match load_certificates(active.source.as_ref(), contract, viewer).await {
                    Ok(report) => {
                        let _ = evt_tx.send(RuntimeEvent::Loaded {
                            seq,
                            certificates: report.certificates,
                            failed: report.failed,
                        });
                    }
                    Err(err) => {
                        send_error(&evt_tx, seq, err.to_string());
                        // force a reconnect on the next reload
                        session = None;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn open_session(config: &WorkerConfig) -> Result<Session> {
    let source = create_source(config.endpoint.clone())
        .await
        .map_err(|err| LoaderError::Connection(format!("{}: {err:#}", config.endpoint.display())))?;
    let connection = connect(source.as_ref(), config.chain_id, config.viewer.as_deref()).await?;
    Ok(Session { source, connection })
}

fn resolve_contract(contract: Option<&str>) -> Result<Address, LoaderError> {
    let raw = contract
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(LoaderError::MissingContract)?;
    parse_address(raw)
}

fn send_error(evt_tx: &EventSender, seq: u64, message: String) {
    tracing::error!(seq, message = %message, "reload failed");
    let _ = evt_tx.send(RuntimeEvent::Error {
        seq: Some(seq),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_contract() {
        assert!(matches!(
            resolve_contract(None),
            Err(LoaderError::MissingContract)
        ));
        assert!(matches!(
            resolve_contract(Some("  ")),
            Err(LoaderError::MissingContract)
        ));
        assert!(matches!(
            resolve_contract(Some("0x12")),
            Err(LoaderError::InvalidAddress(_))
        ));
        assert!(resolve_contract(Some("0x1111111111111111111111111111111111111111")).is_ok());
    }

    #[tokio::test]
    async fn test_missing_contract_reports_error_and_shutdown_exits() {
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let (evt_tx, evt_rx) = std::sync::mpsc::channel();
        let config = WorkerConfig {
            endpoint: crate::infrastructure::ethereum::ProviderConfig::Http(
                "http://127.0.0.1:1".into(),
            ),
            contract: None,
            chain_id: 97,
            viewer: None,
        };

        cmd_tx.send(RuntimeCommand::Reload { seq: 3 }).unwrap();
        cmd_tx.send(RuntimeCommand::Shutdown).unwrap();
        run_async_worker(config, cmd_rx, evt_tx).await.unwrap();

        match evt_rx.try_recv().unwrap() {
            RuntimeEvent::Error { seq, message } => {
                assert_eq!(seq, Some(3));
                assert!(message.contains("no certificate contract"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
