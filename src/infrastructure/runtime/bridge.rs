//! Runtime bridge - connects the sync TUI thread with the async loader
//!
//! The worker owns its own Tokio runtime on a dedicated thread. Commands go
//! in over an unbounded Tokio channel (sendable from sync code), events come
//! back over a std channel the UI drains every tick.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::domain::Certificate;
use crate::infrastructure::ethereum::{Connection, FailedToken, ProviderConfig};
use crate::infrastructure::runtime::worker::run_async_worker;

/// Everything the worker needs to reach the contract
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub endpoint: ProviderConfig,
    pub contract: Option<String>,
    pub chain_id: u64,
    pub viewer: Option<String>,
}

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// (Re)connect if needed and fetch the full certificate set
    Reload { seq: u64 },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Chain verified and viewer resolved
    Connected(Connection),
    /// A full certificate set for reload `seq`
    Loaded {
        seq: u64,
        certificates: Vec<Certificate>,
        failed: Vec<FailedToken>,
    },
    /// Error occurred
    Error { seq: Option<u64>, message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: UnboundedSender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded_channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();
        let rt = Runtime::new()?;

        thread::Builder::new()
            .name("certdeck-loader".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(config, cmd_rx, evt_tx.clone()).await {
                        tracing::error!(error = %err, "worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            seq: None,
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

pub(crate) type EventSender = Sender<RuntimeEvent>;
