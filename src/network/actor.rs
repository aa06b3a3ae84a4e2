//! Network actor - runs API calls in the Tokio async runtime

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{error_message, ApiClient};

/// Network actor that executes API calls concurrently
pub struct NetworkActor {
    client: ApiClient,
    timeout: Duration,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(config: &Config, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client: ApiClient::new(config),
            timeout: config.timeout,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, call }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let timeout = self.timeout;

                            // Calls are independent; replies arrive in completion order
                            self.active_requests.spawn(async move {
                                let action = call.action();
                                let project_id = call.project_id();
                                tracing::info!(id, action, "Executing call");
                                let start = Instant::now();
                                let result = client.execute(call).await;
                                let time_ms = start.elapsed().as_millis() as u64;

                                let response = match result {
                                    Ok(reply) => {
                                        tracing::info!(id, action, time_ms, "Call completed");
                                        NetworkResponse::Success { id, reply, time_ms }
                                    }
                                    Err(err) => {
                                        tracing::warn!(id, action, time_ms, error = %err, "Call failed");
                                        NetworkResponse::Error {
                                            id,
                                            action,
                                            message: error_message(&err, timeout),
                                            project_id,
                                            time_ms,
                                        }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}
