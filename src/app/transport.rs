//! Call transport — delivers request text to the runtime and returns its reply.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lost contact with `{program}`")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` did not answer within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("`{program}` failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("`{program}` replied with non-UTF-8 output")]
    InvalidUtf8 { program: String },
}

/// Something that can deliver one request to the runtime and wait for the reply.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn call(&mut self, request: &str) -> Result<String, TransportError>;
}

/// Runs the runtime's call client once per request, passing the request as
/// the final argument and reading the reply from stdout.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandTransport {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.transport.clone(),
            config.transport_args.clone(),
            config.call_timeout(),
        )
    }
}

impl Transport for CommandTransport {
    async fn call(&mut self, request: &str) -> Result<String, TransportError> {
        tracing::debug!(program = %self.program, %request, "runtime call");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(request)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let waited = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| TransportError::Timeout {
                    program: self.program.clone(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| TransportError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(TransportError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let reply = String::from_utf8(output.stdout).map_err(|_| TransportError::InvalidUtf8 {
            program: self.program.clone(),
        })?;
        tracing::debug!(bytes = reply.len(), "runtime reply");
        Ok(reply)
    }
}
