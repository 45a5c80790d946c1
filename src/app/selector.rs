//! Interactive selector capability and the external-program implementation.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Exit codes fzf-style selectors use for "no match" and "interrupted".
const CANCEL_EXIT_CODES: &[i32] = &[1, 130];

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("failed to start selector `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lost contact with selector `{program}`")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("selector `{program}` failed ({status})")]
    Failed { program: String, status: String },
    #[error("terminal error")]
    Terminal(#[from] std::io::Error),
}

/// Shows `candidates` to the user and returns the chosen line, or `None`
/// when the user cancels.
#[allow(async_fn_in_trait)]
pub trait Selector {
    async fn select(&mut self, candidates: &[String]) -> Result<Option<String>, SelectorError>;
}

/// Pipes candidates, one per line, into an external program and reads the
/// chosen line back from its stdout.
#[derive(Debug, Clone)]
pub struct CommandSelector {
    program: String,
    args: Vec<String>,
}

impl CommandSelector {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Selector for CommandSelector {
    async fn select(&mut self, candidates: &[String]) -> Result<Option<String>, SelectorError> {
        tracing::debug!(program = %self.program, count = candidates.len(), "starting selector");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SelectorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut input = candidates.join("\n");
        input.push('\n');
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A selector that exits early closes the pipe; that is not
                // an error, the exit status tells us what happened.
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    tracing::debug!("selector stopped reading input: {e}");
                }
            }
        };
        let (_, waited) = tokio::join!(feed, child.wait_with_output());
        let output = waited.map_err(|source| SelectorError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            if output
                .status
                .code()
                .is_some_and(|code| CANCEL_EXIT_CODES.contains(&code))
            {
                return Ok(None);
            }
            return Err(SelectorError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        Ok(parse_choice(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// First output line, without its line terminator.  Empty output means
/// nothing was chosen.
fn parse_choice(stdout: &str) -> Option<String> {
    let line = stdout.lines().next()?;
    (!line.is_empty()).then(|| line.to_string())
}
