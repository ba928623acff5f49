//! Syntax highlighting subprocess client.
//!
//! Highlighting is delegated to an external command (a Pygments adapter
//! by default). The wire protocol is one JSON array of requests on stdin
//! and one JSON array of responses on stdout; each response carries the
//! request's correlation id.
//!
//! ```text
//!   stdin:  [{"id": 1, "path": "a.py", "source": "...", "language": "python"}]
//!   stdout: [{"id": 1, "path": "a.py", "success": true, "html": "<pre>..."}]
//! ```
//!
//! One subprocess is spawned per batch and must finish within
//! [`HIGHLIGHT_TIMEOUT`], or it is killed and the build fails.

use serde::{Deserialize, Serialize};
use std::{
    io::{self, Read, Write},
    process::{Command, ExitStatus, Stdio},
    sync::mpsc,
    thread,
    time::Duration,
};
use thiserror::Error;

/// Wall-clock budget for one highlighter invocation.
pub const HIGHLIGHT_TIMEOUT: Duration = Duration::from_millis(7500);

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("highlighter `{0}` not found in PATH")]
    NotFound(String),

    #[error("failed to spawn highlighter `{0}`")]
    Spawn(String, #[source] io::Error),

    #[error("highlighter I/O failed")]
    Io(#[from] io::Error),

    #[error("highlighter did not respond within {0:?}")]
    Timeout(Duration),

    #[error("highlighter exited with {0}")]
    ExitStatus(ExitStatus),

    #[error("highlighter protocol violation: {0}")]
    Protocol(String),

    #[error("highlighting failed for {} snippet(s):\n{}", .0.len(), .0.join("\n"))]
    RenderFailed(Vec<String>),
}

/// One snippet to highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// Batch-unique correlation id.
    pub id: u64,
    /// Source file name, shown in highlighter error messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub source: String,
    /// Language hint; the highlighter guesses when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One highlighted snippet, correlated by `id`.
///
/// On failure `html` carries the highlighter's error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightResponse {
    pub id: u64,
    #[serde(default)]
    pub path: Option<String>,
    pub success: bool,
    pub html: String,
}

impl HighlightResponse {
    /// Label for error messages: the request path, or the id when absent.
    pub fn label(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("snippet #{}", self.id))
    }
}

/// Seam for the external highlighter, fakeable in tests.
pub trait HighlightService: Send + Sync {
    /// Highlight one batch. Must return one response per request.
    fn render_batch(
        &self,
        requests: &[HighlightRequest],
    ) -> Result<Vec<HighlightResponse>, HighlightError>;
}

// ============================================================================
// Pygments Subprocess
// ============================================================================

/// Runs the configured highlighter command, one process per batch.
pub struct PygmentsService {
    command: Vec<String>,
}

impl PygmentsService {
    /// Resolve the highlighter binary and build the service.
    ///
    /// Resolution happens here so a missing highlighter fails the build
    /// before any rendering starts.
    pub fn new(command: &[String]) -> Result<Self, HighlightError> {
        let Some(binary) = command.first() else {
            return Err(HighlightError::Protocol(
                "highlighter command is empty".into(),
            ));
        };
        let resolved = which::which(binary)
            .map_err(|_| HighlightError::NotFound(binary.clone()))?
            .to_string_lossy()
            .into_owned();

        let mut command = command.to_vec();
        command[0] = resolved;
        Ok(Self { command })
    }
}

impl HighlightService for PygmentsService {
    fn render_batch(
        &self,
        requests: &[HighlightRequest],
    ) -> Result<Vec<HighlightResponse>, HighlightError> {
        let name = self.command[0].clone();
        let mut child = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HighlightError::Spawn(name, e))?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(HighlightError::Protocol("child stdin unavailable".into()));
        };
        let Some(mut stdout) = child.stdout.take() else {
            return Err(HighlightError::Protocol("child stdout unavailable".into()));
        };

        let payload =
            serde_json::to_vec(requests).map_err(|e| HighlightError::Protocol(e.to_string()))?;
        stdin.write_all(&payload)?;
        // Close stdin to signal end of input, otherwise the child blocks
        drop(stdin);

        // read_to_string blocks until EOF, so the timeout has to live on
        // a channel fed by a dedicated reader thread
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(HIGHLIGHT_TIMEOUT) {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HighlightError::Timeout(HIGHLIGHT_TIMEOUT));
            }
        };

        let status = child.wait()?;
        if !status.success() {
            return Err(HighlightError::ExitStatus(status));
        }

        serde_json::from_str(&output)
            .map_err(|e| HighlightError::Protocol(format!("unparseable response: {e}")))
    }
}
