//! Request/result types shared by the strategies and the controller facade.

use std::time::Duration;

use panectl_tmux::Cursor;
use serde::Serialize;

/// A command to deliver to the session, with its completion timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command: String,
    pub timeout: Duration,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Whitespace-only commands never reach the transport.
    pub fn is_blank(&self) -> bool {
        self.command.trim().is_empty()
    }
}

/// Which step of the fallback chain produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Sliced between the primary start/end markers.
    Markers,
    /// Sliced between the fallback clear/end markers.
    Fallback,
    /// Heuristic backward scan, or the capture tail.
    RecentOutput,
    /// The fallback itself failed; `stdout` holds the error text.
    Error,
    /// Blank command, nothing was sent.
    Skipped,
}

/// Output of one command.
///
/// `stderr` is always empty and `exit_code` always 0: the pane interleaves
/// both streams and exposes no exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Completion was never confirmed; the output may be partial.
    pub timed_out: bool,
    pub strategy: ExtractionStrategy,
}

impl ExecutionResult {
    pub fn new(stdout: String, strategy: ExtractionStrategy, timed_out: bool) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
            timed_out,
            strategy,
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), ExtractionStrategy::Skipped, false)
    }
}

/// Point-in-time read of the pane used for stability comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSnapshot {
    pub text: String,
    pub cursor: Option<Cursor>,
}

impl PaneSnapshot {
    pub fn new(text: impl Into<String>, cursor: Option<Cursor>) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }

    /// Last line with non-whitespace content, trimmed.
    pub fn last_non_blank_line(&self) -> Option<&str> {
        self.text
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }
}
