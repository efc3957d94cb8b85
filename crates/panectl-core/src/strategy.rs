//! Execution strategies: marker-delimited (primary) and clear-and-rescan
//! (fallback), composed from the same send/wait/capture steps.
//!
//! The fallback re-sends the command. When the primary strategy fails after
//! the command was already delivered, the command runs twice.

use std::time::Duration;

use panectl_tmux::{PaneTransport, TmuxError};

use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::detector::{WaitOutcome, wait_for_completion};
use crate::extract::{extract_recent_output, slice_between_markers, slice_fallback};
use crate::history::HistoryLimitGuard;
use crate::marker::{Marker, MarkerKind};
use crate::types::{ExecutionRequest, ExecutionResult, ExtractionStrategy};

/// Shared steps over one session.
pub struct Steps<'a, T: ?Sized, C: ?Sized> {
    pub transport: &'a T,
    pub clock: &'a C,
    pub session: &'a str,
    pub config: &'a ControllerConfig,
}

impl<T, C> Steps<'_, T, C>
where
    T: PaneTransport + ?Sized,
    C: Clock + ?Sized,
{
    fn send_line(&self, text: &str) -> Result<(), TmuxError> {
        self.transport.send_keys(self.session, text, true)
    }

    fn pause(&self, ms: u64) {
        self.clock.sleep(Duration::from_millis(ms));
    }

    /// Echo `marker` and give the shell `delay_ms` to render it.
    pub fn emit_marker(&self, marker: &Marker, delay_ms: u64) -> Result<(), TmuxError> {
        self.send_line(&marker.echo_command())?;
        self.pause(delay_ms);
        Ok(())
    }

    /// Send the command and block until it completes or times out.
    pub fn send_and_wait(&self, command: &str, timeout: Duration) -> Result<WaitOutcome, TmuxError> {
        self.send_line(command)?;
        wait_for_completion(
            self.transport,
            self.clock,
            self.session,
            command,
            timeout,
            self.config,
        )
    }

    /// Capture with the deep scrollback used for extraction.
    pub fn capture_full(&self) -> Result<String, TmuxError> {
        self.transport
            .capture_pane(self.session, self.config.final_capture_lines)
    }

    /// Primary strategy. `Ok(None)` when the markers cannot be located in the
    /// final capture.
    pub fn run_with_markers(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Option<ExecutionResult>, TmuxError> {
        let start = Marker::generate(MarkerKind::Start);
        let end = Marker::generate(MarkerKind::End);

        self.emit_marker(&start, self.config.marker_delay_ms)?;

        tracing::info!(session = self.session, command = %request.command, "executing");
        let outcome = self.send_and_wait(&request.command, request.timeout)?;
        if outcome.timed_out() {
            tracing::warn!(session = self.session, "command may not have completed fully");
        }

        self.emit_marker(&end, self.config.end_marker_delay_ms)?;
        let capture = self.capture_full()?;

        match slice_between_markers(&capture, start.token(), end.token(), &request.command) {
            Some(stdout) => Ok(Some(ExecutionResult::new(
                stdout,
                ExtractionStrategy::Markers,
                outcome.timed_out(),
            ))),
            None => {
                tracing::warn!(
                    session = self.session,
                    start = start.token(),
                    end = end.token(),
                    "markers not found in capture"
                );
                Ok(None)
            }
        }
    }

    /// Fallback strategy. Never fails: transport errors become the result
    /// text. The history limit is widened for the duration of the call and
    /// restored on every exit path.
    pub fn run_fallback(&self, request: &ExecutionRequest) -> ExecutionResult {
        tracing::info!(session = self.session, "using fallback method");
        let _history = HistoryLimitGuard::raise(
            self.transport,
            self.session,
            self.config.fallback_history_limit,
        );

        match self.fallback_steps(request) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(session = self.session, %e, "fallback method error");
                ExecutionResult::new(
                    format!("Error executing command: {e}"),
                    ExtractionStrategy::Error,
                    false,
                )
            }
        }
    }

    fn fallback_steps(&self, request: &ExecutionRequest) -> Result<ExecutionResult, TmuxError> {
        self.send_line("clear")?;
        self.pause(self.config.clear_delay_ms);

        let clear = Marker::generate(MarkerKind::Clear);
        self.emit_marker(&clear, self.config.clear_delay_ms)?;

        tracing::info!(session = self.session, command = %request.command, "fallback executing");
        let outcome = self.send_and_wait(&request.command, request.timeout)?;

        let end = Marker::generate(MarkerKind::FallbackEnd);
        self.emit_marker(&end, self.config.fallback_end_delay_ms)?;
        let capture = self.capture_full()?;

        if let Some(stdout) = slice_fallback(&capture, clear.token(), end.token(), &request.command)
        {
            return Ok(ExecutionResult::new(
                stdout,
                ExtractionStrategy::Fallback,
                outcome.timed_out(),
            ));
        }

        tracing::warn!(session = self.session, "could not find markers in output");
        let stdout = extract_recent_output(&capture, &request.command, self.config.recent_lines);
        Ok(ExecutionResult::new(
            stdout,
            ExtractionStrategy::RecentOutput,
            outcome.timed_out(),
        ))
    }

    /// Markers first, fallback chain on any extraction or transport failure.
    ///
    /// `request.timeout` bounds the whole call: the fallback only waits for
    /// whatever the primary strategy left unused.
    pub fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let started = self.clock.now();
        match self.run_with_markers(request) {
            Ok(Some(result)) => result,
            Ok(None) => self.run_fallback(&self.remaining(request, started)),
            Err(e) => {
                tracing::warn!(session = self.session, %e, "primary method failed");
                self.run_fallback(&self.remaining(request, started))
            }
        }
    }

    fn remaining(&self, request: &ExecutionRequest, started: Duration) -> ExecutionRequest {
        let spent = self.clock.now().saturating_sub(started);
        let left = request.timeout.saturating_sub(spent);
        tracing::debug!(
            session = self.session,
            remaining_secs = left.as_secs_f64(),
            "fallback wait budget"
        );
        ExecutionRequest::new(request.command.clone(), left)
    }
}
