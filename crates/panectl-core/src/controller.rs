//! Controller facade: attach to an existing session, run commands, interrupt.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use panectl_tmux::{PaneTransport, SessionHandle};

use crate::clock::{Clock, SystemClock};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::lock;
use crate::strategy::Steps;
use crate::types::{ExecutionRequest, ExecutionResult};

/// Shown by `session_info` when tmux cannot be queried.
pub const SESSION_INFO_UNAVAILABLE: &str = "Session info unavailable";

/// Reliable command execution against one live tmux session.
///
/// Commands on the same session id are serialized process-wide; `interrupt`
/// bypasses that lock so it can reach a command that is still running.
pub struct TmuxController<T, C = SystemClock> {
    transport: T,
    clock: C,
    session: SessionHandle,
    config: ControllerConfig,
    run_lock: Arc<Mutex<()>>,
}

impl<T: PaneTransport> TmuxController<T, SystemClock> {
    /// Attach to an existing session. Fails before anything is sent when the
    /// session does not exist.
    pub fn connect(
        transport: T,
        session: impl Into<String>,
        config: ControllerConfig,
    ) -> Result<Self, ControllerError> {
        Self::connect_with_clock(transport, SystemClock::new(), session, config)
    }
}

impl<T: PaneTransport, C: Clock> TmuxController<T, C> {
    pub fn connect_with_clock(
        transport: T,
        clock: C,
        session: impl Into<String>,
        config: ControllerConfig,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let session = SessionHandle::new(session);
        if !session.exists(&transport) {
            return Err(ControllerError::SessionNotFound(session.id().to_string()));
        }
        tracing::info!(session = session.id(), "connected to existing tmux session");

        let run_lock = lock::session_lock(session.id());
        Ok(Self {
            transport,
            clock,
            session,
            config,
            run_lock,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Live re-check of the session list.
    pub fn exists(&self) -> bool {
        self.session.exists(&self.transport)
    }

    /// Run with the configured default timeout.
    pub fn run(&self, command: &str) -> ExecutionResult {
        self.run_with_timeout(command, self.config.timeout())
    }

    /// Run `command` and return its output. Always yields a result; transport
    /// trouble surfaces as fallback output or an error string in `stdout`.
    pub fn run_with_timeout(&self, command: &str, timeout: Duration) -> ExecutionResult {
        let request = ExecutionRequest::new(command, timeout);
        if request.is_blank() {
            return ExecutionResult::empty();
        }

        let _serialized = lock::acquire(&self.run_lock);
        let started = self.clock.now();
        let result = self.steps().execute(&request);
        tracing::debug!(
            session = self.session.id(),
            strategy = ?result.strategy,
            timed_out = result.timed_out,
            elapsed_secs = self.clock.now().saturating_sub(started).as_secs_f64(),
            "command finished"
        );
        result
    }

    /// Best-effort Ctrl-C. Returns whether the keystroke was delivered.
    pub fn interrupt(&self) -> bool {
        match self.transport.send_interrupt(self.session.id()) {
            Ok(()) => {
                self.clock
                    .sleep(Duration::from_millis(self.config.interrupt_settle_ms));
                true
            }
            Err(e) => {
                tracing::warn!(session = self.session.id(), %e, "failed to send interrupt");
                false
            }
        }
    }

    /// Human-readable session/window/pane description. Diagnostic only.
    pub fn session_info(&self) -> String {
        self.transport
            .session_info(self.session.id())
            .unwrap_or_else(|e| {
                tracing::debug!(session = self.session.id(), %e, "session info query failed");
                SESSION_INFO_UNAVAILABLE.to_string()
            })
    }

    fn steps(&self) -> Steps<'_, T, C> {
        Steps {
            transport: &self.transport,
            clock: &self.clock,
            session: self.session.id(),
            config: &self.config,
        }
    }
}
