//! Scoped widening of a session's `history-limit`.
//!
//! The limit is a shared, persistent session option. The guard records the
//! session-local value before raising it and puts it back on drop, so every
//! exit path (normal return, early return, unwinding) restores it.

use panectl_tmux::PaneTransport;

pub struct HistoryLimitGuard<'a, T: PaneTransport + ?Sized> {
    transport: &'a T,
    session: &'a str,
    /// Session-local value seen before raising; `None` inside means the
    /// session inherited the global limit. Outer `None`: nothing changed.
    restore_to: Option<Option<u32>>,
}

impl<'a, T: PaneTransport + ?Sized> HistoryLimitGuard<'a, T> {
    /// Raise the limit to `limit`. Best-effort: when the current value cannot
    /// be read or the new one cannot be set, the session is left untouched.
    pub fn raise(transport: &'a T, session: &'a str, limit: u32) -> Self {
        let mut guard = Self {
            transport,
            session,
            restore_to: None,
        };

        let previous = match transport.history_limit(session) {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(session, %e, "cannot read history-limit; leaving it unchanged");
                return guard;
            }
        };

        match transport.set_history_limit(session, Some(limit)) {
            Ok(()) => {
                tracing::debug!(session, limit, ?previous, "history-limit raised");
                guard.restore_to = Some(previous);
            }
            Err(e) => tracing::warn!(session, limit, %e, "failed to raise history-limit"),
        }
        guard
    }

    /// Whether the limit was actually changed and will be restored.
    pub fn is_active(&self) -> bool {
        self.restore_to.is_some()
    }
}

impl<T: PaneTransport + ?Sized> Drop for HistoryLimitGuard<'_, T> {
    fn drop(&mut self) {
        let Some(previous) = self.restore_to.take() else {
            return;
        };
        match self.transport.set_history_limit(self.session, previous) {
            Ok(()) => tracing::debug!(session = self.session, ?previous, "history-limit restored"),
            Err(e) => tracing::warn!(session = self.session, %e, "failed to restore history-limit"),
        }
    }
}
