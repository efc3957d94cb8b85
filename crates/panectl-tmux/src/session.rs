//! Session handle: a validated reference to a live multiplexer session.

use crate::transport::PaneTransport;

/// Name of a tmux session the controller attaches to.
///
/// Only existence is checked here; the handle is never cached as proof that
/// the session is still alive later on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: String,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Query the live session list. Never fails: any query error is
    /// reported as "does not exist".
    pub fn exists(&self, transport: &impl PaneTransport) -> bool {
        match transport.has_session(&self.id) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(session = %self.id, %e, "session existence query failed");
                false
            }
        }
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
