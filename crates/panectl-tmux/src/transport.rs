//! Pane transport: the primitive operations the controller performs against a
//! multiplexer session. Pure IO, no policy.

use std::borrow::Cow;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Format string for `display-message` cursor queries.
const CURSOR_FORMAT: &str = "#{cursor_x},#{cursor_y}";

/// Format string for session diagnostics.
const SESSION_INFO_FORMAT: &str =
    "Session: #{session_name}, Window: #{window_name}, Pane: #{pane_index}";

/// Cursor position inside the visible pane (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub x: u32,
    pub y: u32,
}

/// Primitive operations against a live terminal session.
///
/// `cursor_position` is the only infallible query: an unreadable cursor is
/// reported as `None` and treated as "cannot confirm stability" upstream.
pub trait PaneTransport: Send + Sync {
    /// `Ok(false)` when the multiplexer answers that the session is absent.
    fn has_session(&self, session: &str) -> Result<bool, TmuxError>;

    fn list_sessions(&self) -> Result<Vec<String>, TmuxError>;

    /// Type `text` literally into the session, then press Enter if `submit`.
    fn send_keys(&self, session: &str, text: &str, submit: bool) -> Result<(), TmuxError>;

    /// Send Ctrl-C.
    fn send_interrupt(&self, session: &str) -> Result<(), TmuxError>;

    /// Visible pane plus up to `scrollback_lines` of history, newest last.
    fn capture_pane(&self, session: &str, scrollback_lines: u32) -> Result<String, TmuxError>;

    fn cursor_position(&self, session: &str) -> Option<Cursor>;

    /// Session-local history limit, `None` when the session inherits the
    /// global value.
    fn history_limit(&self, session: &str) -> Result<Option<u32>, TmuxError>;

    /// `Some(n)` sets a session-local limit, `None` removes the override.
    fn set_history_limit(&self, session: &str, limit: Option<u32>) -> Result<(), TmuxError>;

    fn session_info(&self, session: &str) -> Result<String, TmuxError>;
}

impl<T: PaneTransport + ?Sized> PaneTransport for &T {
    fn has_session(&self, session: &str) -> Result<bool, TmuxError> {
        (**self).has_session(session)
    }

    fn list_sessions(&self) -> Result<Vec<String>, TmuxError> {
        (**self).list_sessions()
    }

    fn send_keys(&self, session: &str, text: &str, submit: bool) -> Result<(), TmuxError> {
        (**self).send_keys(session, text, submit)
    }

    fn send_interrupt(&self, session: &str) -> Result<(), TmuxError> {
        (**self).send_interrupt(session)
    }

    fn capture_pane(&self, session: &str, scrollback_lines: u32) -> Result<String, TmuxError> {
        (**self).capture_pane(session, scrollback_lines)
    }

    fn cursor_position(&self, session: &str) -> Option<Cursor> {
        (**self).cursor_position(session)
    }

    fn history_limit(&self, session: &str) -> Result<Option<u32>, TmuxError> {
        (**self).history_limit(session)
    }

    fn set_history_limit(&self, session: &str, limit: Option<u32>) -> Result<(), TmuxError> {
        (**self).set_history_limit(session, limit)
    }

    fn session_info(&self, session: &str) -> Result<String, TmuxError> {
        (**self).session_info(session)
    }
}

/// `PaneTransport` backed by tmux subcommands.
pub struct TmuxTransport<R> {
    runner: R,
}

impl<R: TmuxCommandRunner> TmuxTransport<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: TmuxCommandRunner> PaneTransport for TmuxTransport<R> {
    fn has_session(&self, session: &str) -> Result<bool, TmuxError> {
        match self.runner.run(&["has-session", "-t", session]) {
            Ok(_) => Ok(true),
            Err(TmuxError::CommandFailed(detail)) => {
                tracing::debug!(session, %detail, "has-session reported absent");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn list_sessions(&self) -> Result<Vec<String>, TmuxError> {
        let output = self
            .runner
            .run(&["list-sessions", "-F", "#{session_name}"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn send_keys(&self, session: &str, text: &str, submit: bool) -> Result<(), TmuxError> {
        // `-l` keeps tmux from interpreting words like "Enter" or "C-c" in
        // the payload as key names.
        if !text.is_empty() {
            let payload = escape_trailing_semicolon(text);
            self.runner
                .run(&["send-keys", "-t", session, "-l", "--", &*payload])?;
        }
        if submit {
            self.runner.run(&["send-keys", "-t", session, "Enter"])?;
        }
        Ok(())
    }

    fn send_interrupt(&self, session: &str) -> Result<(), TmuxError> {
        self.runner.run(&["send-keys", "-t", session, "C-c"])?;
        Ok(())
    }

    fn capture_pane(&self, session: &str, scrollback_lines: u32) -> Result<String, TmuxError> {
        let start_line = format!("-{scrollback_lines}");
        self.runner
            .run(&["capture-pane", "-p", "-t", session, "-S", &start_line])
    }

    fn cursor_position(&self, session: &str) -> Option<Cursor> {
        match self
            .runner
            .run(&["display-message", "-p", "-t", session, CURSOR_FORMAT])
        {
            Ok(out) => parse_cursor(&out),
            Err(e) => {
                tracing::debug!(session, %e, "cursor query failed");
                None
            }
        }
    }

    fn history_limit(&self, session: &str) -> Result<Option<u32>, TmuxError> {
        let out = self
            .runner
            .run(&["show-options", "-t", session, "-v", "history-limit"])?;
        let value = out.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| TmuxError::Parse(format!("invalid history-limit '{value}'")))
    }

    fn set_history_limit(&self, session: &str, limit: Option<u32>) -> Result<(), TmuxError> {
        match limit {
            Some(n) => {
                let n = n.to_string();
                self.runner
                    .run(&["set-option", "-t", session, "history-limit", &n])?;
            }
            None => {
                self.runner
                    .run(&["set-option", "-u", "-t", session, "history-limit"])?;
            }
        }
        Ok(())
    }

    fn session_info(&self, session: &str) -> Result<String, TmuxError> {
        let out = self
            .runner
            .run(&["display-message", "-p", "-t", session, SESSION_INFO_FORMAT])?;
        Ok(out.trim().to_string())
    }
}

/// Parse `"<x>,<y>"` as printed by `#{cursor_x},#{cursor_y}`.
/// tmux reads an argument ending in `;` as a command separator and drops the
/// `;`. A trailing `\;` is passed through as a literal semicolon.
fn escape_trailing_semicolon(text: &str) -> Cow<'_, str> {
    match text.strip_suffix(';') {
        Some(head) => Cow::Owned(format!("{head}\\;")),
        None => Cow::Borrowed(text),
    }
}

pub fn parse_cursor(raw: &str) -> Option<Cursor> {
    let (x, y) = raw.trim().split_once(',')?;
    Some(Cursor {
        x: x.trim().parse().ok()?,
        y: y.trim().parse().ok()?,
    })
}
