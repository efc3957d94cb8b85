//! panectl-tmux: tmux IO boundary.
//! Session existence checks, keystroke injection, pane capture, cursor and
//! history-limit queries. No completion or extraction policy lives here.

pub mod error;
pub mod executor;
pub mod session;
pub mod transport;

pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor};
pub use session::SessionHandle;
pub use transport::{Cursor, PaneTransport, TmuxTransport, parse_cursor};
