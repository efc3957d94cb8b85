//! Controller error taxonomy.

use panectl_tmux::TmuxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// Fatal: the target session is not in the live session list.
    #[error(
        "tmux session '{0}' does not exist. Please create it first or use an existing session name."
    )]
    SessionNotFound(String),

    #[error(transparent)]
    Transport(#[from] TmuxError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
