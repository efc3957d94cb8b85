//! Error types for the tmux backend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    #[error("tmux not found")]
    NotFound,

    #[error("tmux io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tmux output: {0}")]
    Parse(String),
}
