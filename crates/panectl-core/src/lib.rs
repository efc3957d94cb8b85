//! panectl-core: run commands in a live tmux shell and recover their output.
//!
//! The shell gives no completion signal, so completion is inferred from
//! observed pane state (content hash, cursor, prompt shape) and the output is
//! sliced out of the scrollback between echoed sentinel lines. When the
//! sentinels cannot be found a degraded fallback chain takes over.

pub mod capability;
pub mod clock;
pub mod config;
pub mod controller;
pub mod detector;
pub mod error;
pub mod extract;
pub mod history;
pub mod lock;
pub mod marker;
pub mod prompt;
pub mod strategy;
pub mod types;

pub use capability::LocalExecCapability;
pub use clock::{Clock, SystemClock};
pub use config::ControllerConfig;
pub use controller::TmuxController;
pub use error::ControllerError;
pub use types::{ExecutionRequest, ExecutionResult, ExtractionStrategy, PaneSnapshot};
