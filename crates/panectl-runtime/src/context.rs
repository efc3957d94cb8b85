//! Wiring from CLI options to a connected controller.

use std::sync::Arc;

use anyhow::Context as _;
use panectl_core::{ControllerConfig, ControllerError, TmuxController};
use panectl_tmux::{PaneTransport, TmuxExecutor, TmuxTransport};

use crate::cli::Cli;

pub type Transport = TmuxTransport<TmuxExecutor>;
pub type Controller = TmuxController<Transport>;

pub fn transport(cli: &Cli) -> Transport {
    let mut executor = TmuxExecutor::new(&cli.tmux_bin);
    if let Some(path) = &cli.socket_path {
        executor = executor.with_socket_path(path);
    }
    if let Some(name) = &cli.socket_name {
        executor = executor.with_socket_name(name);
    }
    TmuxTransport::new(executor)
}

/// Config file (if any), then CLI overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    Ok(config)
}

/// Connect to the session named on the command line. `Ok(None)` when the
/// session does not exist; the reason and the live sessions are already
/// printed to stderr.
pub fn attach(cli: &Cli) -> anyhow::Result<Option<Arc<Controller>>> {
    let config = load_config(cli)?;
    match Controller::connect(transport(cli), cli.session.as_str(), config) {
        Ok(controller) => Ok(Some(Arc::new(controller))),
        Err(e @ ControllerError::SessionNotFound(_)) => {
            eprintln!("Error: {e}");
            eprintln!("{}", available_sessions(&transport(cli)));
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub const NO_SESSIONS: &str = "No tmux sessions found.";

/// Live session names. A failed query (usually no server running) reads as
/// no sessions.
pub fn session_names(transport: &impl PaneTransport) -> Vec<String> {
    transport.list_sessions().unwrap_or_else(|e| {
        tracing::debug!(%e, "list-sessions failed");
        Vec::new()
    })
}

/// Human-readable list of live sessions.
pub fn available_sessions(transport: &impl PaneTransport) -> String {
    let names = session_names(transport);
    if names.is_empty() {
        return NO_SESSIONS.to_string();
    }
    let mut out = String::from("Available sessions:");
    for name in names {
        out.push_str("\n  ");
        out.push_str(&name);
    }
    out
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use panectl_tmux::{TmuxCommandRunner, TmuxError};

    use super::*;

    struct Listing(Result<&'static str, fn() -> TmuxError>);

    impl TmuxCommandRunner for Listing {
        fn run(&self, _args: &[&str]) -> Result<String, TmuxError> {
            self.0.map(String::from).map_err(|f| f())
        }
    }

    #[test]
    fn lists_live_sessions() {
        let t = TmuxTransport::new(Listing(Ok("main\nshrem\n")));
        assert_eq!(available_sessions(&t), "Available sessions:\n  main\n  shrem");
    }

    #[test]
    fn no_server_means_no_sessions() {
        let t = TmuxTransport::new(Listing(Err(|| {
            TmuxError::CommandFailed("exit code 1: no server running".into())
        })));
        assert!(session_names(&t).is_empty());
        assert_eq!(available_sessions(&t), NO_SESSIONS);
    }

    #[test]
    fn session_names_are_one_per_line() {
        let t = TmuxTransport::new(Listing(Ok("main\nshrem\n")));
        assert_eq!(session_names(&t), vec!["main", "shrem"]);
    }

    #[test]
    fn empty_server_means_no_sessions() {
        let t = TmuxTransport::new(Listing(Ok("")));
        assert!(session_names(&t).is_empty());
        assert_eq!(available_sessions(&t), NO_SESSIONS);
    }

    #[test]
    fn cli_timeout_overrides_config() {
        let cli = Cli::try_parse_from(["panectl", "--timeout-secs", "42"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.timeout_secs, 42);
        assert_eq!(config.poll_interval_ms, ControllerConfig::default().poll_interval_ms);
    }
}
