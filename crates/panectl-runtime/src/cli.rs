//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_SESSION: &str = "shrem";

#[derive(Parser, Debug)]
#[command(name = "panectl", about = "Run commands in a live tmux session")]
pub struct Cli {
    /// tmux session to drive (must already exist)
    #[arg(
        long,
        short = 't',
        global = true,
        env = "PANECTL_SESSION",
        default_value = DEFAULT_SESSION
    )]
    pub session: String,

    /// TOML file with controller tuning
    #[arg(long, global = true, env = "PANECTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default per-command timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// tmux binary
    #[arg(long, global = true, default_value = "tmux")]
    pub tmux_bin: String,

    /// tmux server socket path (-S)
    #[arg(long, short = 'S', global = true)]
    pub socket_path: Option<String>,

    /// tmux server socket name (-L)
    #[arg(long, short = 'L', global = true)]
    pub socket_name: Option<String>,

    /// Log at info level unless PANECTL_LOG/RUST_LOG say otherwise
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive prompt (default)
    Repl,
    /// Run one command and print its output
    Exec(ExecOpts),
    /// Send Ctrl-C to the session
    Interrupt,
    /// Print session/window/pane info
    Info,
    /// List live tmux sessions
    Sessions,
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct ExecOpts {
    /// Timeout in seconds for this command
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Command line; words are joined with single spaces
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl ExecOpts {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_to_repl_on_default_session() {
        let cli = parse(&["panectl"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.tmux_bin, "tmux");
        assert!(!cli.verbose);
        // PANECTL_SESSION may be set in the environment running the tests.
        if std::env::var_os("PANECTL_SESSION").is_none() {
            assert_eq!(cli.session, DEFAULT_SESSION);
        }
    }

    #[test]
    fn exec_collects_trailing_words() {
        let cli = parse(&["panectl", "-t", "work", "exec", "--timeout", "5", "ls", "-la", "/tmp"]);
        assert_eq!(cli.session, "work");
        let Some(Command::Exec(opts)) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(opts.timeout, Some(5));
        assert!(!opts.json);
        assert_eq!(opts.command_line(), "ls -la /tmp");
    }

    #[test]
    fn exec_requires_a_command() {
        assert!(Cli::try_parse_from(["panectl", "exec"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["panectl", "info", "-S", "/tmp/sock", "-v"]);
        assert_eq!(cli.command, Some(Command::Info));
        assert_eq!(cli.socket_path.as_deref(), Some("/tmp/sock"));
        assert!(cli.verbose);
    }

    #[test]
    fn json_flag() {
        let cli = parse(&["panectl", "exec", "--json", "whoami"]);
        let Some(Command::Exec(opts)) = cli.command else {
            panic!("expected exec");
        };
        assert!(opts.json);
        assert_eq!(opts.command, vec!["whoami"]);
    }
}
