//! panectl: drive a live tmux session from the command line.

use std::sync::Arc;

use clap::Parser;

mod cli;
mod cmd_exec;
mod context;
mod repl;

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = std::env::var("PANECTL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

/// Attach to the requested session, exiting with status 1 when it is missing.
async fn connect_or_exit(args: cli::Cli) -> anyhow::Result<Arc<context::Controller>> {
    match tokio::task::spawn_blocking(move || context::attach(&args)).await?? {
        Some(controller) => Ok(controller),
        None => std::process::exit(1),
    }
}

async fn cmd_sessions(args: &cli::Cli) -> anyhow::Result<()> {
    let transport = context::transport(args);
    let names = tokio::task::spawn_blocking(move || context::session_names(&transport)).await?;
    if names.is_empty() {
        println!("{}", context::NO_SESSIONS);
    }
    names.iter().for_each(|n| println!("{n}"));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = cli::Cli::parse();
    init_logging(args.verbose);

    let command = args.command.take().unwrap_or(cli::Command::Repl);

    match command {
        cli::Command::Repl => repl::cmd_repl(connect_or_exit(args).await?).await?,
        cli::Command::Exec(opts) => {
            cmd_exec::cmd_exec(connect_or_exit(args).await?, &opts).await?;
        }
        cli::Command::Interrupt => {
            let controller = connect_or_exit(args).await?;
            let sent = tokio::task::spawn_blocking(move || controller.interrupt()).await?;
            if !sent {
                eprintln!("Failed to send interrupt signal");
                std::process::exit(1);
            }
            println!("Sent interrupt signal (Ctrl+C)");
        }
        cli::Command::Info => {
            let controller = connect_or_exit(args).await?;
            let info = tokio::task::spawn_blocking(move || controller.session_info()).await?;
            println!("{info}");
        }
        cli::Command::Sessions => cmd_sessions(&args).await?,
    }

    Ok(())
}
