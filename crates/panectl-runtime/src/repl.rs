//! `panectl repl`: interactive driver over one session.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cmd_exec::run_interruptible;
use crate::context::Controller;

const PROMPT: &str = "Command > ";
const TIMEOUT_USAGE: &str = "Usage: timeout <seconds> <command>";
const CTRL_C_HINT: &str = "Use 'exit' to quit or 'interrupt' to stop current command.";
const NO_OUTPUT: &str = "(No output or command completed silently)";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Blank,
    Exit,
    Interrupt,
    Info,
    /// `timeout` with missing or non-numeric arguments.
    Usage,
    Run {
        command: String,
        timeout_secs: Option<u64>,
    },
}

pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Blank;
    }
    match line.to_lowercase().as_str() {
        "exit" | "quit" => return ReplCommand::Exit,
        "interrupt" => return ReplCommand::Interrupt,
        "info" => return ReplCommand::Info,
        _ => {}
    }

    let Some(rest) = line.strip_prefix("timeout ") else {
        return ReplCommand::Run {
            command: line.to_string(),
            timeout_secs: None,
        };
    };
    let Some((secs, command)) = rest.trim_start().split_once(' ') else {
        return ReplCommand::Usage;
    };
    match secs.parse::<u64>() {
        Ok(secs) if !command.trim().is_empty() => ReplCommand::Run {
            command: command.trim().to_string(),
            timeout_secs: Some(secs),
        },
        _ => ReplCommand::Usage,
    }
}

fn banner(controller: &Controller) {
    println!("=== tmux shell controller ===");
    println!("Connected to tmux session '{}'", controller.session());
    println!("{}", controller.session_info());
    println!();
    println!("Commands:");
    println!("  exit/quit            - Exit the controller");
    println!("  interrupt            - Send Ctrl+C to current command");
    println!("  timeout <sec> <cmd>  - Run command with specific timeout");
    println!("  info                 - Show session information");
    println!();
}

fn show_prompt() {
    print!("{PROMPT}");
    let _ = std::io::stdout().flush();
}

pub async fn cmd_repl(controller: Arc<Controller>) -> anyhow::Result<()> {
    banner(&controller);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        show_prompt();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{CTRL_C_HINT}");
                continue;
            }
        };
        // EOF
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_line(&line) {
            ReplCommand::Blank => continue,
            ReplCommand::Exit => break,
            ReplCommand::Interrupt => {
                let ctl = Arc::clone(&controller);
                if tokio::task::spawn_blocking(move || ctl.interrupt()).await? {
                    println!("Sent interrupt signal (Ctrl+C)");
                } else {
                    println!("Failed to send interrupt signal");
                }
            }
            ReplCommand::Info => {
                let ctl = Arc::clone(&controller);
                println!("{}", tokio::task::spawn_blocking(move || ctl.session_info()).await?);
            }
            ReplCommand::Usage => println!("{TIMEOUT_USAGE}"),
            ReplCommand::Run {
                command,
                timeout_secs,
            } => {
                let timeout = match timeout_secs {
                    Some(secs) => {
                        println!("Running with {secs}s timeout: {command}");
                        Duration::from_secs(secs)
                    }
                    None => controller.config().timeout(),
                };
                let started = Instant::now();
                let result = match run_interruptible(&controller, command, timeout).await {
                    Ok(result) => result,
                    Err(e) => {
                        println!("[Error] {e}");
                        println!("Continuing...");
                        continue;
                    }
                };
                println!(
                    "=== Output (completed in {:.1}s) ===",
                    started.elapsed().as_secs_f64()
                );
                if result.stdout.is_empty() {
                    println!("{NO_OUTPUT}");
                } else {
                    println!("{}", result.stdout);
                }
                println!();
            }
        }
    }
    Ok(())
}
