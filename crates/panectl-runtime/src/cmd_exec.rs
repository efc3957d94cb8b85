//! `panectl exec`: one-shot run.

use std::sync::Arc;
use std::time::Duration;

use panectl_core::ExecutionResult;

use crate::cli::ExecOpts;
use crate::context::Controller;

/// Run `command` on the blocking pool. Ctrl-C meanwhile is forwarded to the
/// session as an interrupt and the run is still awaited, so whatever the
/// command printed before stopping is returned.
pub async fn run_interruptible(
    controller: &Arc<Controller>,
    command: String,
    timeout: Duration,
) -> anyhow::Result<ExecutionResult> {
    let worker = Arc::clone(controller);
    let mut task =
        tokio::task::spawn_blocking(move || worker.run_with_timeout(&command, timeout));

    loop {
        tokio::select! {
            joined = &mut task => return Ok(joined?),
            _ = tokio::signal::ctrl_c() => {
                eprintln!();
                eprintln!("Interrupting current command...");
                let ctl = Arc::clone(controller);
                if !tokio::task::spawn_blocking(move || ctl.interrupt()).await? {
                    eprintln!("Failed to send interrupt signal");
                }
            }
        }
    }
}

/// Output for a finished run: the JSON result, or stdout when non-empty.
pub fn render(result: &ExecutionResult, json: bool) -> anyhow::Result<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string_pretty(result)?));
    }
    Ok((!result.stdout.is_empty()).then(|| result.stdout.clone()))
}

pub async fn cmd_exec(controller: Arc<Controller>, opts: &ExecOpts) -> anyhow::Result<()> {
    let timeout = opts
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| controller.config().timeout());

    let result = run_interruptible(&controller, opts.command_line(), timeout).await?;
    if result.timed_out {
        tracing::warn!(timeout_secs = timeout.as_secs(), "command did not finish before the timeout");
    }
    if let Some(out) = render(&result, opts.json)? {
        println!("{out}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use panectl_core::ExtractionStrategy;

    use super::*;

    #[test]
    fn plain_output_is_stdout() {
        let r = ExecutionResult::new("hello".into(), ExtractionStrategy::Markers, false);
        assert_eq!(render(&r, false).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn empty_output_prints_nothing() {
        let r = ExecutionResult::new(String::new(), ExtractionStrategy::Markers, false);
        assert_eq!(render(&r, false).unwrap(), None);
    }

    #[test]
    fn json_output_carries_every_field() {
        let r = ExecutionResult::new("partial".into(), ExtractionStrategy::RecentOutput, true);
        let out = render(&r, true).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["stdout"], "partial");
        assert_eq!(v["stderr"], "");
        assert_eq!(v["exit_code"], 0);
        assert_eq!(v["timed_out"], true);
        assert_eq!(v["strategy"], "recent_output");
    }
}
