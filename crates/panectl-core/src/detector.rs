//! Completion detector: decides when a command sent to the pane has finished.
//!
//! States: `Waiting -> StablePending -> Done`, with `TimedOut` decided by the
//! wait loop. A poll is "stable" when both the content hash and the cursor
//! equal the previous poll and the cursor could be read at all. Completion
//! requires enough consecutive stable polls to cover the stabilization window
//! *and* a prompt-shaped last line.
//!
//! `update` is a pure function over snapshots so the heuristics can be tested
//! against captured fixtures; `wait_for_completion` drives it against a live
//! transport.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use panectl_tmux::{Cursor, PaneTransport, TmuxError};

use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::prompt::match_prompt;
use crate::types::PaneSnapshot;

/// Progress is logged once per this many seconds of waiting.
const PROGRESS_EVERY_SECS: u64 = 10;
/// No progress logging before this much waiting.
const PROGRESS_AFTER_SECS: u64 = 5;

/// Parameters for one wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorRules {
    pub required_stable_ticks: u32,
    /// Command being waited for. A last line that still ends with it is the
    /// un-returned command echo, not a fresh prompt.
    pub pending_command: Option<String>,
}

impl DetectorRules {
    pub fn new(required_stable_ticks: u32, pending_command: Option<&str>) -> Self {
        Self {
            required_stable_ticks: required_stable_ticks.max(1),
            pending_command: pending_command
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        }
    }
}

/// Stability bookkeeping carried between polls of one wait loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilityState {
    pub last_hash: Option<u64>,
    pub last_cursor: Option<Cursor>,
    pub consecutive_stable: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Output or cursor changed (or cursor unreadable) since the last poll.
    Waiting,
    /// Unchanged, but the window is not covered yet or no prompt is visible.
    StablePending,
    Done,
}

/// Result of a full wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Done { elapsed: Duration },
    TimedOut { elapsed: Duration },
}

impl WaitOutcome {
    pub fn timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut { .. })
    }
}

pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Fold one snapshot into the stability state.
pub fn update(
    state: &StabilityState,
    snapshot: &PaneSnapshot,
    rules: &DetectorRules,
) -> (StabilityState, CompletionState) {
    let hash = content_hash(&snapshot.text);
    let stable = snapshot.cursor.is_some()
        && state.last_hash == Some(hash)
        && state.last_cursor == snapshot.cursor;

    let consecutive_stable = if stable {
        state.consecutive_stable.saturating_add(1)
    } else {
        0
    };

    let next = StabilityState {
        last_hash: Some(hash),
        last_cursor: snapshot.cursor,
        consecutive_stable,
    };

    let completion = if consecutive_stable == 0 {
        CompletionState::Waiting
    } else if consecutive_stable >= rules.required_stable_ticks && prompt_visible(snapshot, rules)
    {
        CompletionState::Done
    } else {
        CompletionState::StablePending
    };

    (next, completion)
}

fn prompt_visible(snapshot: &PaneSnapshot, rules: &DetectorRules) -> bool {
    let Some(last) = snapshot.last_non_blank_line() else {
        return false;
    };
    if let Some(cmd) = rules.pending_command.as_deref()
        && last.ends_with(cmd)
    {
        return false;
    }
    match_prompt(last).is_some()
}

/// Poll `session` until the detector reports `Done` or `timeout` elapses.
///
/// Timing out is not an error. Transport failures while capturing are.
pub fn wait_for_completion<T, C>(
    transport: &T,
    clock: &C,
    session: &str,
    command: &str,
    timeout: Duration,
    config: &ControllerConfig,
) -> Result<WaitOutcome, TmuxError>
where
    T: PaneTransport + ?Sized,
    C: Clock + ?Sized,
{
    let rules = DetectorRules::new(config.required_stable_ticks(), Some(command));
    let interval = config.poll_interval();
    let start = clock.now();
    let mut state = StabilityState::default();
    let mut last_progress_bucket = 0;

    tracing::debug!(session, timeout_secs = timeout.as_secs_f64(), "waiting for command completion");

    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= timeout {
            tracing::warn!(
                session,
                timeout_secs = timeout.as_secs_f64(),
                "command timed out; output may be incomplete"
            );
            return Ok(WaitOutcome::TimedOut { elapsed });
        }

        let text = transport.capture_pane(session, config.poll_capture_lines)?;
        let cursor = transport.cursor_position(session);
        let snapshot = PaneSnapshot::new(text, cursor);

        let (next, completion) = update(&state, &snapshot, &rules);
        state = next;
        tracing::debug!(
            session,
            ?completion,
            stable = state.consecutive_stable,
            "poll tick"
        );

        if completion == CompletionState::Done {
            let elapsed = clock.now().saturating_sub(start);
            tracing::debug!(session, elapsed_secs = elapsed.as_secs_f64(), "prompt detected");
            return Ok(WaitOutcome::Done { elapsed });
        }

        let secs = elapsed.as_secs();
        let bucket = secs / PROGRESS_EVERY_SECS;
        if secs > PROGRESS_AFTER_SECS && bucket > last_progress_bucket {
            last_progress_bucket = bucket;
            tracing::info!(session, elapsed_secs = secs, "still waiting");
        }

        clock.sleep(interval);
    }
}
