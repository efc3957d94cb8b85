//! Simulated shell behind `PaneTransport`, driven by a virtual clock.
//!
//! The simulation is line-oriented: the last buffer line is the line the
//! cursor sits on. Submitted input runs immediately when the shell is idle
//! and is queued as typeahead while a program is running.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use panectl_core::{Clock, ControllerConfig, TmuxController};
use panectl_tmux::{Cursor, PaneTransport, TmuxError};

pub const PROMPT: &str = "user@host:~$ ";
pub const SESSION: &str = "shrem";
const SCREEN_ROWS: usize = 24;

/// Clock that only moves when something sleeps on it.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ms: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
    }

    fn sleep(&self, dur: Duration) {
        let ms = u64::try_from(dur.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

/// A scripted program the shell knows how to run.
#[derive(Debug, Clone)]
pub struct Program {
    /// Printed as soon as the program starts.
    pub early: Vec<String>,
    /// Printed when the program exits.
    pub output: Vec<String>,
    /// `None`: never exits on its own.
    pub runtime: Option<Duration>,
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

impl Program {
    pub fn instant(output: &[&str]) -> Self {
        Self {
            early: Vec::new(),
            output: owned(output),
            runtime: Some(Duration::ZERO),
        }
    }

    pub fn lines(output: Vec<String>) -> Self {
        Self {
            early: Vec::new(),
            output,
            runtime: Some(Duration::ZERO),
        }
    }

    pub fn delayed(runtime: Duration, output: &[&str]) -> Self {
        Self {
            early: Vec::new(),
            output: owned(output),
            runtime: Some(runtime),
        }
    }

    pub fn endless(early: &[&str]) -> Self {
        Self {
            early: owned(early),
            output: Vec::new(),
            runtime: None,
        }
    }
}

/// Every transport operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    HasSession,
    ListSessions,
    SendKeys(String),
    Interrupt,
    Capture(u32),
    Cursor,
    HistoryLimit,
    SetHistoryLimit(Option<u32>),
    SessionInfo,
}

struct Running {
    finish_at: Option<Duration>,
    output: Vec<String>,
}

struct State {
    lines: Vec<String>,
    running: Option<Running>,
    typeahead: VecDeque<String>,
    programs: HashMap<String, Program>,
    history_limit: Option<u32>,
    calls: Vec<Call>,
    failing_sends: usize,
    sends_broken: bool,
}

pub struct ScriptedShell {
    clock: VirtualClock,
    sessions: Vec<String>,
    state: Mutex<State>,
}

impl ScriptedShell {
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            sessions: vec![SESSION.to_string()],
            state: Mutex::new(State {
                lines: vec![PROMPT.to_string()],
                running: None,
                typeahead: VecDeque::new(),
                programs: HashMap::new(),
                history_limit: None,
                calls: Vec::new(),
                failing_sends: 0,
                sends_broken: false,
            }),
        }
    }

    pub fn with_program(self, command: &str, program: Program) -> Self {
        self.lock().programs.insert(command.to_string(), program);
        self
    }

    pub fn with_history_limit(self, limit: Option<u32>) -> Self {
        self.lock().history_limit = limit;
        self
    }

    pub fn without_sessions(mut self) -> Self {
        self.sessions.clear();
        self
    }

    /// The next `n` sends fail as if the pane vanished.
    pub fn fail_next_sends(&self, n: usize) {
        self.lock().failing_sends = n;
    }

    /// Every send fails from now on.
    pub fn break_sends(&self) {
        self.lock().sends_broken = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendKeys(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn history_limit_now(&self) -> Option<u32> {
        self.lock().history_limit
    }

    pub fn screen(&self) -> String {
        self.lock().lines.join("\n")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn settle(&self, state: &mut State) {
        let now = self.clock.now();
        let finished = state
            .running
            .as_ref()
            .is_some_and(|r| r.finish_at.is_some_and(|t| now >= t));
        if finished {
            let running = state.running.take().unwrap();
            if state.lines.last().is_some_and(|l| l.is_empty()) {
                state.lines.pop();
            }
            self.finish(state, running.output);
        }
    }

    fn finish(&self, state: &mut State, output: Vec<String>) {
        state.lines.extend(output);
        state.lines.push(PROMPT.to_string());
        while state.running.is_none() {
            let Some(cmd) = state.typeahead.pop_front() else {
                break;
            };
            state.lines.last_mut().unwrap().push_str(&cmd);
            self.execute(state, &cmd);
        }
    }

    fn execute(&self, state: &mut State, cmd: &str) {
        let cmd = cmd.trim();
        if let Some(arg) = cmd.strip_prefix("echo ") {
            let text = arg.trim_matches(|c| c == '\'' || c == '"').to_string();
            self.finish(state, vec![text]);
            return;
        }
        if cmd == "clear" || cmd.is_empty() {
            self.finish(state, Vec::new());
            return;
        }
        let Some(program) = state.programs.get(cmd).cloned() else {
            let name = cmd.split_whitespace().next().unwrap_or_default();
            self.finish(state, vec![format!("bash: {name}: command not found")]);
            return;
        };

        state.lines.extend(program.early);
        match program.runtime {
            Some(d) if d.is_zero() => self.finish(state, program.output),
            runtime => {
                state.running = Some(Running {
                    finish_at: runtime.map(|d| self.clock.now() + d),
                    output: program.output,
                });
                state.lines.push(String::new());
            }
        }
    }

    fn check_send(&self, state: &mut State) -> Result<(), TmuxError> {
        if state.sends_broken {
            return Err(TmuxError::CommandFailed("exit code 1: can't find pane".into()));
        }
        if state.failing_sends > 0 {
            state.failing_sends -= 1;
            return Err(TmuxError::CommandFailed("exit code 1: can't find pane".into()));
        }
        Ok(())
    }
}

impl PaneTransport for ScriptedShell {
    fn has_session(&self, session: &str) -> Result<bool, TmuxError> {
        self.lock().calls.push(Call::HasSession);
        Ok(self.sessions.iter().any(|s| s == session))
    }

    fn list_sessions(&self) -> Result<Vec<String>, TmuxError> {
        self.lock().calls.push(Call::ListSessions);
        Ok(self.sessions.clone())
    }

    fn send_keys(&self, _session: &str, text: &str, submit: bool) -> Result<(), TmuxError> {
        let mut state = self.lock();
        state.calls.push(Call::SendKeys(text.to_string()));
        self.check_send(&mut state)?;
        self.settle(&mut state);

        state.lines.last_mut().unwrap().push_str(text);
        if submit {
            if state.running.is_some() {
                state.typeahead.push_back(text.to_string());
                state.lines.push(String::new());
            } else {
                self.execute(&mut state, text);
            }
        }
        Ok(())
    }

    fn send_interrupt(&self, _session: &str) -> Result<(), TmuxError> {
        let mut state = self.lock();
        state.calls.push(Call::Interrupt);
        self.check_send(&mut state)?;
        self.settle(&mut state);
        state.running = None;
        state.typeahead.clear();
        state.lines.last_mut().unwrap().push_str("^C");
        state.lines.push(PROMPT.to_string());
        Ok(())
    }

    fn capture_pane(&self, _session: &str, scrollback_lines: u32) -> Result<String, TmuxError> {
        let mut state = self.lock();
        state.calls.push(Call::Capture(scrollback_lines));
        self.settle(&mut state);
        let keep = scrollback_lines as usize + SCREEN_ROWS;
        let from = state.lines.len().saturating_sub(keep);
        let mut text = state.lines[from..].join("\n");
        text.push('\n');
        Ok(text)
    }

    fn cursor_position(&self, _session: &str) -> Option<Cursor> {
        let mut state = self.lock();
        state.calls.push(Call::Cursor);
        self.settle(&mut state);
        let x = state.lines.last().map_or(0, |l| l.chars().count());
        let y = (state.lines.len() - 1).min(SCREEN_ROWS - 1);
        Some(Cursor {
            x: x as u32,
            y: y as u32,
        })
    }

    fn history_limit(&self, _session: &str) -> Result<Option<u32>, TmuxError> {
        let mut state = self.lock();
        state.calls.push(Call::HistoryLimit);
        Ok(state.history_limit)
    }

    fn set_history_limit(&self, _session: &str, limit: Option<u32>) -> Result<(), TmuxError> {
        let mut state = self.lock();
        state.calls.push(Call::SetHistoryLimit(limit));
        state.history_limit = limit;
        Ok(())
    }

    fn session_info(&self, session: &str) -> Result<String, TmuxError> {
        self.lock().calls.push(Call::SessionInfo);
        Ok(format!("Session: {session}, Window: bash, Pane: 0"))
    }
}

pub fn connect<'a>(
    shell: &'a ScriptedShell,
    clock: &VirtualClock,
    config: ControllerConfig,
) -> TmuxController<&'a ScriptedShell, VirtualClock> {
    TmuxController::connect_with_clock(shell, clock.clone(), SESSION, config)
        .expect("session exists")
}
