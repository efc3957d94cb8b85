//! `local_exec`: the controller exposed as a single tool capability that
//! returns the command output plus a "got root" hint.

use std::sync::Arc;

use panectl_tmux::PaneTransport;

use crate::clock::{Clock, SystemClock};
use crate::controller::TmuxController;

pub const CAPABILITY_NAME: &str = "local_exec";

const DESCRIPTION: &str = "give a command to be executed and I will respond with the terminal \
output when running this command on the shell via tmux. The given command must not require user \
interaction. Do not use quotation marks in front and after your command.";

pub struct LocalExecCapability<T, C = SystemClock> {
    controller: Arc<TmuxController<T, C>>,
}

impl<T: PaneTransport, C: Clock> LocalExecCapability<T, C> {
    pub fn new(controller: Arc<TmuxController<T, C>>) -> Self {
        Self { controller }
    }

    pub fn name(&self) -> &'static str {
        CAPABILITY_NAME
    }

    pub fn describe(&self) -> &'static str {
        DESCRIPTION
    }

    /// Run `cmd`; returns the output and whether it suggests a root shell.
    pub fn call(&self, cmd: &str) -> (String, bool) {
        let output = self.controller.run(cmd).stdout;
        let root = got_root(&output);
        (output, root)
    }
}

/// Substring heuristic for a root shell.
///
/// Any mention of "root" counts, including paths like `/root/.bashrc` or
/// `chroot` in a listing, so false positives are expected.
pub fn got_root(output: &str) -> bool {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return false;
    }
    let last_line = trimmed.lines().last().unwrap_or_default().trim();

    trimmed.to_lowercase().contains("root") || last_line.ends_with('#') || last_line.contains("root@")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_output_is_not_root() {
        assert!(!got_root(""));
        assert!(!got_root("  \n "));
    }

    #[test]
    fn id_output_as_root() {
        assert!(got_root("uid=0(root) gid=0(root) groups=0(root)"));
    }

    #[test]
    fn hash_prompt_on_last_line() {
        assert!(got_root("spawned shell\n# "));
        assert!(got_root("box:/tmp#"));
    }

    #[test]
    fn unprivileged_output() {
        assert!(!got_root("uid=1000(kali) gid=1000(kali)"));
        assert!(!got_root("hello\nuser@host:~$"));
    }

    #[test]
    fn path_mention_is_a_false_positive() {
        // Flagged behavior: a mere path mention reads as root.
        assert!(got_root("ls: cannot open directory '/root': Permission denied"));
    }
}
