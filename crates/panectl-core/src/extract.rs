//! Output slicing over a captured pane.
//!
//! All functions are pure over the capture text so every extraction rule can
//! be tested against fixtures.

/// Characters that separate a prompt from the typed command.
const PROMPT_CHARS: [char; 3] = ['$', '#', '>'];

/// Prompt markers used by the heuristic scans. `└─` is the second line of
/// two-line zsh prompts (Kali and similar themes).
const PROMPT_MARKERS: [&str; 4] = ["$", "#", ">", "└─"];

/// Characters that, next to a prompt marker, make a line look like a prompt
/// rather than output.
const PROMPT_CONTEXT_CHARS: [char; 3] = ['@', ':', '~'];

/// Index of the boundary lines: the last `start` line that precedes the
/// first `end` line appearing after it.
///
/// Taking the *last* start occurrence skips the typed `echo 'TOKEN'` line
/// and anchors on the printed token.
pub fn find_marker_bounds(lines: &[&str], start: &str, end: &str) -> Option<(usize, usize)> {
    let mut start_idx = None;
    for (i, line) in lines.iter().enumerate() {
        if line.contains(start) {
            start_idx = Some(i);
        } else if let Some(s) = start_idx
            && line.contains(end)
        {
            return Some((s, i));
        }
    }
    None
}

/// Whether `line` is the shell's echo of `command`: either the command
/// verbatim, or the command after a leading prompt ending in `$`, `#` or `>`.
pub fn is_command_echo(line: &str, command: &str) -> bool {
    let stripped = line.trim();
    let command = command.trim();
    if stripped.is_empty() {
        return false;
    }
    for prompt_char in PROMPT_CHARS {
        if let Some((_, after)) = stripped.split_once(prompt_char)
            && after.trim() == command
        {
            return true;
        }
    }
    stripped == command
}

/// Join lines, dropping blank lines at both ends.
pub fn join_trimmed<S: AsRef<str>>(lines: &[S]) -> String {
    let is_blank = |l: &S| l.as_ref().trim().is_empty();
    let first = lines.iter().position(|l| !is_blank(l));
    let last = lines.iter().rposition(|l| !is_blank(l));
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last]
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string(),
        _ => String::new(),
    }
}

/// Primary extraction: lines strictly between the markers, minus command
/// echoes. `None` when either marker is missing or out of order.
pub fn slice_between_markers(
    capture: &str,
    start: &str,
    end: &str,
    command: &str,
) -> Option<String> {
    let lines: Vec<&str> = capture.lines().collect();
    let (start_idx, end_idx) = find_marker_bounds(&lines, start, end)?;
    let kept: Vec<&str> = lines[start_idx + 1..end_idx]
        .iter()
        .copied()
        .filter(|l| !is_command_echo(l, command))
        .collect();
    Some(join_trimmed(&kept))
}

fn has_prompt_marker(line: &str) -> bool {
    PROMPT_MARKERS.iter().any(|m| line.contains(m))
}

/// A line that ends the output region in the last-resort scan.
fn is_prompt_boundary(line: &str) -> bool {
    line.contains("└─") || (has_prompt_marker(line) && line.contains(PROMPT_CONTEXT_CHARS))
}

/// Fallback extraction between the clear marker and the fallback end marker.
/// The first line that contains the raw command next to a prompt marker is
/// treated as an unremoved echo and dropped.
pub fn slice_fallback(capture: &str, clear: &str, end: &str, command: &str) -> Option<String> {
    let lines: Vec<&str> = capture.lines().collect();
    let (start_idx, end_idx) = find_marker_bounds(&lines, clear, end)?;
    let command = command.trim();

    let mut echo_dropped = false;
    let mut kept = Vec::new();
    for line in &lines[start_idx + 1..end_idx] {
        if !echo_dropped
            && !command.is_empty()
            && line.contains(command)
            && has_prompt_marker(line)
        {
            echo_dropped = true;
            continue;
        }
        kept.push(*line);
    }
    Some(join_trimmed(&kept))
}

/// Last resort when no markers survive: scan backward for the command echo
/// and return what follows it up to the next prompt-looking line, or the
/// last `tail` lines when the echo cannot be found either.
pub fn extract_recent_output(capture: &str, command: &str, tail: usize) -> String {
    let lines: Vec<&str> = capture.lines().collect();
    let command = command.trim();

    if !command.is_empty() {
        let echo = lines
            .iter()
            .rposition(|l| l.contains(command) && has_prompt_marker(l));
        if let Some(i) = echo {
            let body: Vec<&str> = lines[i + 1..]
                .iter()
                .copied()
                .take_while(|l| !is_prompt_boundary(l))
                .collect();
            return join_trimmed(&body);
        }
    }

    let from = lines.len().saturating_sub(tail);
    join_trimmed(&lines[from..])
}
