//! Run a shell command and collect its output into a [`TypedList`].
//!
//! Each line the command writes to standard output becomes one `String` entry,
//! appended in the order it was read. Lines longer than the configured
//! maximum are split into several entries.
//!
//! ```no_run
//! use mola_typed_list::prelude::*;
//!
//! let lines = TypedList::<String>::new().unwrap();
//! let report = Runner::new().run("uname -a", &lines).unwrap();
//! assert_eq!(report.lines, lines.len());
//! ```

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::error::RunnerError;
use crate::linked_list::typed::TypedList;


/// The shell used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Longest entry, in bytes, that a single output line produces by default.
pub const DEFAULT_MAX_LINE_LEN: usize = 254;

/// Runs commands through a shell, one at a time.
#[derive(Debug, Clone)]
pub struct Runner {
    shell: String,
    max_line_len: usize,
}

/// What a finished [`Runner::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Number of entries appended to the list.
    pub lines: usize,
    /// How the command exited. A non-zero status is not treated as an error.
    pub status: ExitStatus,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Create a runner using [`DEFAULT_SHELL`] and [`DEFAULT_MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self {
            shell: String::from(DEFAULT_SHELL),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Set the shell. It is invoked as `<shell> -c <command>`.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set the longest entry, in bytes, a single list element may hold.
    ///
    /// Zero is treated as 1.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len.max(1);
        self
    }

    /// The shell commands are run through.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// The longest entry, in bytes, one output line turns into.
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Runs `command` to completion, appending its output to `sink` line by
    /// line.
    ///
    /// Trailing `\n` / `\r\n` are stripped and invalid UTF-8 is replaced. The
    /// first failed append aborts the run: the child is killed and the error
    /// returned, leaving whatever was already appended in `sink`.
    #[tracing::instrument(level = "debug", skip(self, sink), fields(shell = %self.shell))]
    pub fn run(&self, command: &str, sink: &TypedList<String>) -> Result<RunReport, RunnerError> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: String::from(command),
                source,
            })?;
        tracing::debug!(pid = child.id(), "spawned");

        let lines = match self.collect(&mut child, sink) {
            Ok(lines) => lines,
            Err(error) => {
                tracing::warn!(%error, "aborting command");
                // Best effort: the child may already have exited.
                let _ = child.kill();
                let _ = child.wait();
                return Err(error);
            }
        };

        let status = child.wait().map_err(RunnerError::Wait)?;
        tracing::debug!(lines, %status, "command finished");
        Ok(RunReport { lines, status })
    }

    fn collect(&self, child: &mut Child, sink: &TypedList<String>) -> Result<usize, RunnerError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::Read(std::io::Error::other("stdout was not captured")))?;
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut appended = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(RunnerError::Read)? == 0 {
                return Ok(appended);
            }
            let line = String::from_utf8_lossy(trim_newline(&buf));
            for chunk in split_line(&line, self.max_line_len) {
                sink.append(String::from(chunk))?;
                appended += 1;
            }
        }
    }
}

/// Runs `command` with the default [`Runner`] configuration.
pub fn run_system_command(command: &str, sink: &TypedList<String>) -> Result<RunReport, RunnerError> {
    Runner::new().run(command, sink)
}

fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits `line` into pieces of at most `max` bytes without cutting through a
/// character. An empty line yields one empty piece.
///
/// A single character wider than `max` still comes out whole.
fn split_line(line: &str, max: usize) -> impl Iterator<Item = &str> {
    let mut rest = Some(line);
    core::iter::from_fn(move || {
        let current = rest?;
        if current.len() <= max {
            rest = None;
            return Some(current);
        }

        let mut cut = max;
        while !current.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = current.chars().next().map_or(current.len(), char::len_utf8);
        }
        let (piece, tail) = current.split_at(cut);
        rest = (!tail.is_empty()).then_some(tail);
        Some(piece)
    })
}
