//! Running external tools (`carthage`, `xcrun`, `llvm-gcc`).
//!
//! [`ProcessRunner`] is the seam between the sync logic and the host: the
//! real [`SystemRunner`] spawns processes, while tests substitute a runner
//! that records invocations and fakes the build tool's output.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{CacheError, Result};
use crate::logging::Logger;

/// Launcher used when none is configured.
pub const DEFAULT_LAUNCHER: &str = "/usr/bin/env";

/// Everything a finished external command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Stdout, one entry per line without the trailing newline
    pub stdout: Vec<String>,
    /// Stderr, one entry per line without the trailing newline
    pub stderr: Vec<String>,
    /// Exit code, or `None` when the process was killed by a signal
    pub status: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs an external program to completion.
pub trait ProcessRunner {
    /// Runs `program` with `args`, optionally inside `cwd`, and blocks until
    /// it exits.
    ///
    /// Returns `Err` only when the program could not be started. A non-zero
    /// exit status is reported through [`CommandOutput::status`].
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Spawns real processes through a launcher such as `/usr/bin/env`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    launcher: PathBuf,
    log: Logger,
}

impl SystemRunner {
    pub fn new(launcher: impl Into<PathBuf>, log: Logger) -> Self {
        Self {
            launcher: launcher.into(),
            log,
        }
    }

    pub fn launcher(&self) -> &Path {
        &self.launcher
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
        let mut command = if self.launcher.as_os_str().is_empty() {
            Command::new(program)
        } else {
            let mut command = Command::new(&self.launcher);
            command.arg(program);
            command
        };
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let program_line = format!("{program} {}", args.join(" "));
        let spawn_error = |source| CacheError::CommandSpawn {
            program: program_line.trim_end().to_string(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_error)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let log = self.log;

        // Drain both pipes concurrently; the child blocks once either fills.
        let (stdout, stderr) = thread::scope(|scope| {
            let out = scope.spawn(|| drain_lines(stdout, |line| log.verbose(1, line)));
            let err = scope.spawn(|| drain_lines(stderr, |line| log.verbose(1, line)));
            (
                out.join().unwrap_or_default(),
                err.join().unwrap_or_default(),
            )
        });

        let status = child.wait().map_err(spawn_error)?;

        Ok(CommandOutput {
            stdout,
            stderr,
            status: status.code(),
        })
    }
}

/// Reads `reader` to EOF, echoing and collecting each line. Invalid UTF-8 is
/// replaced rather than treated as the end of output.
fn drain_lines<R: Read>(reader: Option<R>, echo: impl Fn(&str)) -> Vec<String> {
    let Some(reader) = reader else {
        return Vec::new();
    };

    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                echo(line);
                lines.push(line.to_string());
            }
        }
    }
    lines
}
