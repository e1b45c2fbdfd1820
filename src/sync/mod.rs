//! Moving builds between the build tool, the cache, and the project.
//!
//! [`SyncExecutor`] drives the three side-effecting steps of a run:
//! refreshing the resolved manifest, building and storing missing libraries,
//! and restoring the required set into the project. None of these steps
//! returns an error; every failure is logged and the run moves on.

use crate::config::SyncConfig;
use crate::logging::Logger;
use crate::process::{CommandOutput, ProcessRunner};

mod restore;
mod store;

pub use restore::RestoreStats;
pub use store::StoreOutcome;


/// Name of the external dependency manager.
pub const BUILD_TOOL: &str = "carthage";

/// Arguments that refresh `Cartfile.resolved` without building anything.
pub fn bootstrap_args(use_ssh: bool) -> Vec<String> {
    let mut args = vec!["bootstrap".to_string(), "--no-build".to_string()];
    if use_ssh {
        args.push("--use-ssh".to_string());
    }
    args
}

/// Arguments that build a single library for one platform from source.
pub fn build_args(platform: &str, verbose: bool, display_key: &str) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "--platform".to_string(),
        platform.to_string(),
        "--no-use-binaries".to_string(),
    ];
    if verbose {
        args.push("--verbose".to_string());
    }
    args.push(display_key.to_string());
    args
}

/// Runs sync steps for one project against one cache partition.
pub struct SyncExecutor<'a> {
    config: &'a SyncConfig,
    runner: &'a dyn ProcessRunner,
    log: Logger,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(config: &'a SyncConfig, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            config,
            runner,
            log: config.logger(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        self.config
    }

    /// Asks the build tool to bring `Cartfile.resolved` up to date.
    ///
    /// Returns whether the tool ran and succeeded. A failure leaves whatever
    /// resolved manifest was already on disk.
    pub fn ensure_manifest_current(&self) -> bool {
        self.log.verbose(1, "Resolving dependencies...");
        let args = bootstrap_args(self.config.use_ssh());
        self.run_build_tool("bootstrap", &args)
    }

    /// Runs the build tool in the project directory, reporting failures.
    fn run_build_tool(&self, step: &str, args: &[String]) -> bool {
        self.log.verbose(2, format!("Running: {BUILD_TOOL} {}", args.join(" ")));

        match self.runner.run(BUILD_TOOL, args, Some(self.config.project_dir())) {
            Ok(output) if output.success() => true,
            Ok(output) => {
                self.report_failure(step, &output);
                false
            }
            Err(err) => {
                self.log.warn(format!("{BUILD_TOOL} {step} could not be started: {err}"));
                false
            }
        }
    }

    fn report_failure(&self, step: &str, output: &CommandOutput) {
        let status = output
            .status
            .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
        self.log.warn(format!("{BUILD_TOOL} {step} exited with {status}"));
        for line in &output.stderr {
            self.log.info(format!("  {line}"));
        }
    }
}
