//! # carthage-cache CLI
//!
//! Restores Carthage frameworks from a local cache keyed by Xcode version,
//! Swift version, and platform, building only the ones the cache lacks.
//!
//! ## Commands
//!
//! - **build**: Sync `Carthage/Build/<platform>` with `Cartfile.resolved`
//! - **version**: Print the version
//! - **help**: Show usage
//!
//! ## Quick Start
//!
//! ```bash
//! # In the directory containing Cartfile.resolved
//! carthage-cache build
//!
//! # Another project, for macOS, rebuilding everything
//! carthage-cache build -r ~/work/App -p Mac -f
//! ```
//!
//! ## Environment Variables
//!
//! - `CARTHAGE_CACHE_PROJECT_DIR`: Project directory (default: current
//!   directory)
//! - `CARTHAGE_CACHE_XCODE_VERSION`, `CARTHAGE_CACHE_SWIFT_VERSION`: Skip
//!   toolchain detection
//! - `CARTHAGE_CACHE_SHELL`: Launcher for external tools
//! - `CARTHAGE_CACHE_DIR`: Cache location

use std::io::IsTerminal;

use carthage_cache::cli::Cli;

fn main() -> miette::Result<()> {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();

    // Configure miette handler based on terminal capabilities
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Use a simpler handler for non-TTY environments (CI, logs, etc.)
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    carthage_cache::commands::execute(&cli).map_err(Into::into)
}
