use std::cell::RefCell;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::error::CacheError;
use crate::process::CommandOutput;

/// Answers toolchain version queries and records every invocation.
#[derive(Default)]
struct FakeToolchain {
    calls: RefCell<Vec<String>>,
}

impl ProcessRunner for FakeToolchain {
    fn run(&self, program: &str, args: &[String], _cwd: Option<&Path>) -> Result<CommandOutput> {
        self.calls
            .borrow_mut()
            .push(format!("{program} {}", args.join(" ")));

        let line = match program {
            "llvm-gcc" => "Apple clang version 15.0.0 (clang-1500.1.0.2.5)",
            "xcrun" => "swift-driver version: 1.90.11.1 Apple Swift version 5.10",
            _ => "",
        };
        Ok(CommandOutput {
            stdout: vec![],
            stderr: vec![line.to_string()],
            status: Some(0),
        })
    }
}

fn write_project(dir: &Path) {
    fs::write(dir.join("Cartfile"), "github \"Owner/Bar\" ~> 2.0\n").unwrap();
    fs::write(
        dir.join("Cartfile.resolved"),
        "github \"Owner/Bar\" \"2.0.0\"\n",
    )
    .unwrap();
}

#[test]
fn test_resolve_config_detects_toolchain() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeToolchain::default();
    let cli = Cli::builder()
        .cache_dir("caches")
        .platform("Mac")
        .quiet(true)
        .command(Commands::Build { dry_run: false })
        .build()
        .unwrap();

    let config = resolve_config(&cli, temp_dir.path(), &runner).unwrap();

    assert_eq!(config.toolchain().xcode_version(), "15.0.0");
    assert_eq!(config.toolchain().swift_version(), "5.10");
    assert_eq!(config.toolchain().platform(), "Mac");
    assert_eq!(config.project_dir(), temp_dir.path());
    assert_eq!(config.cache_root(), temp_dir.path().join("caches"));
    assert_eq!(
        *runner.calls.borrow(),
        ["llvm-gcc -v", "xcrun swift -version"]
    );
}

#[test]
fn test_resolve_config_uses_explicit_versions() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeToolchain::default();
    let cli = Cli::builder()
        .project_dir("App/Cartfile.resolved")
        .xcode_version("8.0.0")
        .swift_version("3.0")
        .cache_dir("/caches")
        .no_ssh(true)
        .command(Commands::Build { dry_run: false })
        .build()
        .unwrap();

    let config = resolve_config(&cli, temp_dir.path(), &runner).unwrap();

    assert!(runner.calls.borrow().is_empty());
    assert_eq!(config.project_dir(), temp_dir.path().join("App"));
    assert_eq!(
        config.layout().partition_dir(),
        Path::new("/caches/carthage-cache/X8.0.0_S3.0/iOS")
    );
    assert!(!config.use_ssh());
}

#[test]
fn test_resolve_config_rejects_platform_with_separators() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeToolchain::default();
    let cli = Cli::builder()
        .xcode_version("15.0.0")
        .swift_version("5.10")
        .cache_dir("caches")
        .platform("../Mac")
        .command(Commands::Build { dry_run: false })
        .build()
        .unwrap();

    let err = resolve_config(&cli, temp_dir.path(), &runner).unwrap_err();

    assert!(matches!(err, CacheError::ConfigError(msg) if msg.contains("../Mac")));
    assert!(!temp_dir.path().join("caches").exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());
    let runner = FakeToolchain::default();
    let config = SyncConfig::builder()
        .project_dir(temp_dir.path())
        .cache_root(temp_dir.path().join("caches"))
        .toolchain(ToolchainKey::new("15.0.0", "5.10", "iOS"))
        .quiet(true)
        .build()
        .unwrap();

    let report = sync_project(&config, &runner, true).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.required.len(), 1);
    assert_eq!(report.plan.missing_keys().into_iter().collect::<Vec<_>>(), ["Bar"]);
    assert!(report.outcomes.is_empty());
    assert!(runner.calls.borrow().is_empty());
    assert!(!temp_dir.path().join("caches").exists());
    assert!(!temp_dir.path().join("Carthage").exists());
}

#[test]
fn test_unwritable_cache_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path());
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let runner = FakeToolchain::default();
    let cli = Cli::builder()
        .xcode_version("15.0.0")
        .swift_version("5.10")
        .cache_dir(&blocker)
        .quiet(true)
        .command(Commands::Build { dry_run: false })
        .build()
        .unwrap();

    let err = execute_with(&cli, Some(temp_dir.path()), &runner).unwrap_err();

    assert!(matches!(err, CacheError::CacheRootUnavailable { .. }));
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_version_command() {
    let runner = FakeToolchain::default();
    let cli = Cli::builder().command(Commands::Version).build().unwrap();

    execute_with(&cli, None, &runner).unwrap();

    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_report_counts() {
    use crate::identity::LibraryIdentity;
    use crate::sync::StoreOutcome;

    let report = BuildReport {
        outcomes: vec![
            (LibraryIdentity::cached("A", "1"), StoreOutcome::Stored),
            (LibraryIdentity::cached("B", "1"), StoreOutcome::BuildFailed),
            (LibraryIdentity::cached("C", "1"), StoreOutcome::StoreFailed),
            (LibraryIdentity::cached("D", ".."), StoreOutcome::InvalidVersion),
        ],
        ..BuildReport::default()
    };

    assert_eq!(report.stored(), 1);
    assert_eq!(report.failed(), 3);
}
