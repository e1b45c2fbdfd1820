use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use carthage_cache::cli::{Cli, CliBuilder, Commands};
use carthage_cache::error::Result;
use carthage_cache::process::{CommandOutput, ProcessRunner};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Stands in for `carthage`, `llvm-gcc`, and `xcrun`.
///
/// `carthage build` writes `<key>.framework/<key>` into the project's
/// `Carthage/Build/<platform>`, the way the real tool leaves its output.
#[derive(Default)]
pub struct ScriptedRunner {
    invocations: RefCell<Vec<Invocation>>,
    failing_builds: HashSet<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `carthage build <key>` exit non-zero.
    pub fn fail_build(mut self, key: &str) -> Self {
        self.failing_builds.insert(key.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Library keys passed to `carthage build`, in call order.
    pub fn built(&self) -> Vec<String> {
        self.carthage_calls("build")
            .into_iter()
            .filter_map(|args| args.last().cloned())
            .collect()
    }

    /// Arguments of every `carthage <subcommand>` call.
    pub fn carthage_calls(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.invocations
            .borrow()
            .iter()
            .filter(|i| i.program == "carthage")
            .filter(|i| i.args.first().is_some_and(|a| a == subcommand))
            .map(|i| i.args.clone())
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });

        let mut output = CommandOutput {
            status: Some(0),
            ..CommandOutput::default()
        };

        match (program, args.first().map(String::as_str)) {
            ("llvm-gcc", _) => output
                .stderr
                .push("Apple clang version 15.0.0 (clang-1500.1.0.2.5)".to_string()),
            ("xcrun", _) => output
                .stdout
                .push("swift-driver version: 1.90.11.1 Apple Swift version 5.10".to_string()),
            ("carthage", Some("build")) => {
                let key = args.last().cloned().unwrap_or_default();
                if self.failing_builds.contains(&key) {
                    output.status = Some(65);
                    output.stderr.push(format!("*** Building scheme \"{key}\" failed"));
                } else {
                    let platform = &args[2];
                    let framework = cwd
                        .expect("carthage runs in the project directory")
                        .join("Carthage/Build")
                        .join(platform)
                        .join(format!("{key}.framework"));
                    fs::create_dir_all(&framework).unwrap();
                    fs::write(framework.join(&key), format!("{key} binary")).unwrap();
                }
            }
            _ => {}
        }

        Ok(output)
    }
}

/// A project directory and a cache root side by side in one temp dir.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("App")).unwrap();
        Self { temp }
    }

    pub fn project(&self) -> PathBuf {
        self.temp.path().join("App")
    }

    pub fn cache_root(&self) -> PathBuf {
        self.temp.path().join("caches")
    }

    /// `<cache>/carthage-cache/X15.0.0_S5.10/<platform>`
    pub fn partition(&self, platform: &str) -> PathBuf {
        self.cache_root()
            .join("carthage-cache/X15.0.0_S5.10")
            .join(platform)
    }

    pub fn build_dir(&self, platform: &str) -> PathBuf {
        self.project().join("Carthage/Build").join(platform)
    }

    pub fn write_manifests(&self, cartfile: &str, resolved: &str) {
        fs::write(self.project().join("Cartfile"), cartfile).unwrap();
        fs::write(self.project().join("Cartfile.resolved"), resolved).unwrap();
    }

    /// Puts a stored build of `key` at `version` into the cache.
    pub fn seed_cache(&self, platform: &str, key: &str, version: &str) {
        let framework = self
            .partition(platform)
            .join(key)
            .join(version)
            .join(format!("{key}.framework"));
        fs::create_dir_all(&framework).unwrap();
        fs::write(framework.join(key), format!("{key} {version} cached")).unwrap();
    }

    /// CLI builder with explicit toolchain versions and this workspace's
    /// cache.
    pub fn cli(&self) -> CliBuilder {
        Cli::builder()
            .xcode_version("15.0.0")
            .swift_version("5.10")
            .cache_dir(self.cache_root())
            .quiet(true)
    }

    pub fn build_cli(&self) -> Cli {
        self.cli()
            .command(Commands::Build { dry_run: false })
            .build()
            .unwrap()
    }
}
