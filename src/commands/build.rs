//! The `build` command: bring the project's frameworks in line with its
//! resolved manifest, building only what the cache lacks.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::files::format_size;
use crate::identity::{DECLARED_MANIFEST, LibraryIdentity, read_declared, read_resolved};
use crate::index;
use crate::process::ProcessRunner;
use crate::reconcile::{Reconciliation, reconcile};
use crate::sync::{RestoreStats, StoreOutcome, SyncExecutor};

/// What a sync run did, or would do in a dry run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Identities read from `Cartfile.resolved`, in file order
    pub required: Vec<LibraryIdentity>,
    /// How the required set split into builds and cache hits
    pub plan: Reconciliation,
    /// Result of every build attempted, in build order
    pub outcomes: Vec<(LibraryIdentity, StoreOutcome)>,
    /// Totals for the copy into the project
    pub restore: RestoreStats,
    /// True when nothing was executed
    pub dry_run: bool,
}

impl BuildReport {
    /// Number of libraries built and stored.
    pub fn stored(&self) -> usize {
        self.count(StoreOutcome::Stored)
    }

    /// Number of libraries that failed to build or store.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.stored()
    }

    fn count(&self, outcome: StoreOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Runs one full sync of `config.project_dir()` against the cache.
///
/// The only fatal error is a cache partition that cannot be created. Build,
/// store, and restore failures are logged and reflected in the report.
pub fn sync_project(
    config: &SyncConfig,
    runner: &dyn ProcessRunner,
    dry_run: bool,
) -> Result<BuildReport> {
    let log = config.logger();
    let layout = config.layout();
    let executor = SyncExecutor::new(config, runner);

    if !dry_run {
        layout.ensure_partition()?;
        executor.ensure_manifest_current();
    }

    let project_dir = config.project_dir();
    if !project_dir.join(DECLARED_MANIFEST).is_file() {
        log.warn(format!(
            "No {DECLARED_MANIFEST} found in {}",
            project_dir.display()
        ));
    } else if log.level() > 0 {
        let declared = read_declared(project_dir);
        log.verbose(1, format!("Declared: {}", declared.join(", ")));
    }

    let required = read_resolved(project_dir);
    let cached = index::enumerate(&layout);
    log.verbose(
        1,
        format!(
            "{} libraries required, {} cached for {}",
            required.len(),
            cached.len(),
            layout.partition_dir().display()
        ),
    );

    let plan = reconcile(&required, &cached, config.force());
    let mut report = BuildReport {
        required,
        plan,
        dry_run,
        ..BuildReport::default()
    };

    if dry_run {
        for identity in &report.plan.to_build {
            log.info(format!("Would build {identity}"));
        }
        log.info(format!(
            "Would restore {} libraries into {}",
            report.plan.to_build.len() + report.plan.reused.len(),
            config.build_output_dir().display()
        ));
        return Ok(report);
    }

    if !report.plan.is_up_to_date() {
        if config.force() {
            log.info("Force building and caching libraries");
        } else {
            log.info("Building and caching missing libraries");
        }
        report.outcomes = executor.build_and_store(&report.plan.to_build);
    }

    log.info("Copying frameworks from cache into the project");
    report.restore = executor.restore_to_project(&report.required);

    if report.failed() > 0 {
        log.warn(format!("{} libraries could not be built", report.failed()));
    }
    log.info(format!(
        "Done: {} built, {} restored ({})",
        report.stored(),
        report.restore.libraries_restored,
        format_size(report.restore.bytes_copied)
    ));

    Ok(report)
}
