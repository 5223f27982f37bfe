//! Implementation of `drydock build`.
//!
//! One build is created per selected template entry. Every build is prepared
//! before any of them runs; if a single prepare fails, nothing runs. The
//! prepared builds then run, in parallel unless disabled.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use thiserror::Error;

use crate::builders::BuilderRegistry;
use crate::core::build::{Build, CoreBuild};
use crate::core::events::BuildEvent;
use crate::core::ui::{PrefixedUi, ShellUi};
use crate::ops::template::{BuildSpec, Template};
use crate::util::shell::{format_duration, Progress, Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Only run builds with these names (empty = all)
    pub only: Vec<String>,

    /// Skip builds with these names
    pub except: Vec<String>,

    /// Run builds concurrently
    pub parallel: bool,

    /// Worker threads for parallel runs (None = one per CPU)
    pub jobs: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            only: Vec::new(),
            except: Vec::new(),
            parallel: true,
            jobs: None,
        }
    }
}

/// A build that did not make it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBuild {
    pub name: String,
    pub error: String,
}

/// Builds failed to prepare or to run.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum BuildFailure {
    #[error("{} build(s) failed to prepare: {}", .failures.len(), names(.failures))]
    #[diagnostic(help("run `drydock validate` to check the template without building"))]
    Prepare { failures: Vec<FailedBuild> },

    #[error("{} build(s) failed: {}", .failures.len(), names(.failures))]
    Run { failures: Vec<FailedBuild> },
}

impl BuildFailure {
    pub fn failures(&self) -> &[FailedBuild] {
        match self {
            BuildFailure::Prepare { failures } | BuildFailure::Run { failures } => failures,
        }
    }
}

fn names(failures: &[FailedBuild]) -> String {
    failures
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of one build's run.
#[derive(Debug)]
pub struct BuildOutcome {
    pub name: String,
    pub result: Result<()>,
}

/// Outcomes of every build, in template order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outcomes: Vec<BuildOutcome>,
}

impl BuildReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &str> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.name.as_str())
    }

    pub fn failures(&self) -> Vec<FailedBuild> {
        self.outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|e| FailedBuild {
                    name: o.name.clone(),
                    error: format!("{:#}", e),
                })
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Turn any failed run into an error.
    pub fn into_result(self) -> Result<Self, BuildFailure> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(BuildFailure::Run { failures })
        }
    }
}

/// Pick the template entries named by `only` / `except`.
///
/// An unknown name in either filter is an error, so a typo never silently
/// builds nothing (or everything).
pub fn select_builds<'a>(
    template: &'a Template,
    only: &[String],
    except: &[String],
) -> Result<Vec<&'a BuildSpec>> {
    let available = template.build_names();

    for requested in only.iter().chain(except) {
        if !available.contains(&requested.as_str()) {
            bail!(
                "unknown build `{}`\n\
                 available builds: {}",
                requested,
                available.join(", ")
            );
        }
    }

    let selected: Vec<_> = template
        .builds()
        .iter()
        .filter(|spec| only.is_empty() || only.iter().any(|n| n == spec.name()))
        .filter(|spec| !except.iter().any(|n| n == spec.name()))
        .collect();

    if selected.is_empty() {
        bail!("no builds left to run after applying --only/--except");
    }

    Ok(selected)
}

/// Construct one build per spec, each with its own builder instance.
pub fn create_builds(registry: &BuilderRegistry, specs: &[&BuildSpec]) -> Result<Vec<CoreBuild>> {
    specs
        .iter()
        .map(|spec| -> Result<CoreBuild> {
            let builder = registry
                .create(&spec.kind)
                .with_context(|| format!("cannot create build `{}`", spec.name()))?;
            Ok(CoreBuild::new(spec.name(), builder, spec.config.clone()))
        })
        .collect()
}

/// Prepare every build, reporting each failure before giving up.
pub fn prepare_builds(builds: &mut [CoreBuild], shell: &Shell) -> Result<(), BuildFailure> {
    let mut failures = Vec::new();

    for build in builds.iter_mut() {
        shell.status(Status::Preparing, build.name());

        match build.prepare() {
            Ok(()) => shell.emit(&BuildEvent::Prepared {
                build: build.name().to_string(),
            }),
            Err(e) => {
                shell.error(format!("build `{}` failed to prepare: {:#}", build.name(), e));
                failures.push(FailedBuild {
                    name: build.name().to_string(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(BuildFailure::Prepare { failures })
    }
}

/// Run prepared builds and collect their outcomes in input order.
pub fn run_builds(builds: &[CoreBuild], shell: &Arc<Shell>, opts: &BuildOptions) -> Result<BuildReport> {
    let progress = Mutex::new(shell.progress(builds.len() as u64, "Building"));

    let results: Vec<BuildOutcome> = if opts.parallel && builds.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs.unwrap_or(0))
            .thread_name(|i| format!("drydock-build-{}", i))
            .build()
            .context("failed to start build workers")?;

        tracing::debug!(threads = pool.current_num_threads(), "running builds in parallel");

        pool.install(|| {
            builds
                .par_iter()
                .map(|build| run_one(build, shell, &progress))
                .collect()
        })
    } else {
        builds
            .iter()
            .map(|build| run_one(build, shell, &progress))
            .collect()
    };

    match progress.into_inner() {
        Ok(p) => p.finish(),
        Err(poisoned) => poisoned.into_inner().finish(),
    }

    Ok(BuildReport { outcomes: results })
}

fn run_one(build: &CoreBuild, shell: &Arc<Shell>, progress: &Mutex<Progress>) -> BuildOutcome {
    let name = build.name().to_string();
    let ui = PrefixedUi::new(name.clone(), ShellUi::new(Arc::clone(shell)));
    let start = Instant::now();

    shell.status(Status::Building, &name);
    let result = build.run(&ui);
    let elapsed = start.elapsed();

    match &result {
        Ok(()) => shell.status(
            Status::Finished,
            format!("`{}` in {}", name, format_duration(elapsed)),
        ),
        Err(e) => shell.error(format!("build `{}` failed: {:#}", name, e)),
    }

    shell.emit(&BuildEvent::Finished {
        build: name.clone(),
        success: result.is_ok(),
        duration_ms: elapsed.as_millis() as u64,
        error: result.as_ref().err().map(|e| format!("{:#}", e)),
    });

    if let Ok(mut p) = progress.lock() {
        p.inc(1);
    }

    BuildOutcome { name, result }
}

/// Load, prepare and run the builds in a template.
///
/// Returns the report even when some runs failed; call
/// [`BuildReport::into_result`] to treat those as an error.
pub fn build(
    template: &Template,
    registry: &BuilderRegistry,
    shell: &Arc<Shell>,
    opts: &BuildOptions,
) -> Result<BuildReport> {
    let start = Instant::now();

    template.validate(registry)?;
    let specs = select_builds(template, &opts.only, &opts.except)?;
    for spec in template.builds() {
        if !specs.iter().any(|s| s.name() == spec.name()) {
            shell.status(Status::Skipped, spec.name());
        }
    }

    let mut builds = create_builds(registry, &specs)?;
    prepare_builds(&mut builds, shell)?;

    tracing::info!(
        builds = builds.len(),
        parallel = opts.parallel,
        "running builds"
    );
    let report = run_builds(&builds, shell, opts)?;

    let failed = report.failures().len() as u64;
    shell.emit(&BuildEvent::RunFinished {
        succeeded: report.outcomes.len() as u64 - failed,
        failed,
        duration_ms: start.elapsed().as_millis() as u64,
    });

    Ok(report)
}
